//! Encryption/decryption using scrypt + XSalsa20Poly1305
//!
//! Password-based authenticated encryption built from:
//! - scrypt for key derivation from the password
//! - NaCl secretbox (XSalsa20Poly1305) for authenticated encryption
//!
//! The binary format is:
//! - salt: 8 bytes
//! - nonce: 24 bytes
//! - length: 8 bytes (big-endian signed int64)
//! - sealed box: variable length (includes 16-byte Poly1305 MAC)

use crate::error::{CipherError, ErrorCategory, ErrorKind, Result};
use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::{Nonce, XSalsa20Poly1305};
use rand::RngCore;
use rand::rngs::OsRng;
use scrypt::{Params, scrypt};
use std::mem::{size_of, size_of_val};
use zeroize::Zeroizing;

/// Length of salt in bytes
pub const SALT_LEN: usize = 8;

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 24;

/// Length of derived key in bytes
const KEY_LEN: usize = 32;

/// scrypt N parameter (CPU/memory cost), as log2
const SCRYPT_LOG_N: u8 = 15;

/// scrypt r parameter (block size)
const SCRYPT_R: u32 = 8;

/// scrypt p parameter (parallelization)
const SCRYPT_P: u32 = 1;

/// Derive a 32-byte key from a password and salt using scrypt
fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::ScryptFailure,
            "failed to create scrypt params",
            e,
        )
    })?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt(password, salt, &params, &mut key[..]).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::ScryptFailure,
            "scrypt key derivation failed",
            e,
        )
    })?;
    log::trace!("derived {}-byte key", KEY_LEN);

    Ok(key)
}

/// Encrypt plaintext with a password using random salt and nonce
///
/// Returns the binary format: salt(8) + nonce(24) + length(8) + sealedbox(variable)
pub fn encrypt(password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    encrypt_deterministic(password, plaintext, &salt, &nonce)
}

/// Encrypt plaintext with a password using provided salt and nonce
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which generates random salt/nonce.
pub fn encrypt_deterministic(
    password: &[u8],
    plaintext: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let key = derive_key(password, salt)?;

    let cipher = new_cipher(&key)?;

    let nonce_obj = Nonce::from(*nonce);
    let sealed_box = cipher.encrypt(&nonce_obj, plaintext).map_err(|e| {
        CipherError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::SecretboxFailure,
            format!("encryption failed: {}", e),
        )
    })?;

    let sealed_box_len = sealed_box.len() as i64;
    let mut output =
        Vec::with_capacity(SALT_LEN + NONCE_LEN + size_of_val(&sealed_box_len) + sealed_box.len());
    output.extend_from_slice(salt);
    output.extend_from_slice(nonce);
    output.extend_from_slice(&sealed_box_len.to_be_bytes()); // big-endian i64
    output.extend_from_slice(&sealed_box);

    Ok(output)
}

/// Decrypt ciphertext with a password
pub fn decrypt(password: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut pos = 0;

    if ciphertext.len() < pos + SALT_LEN {
        return Err(truncated("input likely truncated while reading salt"));
    }
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&ciphertext[pos..pos + SALT_LEN]);
    pos += SALT_LEN;

    if ciphertext.len() < pos + NONCE_LEN {
        return Err(truncated("input likely truncated while reading nonce"));
    }
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&ciphertext[pos..pos + NONCE_LEN]);
    pos += NONCE_LEN;

    if ciphertext.len() < pos + size_of::<i64>() {
        return Err(truncated("input likely truncated while reading sealed box"));
    }
    let mut length_bytes = [0u8; 8];
    length_bytes.copy_from_slice(&ciphertext[pos..pos + size_of::<i64>()]);
    let sealed_box_len = i64::from_be_bytes(length_bytes);
    pos += size_of::<i64>();

    if sealed_box_len < 0 {
        return Err(binary_format(
            "negative sealed box length (when interpreted as a big-endian i64)",
        ));
    }

    // *Valid* input can fail this check if the platform's isize is small.
    if sealed_box_len > isize::MAX as i64 {
        return Err(binary_format(
            "sealed box length exceeds this system's max isize",
        ));
    }

    let sealed_box_len = sealed_box_len as usize;

    if sealed_box_len > ciphertext.len() {
        return Err(binary_format(
            "truncated or corrupt input; claimed length greater than available input",
        ));
    }

    if ciphertext.len() < pos + sealed_box_len {
        return Err(truncated(
            "truncated or corrupt input (while reading sealed box)",
        ));
    }
    let sealed_box = &ciphertext[pos..pos + sealed_box_len];
    pos += sealed_box_len;

    if pos < ciphertext.len() {
        return Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::TrailingData,
            "invalid input: unexpected data after sealed box",
        ));
    }

    let key = derive_key(password, &salt)?;
    let cipher = new_cipher(&key)?;
    let nonce_obj = Nonce::from(nonce);
    let plaintext = cipher.decrypt(&nonce_obj, sealed_box).map_err(|_| {
        CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "corrupt input, tampered-with data, or bad password",
        )
    })?;

    Ok(plaintext)
}

fn new_cipher(key: &[u8; KEY_LEN]) -> Result<XSalsa20Poly1305> {
    XSalsa20Poly1305::new_from_slice(key).map_err(|_| {
        CipherError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::SecretboxFailure,
            "invalid secretbox key length",
        )
    })
}

fn truncated(msg: &str) -> CipherError {
    CipherError::with_kind(ErrorCategory::User, ErrorKind::TruncatedInput, msg)
}

fn binary_format(msg: &str) -> CipherError {
    CipherError::with_kind(ErrorCategory::User, ErrorKind::BinaryFormat, msg)
}
