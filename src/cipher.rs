//! Text-in, text-out encryption primitive.
//!
//! Callers treat a [`SecretCipher`] as opaque: a clear text string and a
//! password go in, an armored cipher text string comes out, and back again.

use crate::error::{CipherError, ErrorCategory, ErrorKind, Result};
use crate::password::Password;
use crate::secretcrypt;
use crate::varmor;

pub trait SecretCipher {
    /// Encrypts `clear_text` into a printable, shell-safe cipher text.
    fn encrypt_string(&self, clear_text: &str, password: &Password) -> Result<String>;

    /// Recovers the clear text from a cipher text produced by `encrypt_string`.
    fn decrypt_string(&self, cipher_text: &str, password: &Password) -> Result<String>;
}

/// scrypt + XSalsa20Poly1305, armored as `sealed1:<base64url>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SealedBoxCipher;

impl SealedBoxCipher {
    pub fn new() -> Self {
        Self
    }
}

impl SecretCipher for SealedBoxCipher {
    fn encrypt_string(&self, clear_text: &str, password: &Password) -> Result<String> {
        let sealed = secretcrypt::encrypt(password.as_bytes(), clear_text.as_bytes())
            .map_err(|e| e.with_context("encryption failed"))?;
        log::debug!(
            "sealed {} bytes of clear text into {} bytes",
            clear_text.len(),
            sealed.len()
        );
        Ok(varmor::wrap(&sealed))
    }

    fn decrypt_string(&self, cipher_text: &str, password: &Password) -> Result<String> {
        let sealed =
            varmor::unwrap(cipher_text).map_err(|e| e.with_context("failed to unarmor"))?;
        let clear = secretcrypt::decrypt(password.as_bytes(), &sealed)
            .map_err(|e| e.with_context("failed to decrypt"))?;
        log::debug!("opened {} bytes of clear text", clear.len());
        String::from_utf8(clear).map_err(|e| {
            CipherError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::ClearTextNotUtf8,
                "decrypted data is not valid UTF-8 text",
                e.utf8_error(),
            )
        })
    }
}
