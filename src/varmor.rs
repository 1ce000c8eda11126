//! Versioned armoring for binary data
//!
//! Cipher text travels back into the tool as a command-line argument, so the
//! armored format is:
//! - Free of whitespace (including newlines)
//! - Safe to embed in URLs
//! - Safe to pass unescaped in a POSIX shell

use crate::error::{CipherError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Magic prefix for all armor versions
const MAGIC_PREFIX: &str = "sealed";

/// Version 1 magic marker
const V1_MAGIC: &str = "sealed1:";

/// Wrap bytes in armor, returning the armored string
///
/// Format: sealed1:{base64url-no-padding}
pub fn wrap(body: &[u8]) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(body);
    format!("{}{}", V1_MAGIC, encoded)
}

/// Unwrap an armored string, returning the original bytes
///
/// Leading and trailing whitespace is ignored, so text captured with
/// `$(cat file)` or read with a trailing newline unwraps cleanly.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    let armored = armored.trim();

    if armored.len() < V1_MAGIC.len() {
        return Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            "input size smaller than magic marker; likely truncated",
        ));
    }

    if let Some(encoded) = armored.strip_prefix(V1_MAGIC) {
        let body = URL_SAFE_NO_PAD.decode(encoded).map_err(|e| {
            CipherError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::ArmoringDecode,
                "base64 decoding failed",
                e,
            )
        })?;
        Ok(body)
    } else if armored.starts_with(MAGIC_PREFIX) {
        Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringFromFuture,
            "input claims to be sealed text, but not a version we support",
        ))
    } else {
        Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            "input unrecognized as sealed text",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bytes() {
        let armored = wrap(b"");
        assert_eq!(armored, "sealed1:");
        assert!(unwrap(&armored).unwrap().is_empty());
    }

    #[test]
    fn test_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        let armored = wrap(&bytes);

        assert_eq!(
            armored,
            "sealed1:AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEyMzQ1Njc4OTo7PD0-P0BBQkNERUZHSElKS0xNTk9QUVJTVFVWV1hZWltcXV5fYGFiY2RlZmdoaWprbG1ub3BxcnN0dXZ3eHl6e3x9fn-AgYKDhIWGh4iJiouMjY6PkJGSk5SVlpeYmZqbnJ2en6ChoqOkpaanqKmqq6ytrq-wsbKztLW2t7i5uru8vb6_wMHCw8TFxsfIycrLzM3Oz9DR0tPU1dbX2Nna29zd3t_g4eLj5OXm5-jp6uvs7e7v8PHy8_T19vf4-fr7_P3-_w"
        );
        assert_eq!(unwrap(&armored).unwrap(), bytes);
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let armored = format!("  {}\n", wrap(b"test"));
        assert_eq!(unwrap(&armored).unwrap(), b"test");
    }

    #[test]
    fn test_truncated_input() {
        let err = unwrap("").expect_err("expected truncated input error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringInvalid));
    }

    #[test]
    fn test_wrong_version() {
        let err = unwrap("sealed999999:...").expect_err("expected unsupported version error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringFromFuture));
    }

    #[test]
    fn test_not_armored() {
        let err = unwrap("something not looking like sealed text")
            .expect_err("expected unrecognized input error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringInvalid));
    }

    #[test]
    fn test_bad_base64() {
        let err = unwrap("sealed1:bad$$").expect_err("expected base64 decode error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringDecode));
    }

    #[test]
    fn test_shell_safe() {
        let armored = wrap(&[0xFFu8; 100]);

        for c in [' ', '\n', '\t', '+', '/', '='] {
            assert!(!armored.contains(c), "armored text contains {:?}", c);
        }
    }
}
