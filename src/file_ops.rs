//! Encrypt or decrypt one payload into an output file.
//!
//! [`run`] performs exactly one call into the cipher and one write of its
//! result. It never exits the process; the binary maps the returned
//! `Result` to an exit status.

use crate::cipher::SecretCipher;
use crate::error::{CipherError, ErrorCategory, ErrorKind, Result};
use crate::password::PasswordReader;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Which direction a single invocation runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Payload is clear text; write the cipher text.
    Encrypt,
    /// Payload is cipher text; write the recovered clear text.
    Decrypt,
}

impl Mode {
    /// The gerund used in failure messages ("encrypting"/"decrypting").
    fn verb(self) -> &'static str {
        match self {
            Mode::Encrypt => "encrypting",
            Mode::Decrypt => "decrypting",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
        })
    }
}

/// Runs `mode` over `payload` and writes the result to `output_path`.
///
/// The output file is truncated and overwritten; whatever it held before is
/// lost. On Unix a newly created file gets mode 0o600.
pub fn run(
    mode: Mode,
    payload: &str,
    password_reader: &mut dyn PasswordReader,
    output_path: &Path,
    cipher: &dyn SecretCipher,
) -> Result<()> {
    let transformed = {
        let password = password_reader.read_password()?;
        match mode {
            Mode::Encrypt => cipher.encrypt_string(payload, &password)?,
            Mode::Decrypt => cipher.decrypt_string(payload, &password)?,
        }
    };

    write_file_secure(output_path, transformed.as_bytes())?;
    log::debug!(
        "{}: wrote {} bytes to {}",
        mode,
        transformed.len(),
        output_path.display()
    );
    Ok(())
}

/// The single line logged when [`run`] fails.
///
/// Errors raised by the cipher itself are reported by their underlying
/// cause; anything else is reported with its full chain.
pub fn failure_message(mode: Mode, err: &CipherError) -> String {
    let cause = if err.is_encryption_error() {
        err.cause_chain()
    } else {
        err.display_chain()
    };
    format!("Error in {} secret artifact: {}", mode.verb(), cause)
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to open {}", path.display()),
            e,
        )
    })?;

    file.write_all(contents).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to write {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::SealedBoxCipher;
    use crate::password::{ConstantPasswordReader, Password};
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    fn reader(password: &str) -> ConstantPasswordReader {
        ConstantPasswordReader::new(password.to_string())
    }

    #[test]
    fn test_encrypt_then_decrypt_file() {
        let temp_dir = TempDir::new().unwrap();
        let crypt_path = temp_dir.path().join("secret.sealed");
        let clear_path = temp_dir.path().join("secret.txt");
        let cipher = SealedBoxCipher::new();

        run(Mode::Encrypt, "hello", &mut reader("pw1"), &crypt_path, &cipher).unwrap();
        let cipher_text = fs::read_to_string(&crypt_path).unwrap();
        assert!(cipher_text.starts_with("sealed1:"));
        assert!(!cipher_text.contains("hello"));

        run(
            Mode::Decrypt,
            &cipher_text,
            &mut reader("pw1"),
            &clear_path,
            &cipher,
        )
        .unwrap();
        assert_eq!(fs::read_to_string(&clear_path).unwrap(), "hello");
    }

    #[test]
    fn test_existing_output_is_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        fs::write(&output, "a much longer pre-existing content that must vanish").unwrap();

        let cipher = SealedBoxCipher::new();
        let sealed = cipher
            .encrypt_string("short", &Password::from_string("pw1".to_string()))
            .unwrap();

        run(Mode::Decrypt, &sealed, &mut reader("pw1"), &output, &cipher).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "short");
    }

    #[test]
    fn test_wrong_password_fails_and_reports_cause() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let cipher = SealedBoxCipher::new();
        let sealed = cipher
            .encrypt_string("hello", &Password::from_string("pw1".to_string()))
            .unwrap();

        let err = run(Mode::Decrypt, &sealed, &mut reader("nope"), &output, &cipher).unwrap_err();

        assert!(err.is_encryption_error());
        assert!(!output.exists());
        assert_eq!(
            failure_message(Mode::Decrypt, &err),
            "Error in decrypting secret artifact: corrupt input, tampered-with data, or bad password"
        );
    }

    #[test]
    fn test_unwritable_output_fails() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("missing-dir").join("out.txt");

        let err = run(
            Mode::Encrypt,
            "hello",
            &mut reader("pw1"),
            &output,
            &SealedBoxCipher::new(),
        )
        .unwrap_err();

        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert!(!err.is_encryption_error());
        let message = failure_message(Mode::Encrypt, &err);
        assert!(message.starts_with("Error in encrypting secret artifact: failed to open "));
    }

    #[test]
    fn test_password_failure_is_not_encryption_error() {
        struct FailingReader;

        impl PasswordReader for FailingReader {
            fn read_password(&mut self) -> Result<Password> {
                Err(CipherError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::PasswordUnavailable,
                    "simulated error",
                ))
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let err = run(
            Mode::Encrypt,
            "hello",
            &mut FailingReader,
            &output,
            &SealedBoxCipher::new(),
        )
        .unwrap_err();

        assert_eq!(err.kind, Some(ErrorKind::PasswordUnavailable));
        assert!(!output.exists());
    }

    #[test]
    fn test_cipher_called_once_per_run() {
        use std::cell::Cell;

        struct CountingCipher {
            calls: Cell<usize>,
        }

        impl SecretCipher for CountingCipher {
            fn encrypt_string(&self, clear_text: &str, _password: &Password) -> Result<String> {
                self.calls.set(self.calls.get() + 1);
                Ok(clear_text.chars().rev().collect())
            }

            fn decrypt_string(&self, cipher_text: &str, _password: &Password) -> Result<String> {
                self.calls.set(self.calls.get() + 1);
                Ok(cipher_text.chars().rev().collect())
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let cipher = CountingCipher {
            calls: Cell::new(0),
        };

        run(Mode::Encrypt, "abc", &mut reader("pw"), &output, &cipher).unwrap();
        assert_eq!(cipher.calls.get(), 1);
        assert_eq!(fs::read_to_string(&output).unwrap(), "cba");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");

        run(
            Mode::Encrypt,
            "hello",
            &mut reader("pw1"),
            &output,
            &SealedBoxCipher::new(),
        )
        .unwrap();

        let mode = fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
