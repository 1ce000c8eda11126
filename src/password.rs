//! Password handling
//!
//! Password bytes live in a [`Zeroizing`] buffer for as short a time as
//! possible and are wiped from memory when dropped.

use crate::error::{CipherError, ErrorCategory, ErrorKind, Result};
use std::fmt;
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Password material, wiped on drop.
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    /// Takes ownership of `password`'s buffer without copying it.
    pub fn from_string(password: String) -> Self {
        Self(Zeroizing::new(password.into_bytes()))
    }

    pub fn from_bytes(password: Vec<u8>) -> Self {
        Self(Zeroizing::new(password))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Trait for reading passwords from various sources
pub trait PasswordReader {
    /// Read a password as arbitrary bytes (not necessarily UTF-8)
    fn read_password(&mut self) -> Result<Password>;
}

/// Hands out a password supplied up front, e.g. on the command line.
///
/// The buffer is moved out on the first read; later reads yield an empty
/// password.
pub struct ConstantPasswordReader {
    password: Zeroizing<Vec<u8>>,
}

impl ConstantPasswordReader {
    pub fn new(password: String) -> Self {
        Self {
            password: Zeroizing::new(password.into_bytes()),
        }
    }
}

impl PasswordReader for ConstantPasswordReader {
    fn read_password(&mut self) -> Result<Password> {
        Ok(Password::from_bytes(std::mem::take(&mut *self.password)))
    }
}

/// Reads a password from any io::Read source
///
/// A single trailing `\n` or `\r\n` is dropped so `echo secret | ...` works.
/// Empty input is refused rather than taken as an empty password.
pub struct ReaderPasswordReader {
    reader: Box<dyn Read>,
}

impl ReaderPasswordReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PasswordReader for ReaderPasswordReader {
    fn read_password(&mut self) -> Result<Password> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            CipherError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PasswordUnavailable,
                "error reading password",
                e,
            )
        })?;
        if data.last() == Some(&b'\n') {
            data.pop();
            if data.last() == Some(&b'\r') {
                data.pop();
            }
        }
        if data.is_empty() {
            return Err(CipherError::with_kind(
                ErrorCategory::User,
                ErrorKind::PasswordUnavailable,
                "no password provided on input",
            ));
        }
        Ok(Password(data))
    }
}

/// Reads a password from the terminal with no echo
#[derive(Default)]
pub struct TerminalPasswordReader;

impl TerminalPasswordReader {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordReader for TerminalPasswordReader {
    /// Terminal input is limited to UTF-8 due to rpassword library constraints.
    fn read_password(&mut self) -> Result<Password> {
        if !io::stdin().is_terminal() {
            return Err(CipherError::with_kind(
                ErrorCategory::User,
                ErrorKind::PasswordUnavailable,
                "cannot read password from terminal - stdin is not a terminal",
            ));
        }

        let mut stderr = io::stderr();
        stderr
            .write_all(b"Password: ")
            .and_then(|()| stderr.flush())
            .map_err(|e| {
                CipherError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to write prompt",
                    e,
                )
            })?;

        let password = rpassword::read_password().map_err(|e| {
            CipherError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PasswordUnavailable,
                "failure reading password",
                e,
            )
        })?;

        Ok(Password::from_string(password))
    }
}

/// Picks where the password comes from.
///
/// A password given on the command line is used exactly as given, whatever
/// it looks like. Without one, it is prompted for on the terminal, or read
/// from stdin when stdin is not a terminal.
pub fn select_reader(argument: Option<String>) -> Box<dyn PasswordReader> {
    match argument {
        Some(password) => Box::new(ConstantPasswordReader::new(password)),
        None if io::stdin().is_terminal() => Box::new(TerminalPasswordReader::new()),
        None => Box::new(ReaderPasswordReader::new(Box::new(io::stdin()))),
    }
}
