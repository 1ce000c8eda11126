//! encryption-util - one-shot password-based encryption of secret artifacts

#![forbid(unsafe_code)]

pub mod cipher;
pub mod error;
pub mod file_ops;
pub mod logging;
pub mod password;
pub mod secretcrypt;
pub mod varmor;
