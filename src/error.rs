use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee the error was not caused by
    /// the caller - merely that the code cannot tell.
    Internal,

    /// The caller provided invalid input (a wrong password, a corrupt
    /// cipher text, an unwritable path).
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The armored representation is malformed (prefix, encoding, or unsupported version).
    ArmoringInvalid,
    /// Base64 decoding of the armored payload failed.
    ArmoringDecode,
    /// Input claimed to be ours but used a future/unsupported version.
    ArmoringFromFuture,
    /// Length fields or binary layout of the cipher text are invalid.
    BinaryFormat,
    /// Input data ended before the expected component could be read.
    TruncatedInput,
    /// Additional bytes were present after the sealed payload.
    TrailingData,
    /// Authentication failed due to an incorrect password, tampering
    /// or corruption.
    AuthenticationFailed,
    /// Decrypted bytes are not valid UTF-8 text.
    ClearTextNotUtf8,
    /// Low-level scrypt key derivation failed.
    ScryptFailure,
    /// NaCl secretbox (XSalsa20Poly1305) failed to seal or open data.
    SecretboxFailure,
    /// Password could not be obtained from the configured reader.
    PasswordUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

impl ErrorKind {
    /// Whether this kind is raised by the encryption primitive itself, as
    /// opposed to the plumbing around it.
    pub fn is_encryption(self) -> bool {
        matches!(
            self,
            ErrorKind::ArmoringInvalid
                | ErrorKind::ArmoringDecode
                | ErrorKind::ArmoringFromFuture
                | ErrorKind::BinaryFormat
                | ErrorKind::TruncatedInput
                | ErrorKind::TrailingData
                | ErrorKind::AuthenticationFailed
                | ErrorKind::ClearTextNotUtf8
                | ErrorKind::ScryptFailure
                | ErrorKind::SecretboxFailure
        )
    }
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct CipherError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl CipherError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The message carried by this error, without its sources.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    ///
    /// The kind is carried up so callers can still branch on it.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }

    /// True when the failure was raised by the encryption primitive (wrong
    /// password, corrupt cipher text, key derivation) rather than by I/O or
    /// password acquisition.
    pub fn is_encryption_error(&self) -> bool {
        self.kind.is_some_and(ErrorKind::is_encryption)
    }

    /// Renders the message followed by every source, separated by `": "`.
    pub fn display_chain(&self) -> String {
        let mut out = self.msg.clone();
        let mut next = StdError::source(self);
        while let Some(err) = next {
            out.push_str(": ");
            out.push_str(&err.to_string());
            next = err.source();
        }
        out
    }

    /// Renders only the underlying cause: the source chain without this
    /// error's own message. Falls back to the message when there is no source.
    pub fn cause_chain(&self) -> String {
        match StdError::source(self) {
            None => self.msg.clone(),
            Some(first) => {
                let mut out = first.to_string();
                let mut next = first.source();
                while let Some(err) = next {
                    out.push_str(": ");
                    out.push_str(&err.to_string());
                    next = err.source();
                }
                out
            }
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CipherError>;
