//! # Error Handling
//!
//! Crate-wide error type for certward. Certificate decoding failures and
//! source lookup failures have their own enums; this type wraps them for the
//! configuration and CLI layers that need a single `Result`.
//!
//! Note that an *invalid* certificate is never an error here: validation
//! reports a negative [`crate::validation::TrustChainResult`] instead.

pub mod certificate;

pub use certificate::CertificateError;

use crate::sources::SourceError;

/// Custom result type for certward operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for certward
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Certificate bytes could not be decoded
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// A certificate source failed in a way the caller has to see
    #[error(transparent)]
    Source(#[from] SourceError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config(format!("Configuration loading failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Validation failed: {}", message))
    }
}
