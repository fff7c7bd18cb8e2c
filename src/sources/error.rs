//! Error types for certificate source lookups.

use thiserror::Error;

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Why a single source could not produce a certificate.
///
/// None of these are fatal to a lookup: the locator logs the failure at the
/// appropriate level and moves on to the next source in priority order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Nothing exists under the given locator.
    #[error("Certificate not found: {locator}")]
    NotFound { locator: String },

    /// The source refused access to an existing item.
    #[error("Access denied to {locator}: {remediation}")]
    AccessDenied { locator: String, remediation: String },

    /// The source could not be reached (network failure, timeout, I/O error).
    #[error("Certificate source unreachable: {message}")]
    Unreachable { message: String },

    /// The item exists but its content is not a usable certificate.
    #[error("Malformed certificate at {locator}: {reason}")]
    Malformed { locator: String, reason: String },

    /// No locator is configured for the requested role.
    #[error("Source is not configured for this certificate")]
    NotConfigured,
}

impl SourceError {
    /// Create a not found error.
    pub fn not_found(locator: impl Into<String>) -> Self {
        Self::NotFound { locator: locator.into() }
    }

    /// Create an access denied error carrying an operator hint.
    pub fn access_denied(locator: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self::AccessDenied { locator: locator.into(), remediation: remediation.into() }
    }

    /// Create an unreachable error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable { message: message.into() }
    }

    /// Create a malformed content error.
    pub fn malformed(locator: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Malformed { locator: locator.into(), reason: reason.to_string() }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}
