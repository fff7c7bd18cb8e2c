use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Which check decided the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPath {
    /// Leaf matched the configured client thumbprint
    PinnedThumbprint,
    /// X.509 chain from leaf to CA, through any intermediates the leaf carries
    ChainBuild,
    /// Relaxed mode: issuer CN of the leaf against subject CN of the CA
    CommonNameMatch,
    /// No CA available: subject and thumbprint merely non-empty.
    /// Not a cryptographic check.
    PlausibilityOnly,
}

/// One reason a certificate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("certificate expired at {not_after}")]
    Expired { not_after: DateTime<Utc> },

    #[error("certificate not valid before {not_before}")]
    NotYetValid { not_before: DateTime<Utc> },

    #[error("chain does not terminate at a trusted root")]
    UntrustedRoot,

    #[error("certificate signature does not verify against the CA key")]
    SignatureInvalid,

    #[error("issuer common name {leaf_issuer:?} does not match CA common name {ca_subject:?}")]
    NameMismatch { leaf_issuer: Option<String>, ca_subject: Option<String> },

    #[error("CA certificate is outside its validity window")]
    CaExpired,

    #[error("CA certificate is not marked as a certificate authority")]
    NotACertificateAuthority,

    #[error("intermediate {subject} is outside its validity window")]
    IntermediateExpired { subject: String },

    #[error("intermediate {subject} is not marked as a certificate authority")]
    IntermediateNotACertificateAuthority { subject: String },

    #[error("certificate could not be parsed: {detail}")]
    Unparseable { detail: String },

    #[error("certificate has an empty subject or thumbprint")]
    Implausible,
}

/// Outcome of validation. Negative outcomes are ordinary values, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustChainResult {
    pub passed: bool,
    pub path: ValidationPath,
    pub failures: Vec<ValidationFailure>,
}

impl TrustChainResult {
    pub fn pass(path: ValidationPath) -> Self {
        Self { passed: true, path, failures: Vec::new() }
    }

    /// Passes exactly when `failures` is empty.
    pub fn from_failures(path: ValidationPath, failures: Vec<ValidationFailure>) -> Self {
        Self { passed: failures.is_empty(), path, failures }
    }

    pub fn has_failure(&self, predicate: impl Fn(&ValidationFailure) -> bool) -> bool {
        self.failures.iter().any(predicate)
    }
}
