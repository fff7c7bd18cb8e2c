use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced while turning raw bytes into a certificate.
///
/// The locator and the forwarded-header extractor both normalise these to
/// "not found" / "absent" for their callers; the variants exist so the
/// diagnostic log says what was actually wrong with the bytes.
#[derive(Debug, Error)]
pub enum CertificateError {
    /// The certificate file could not be read.
    #[error("Failed to read certificate at {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes looked like PEM but no certificate block could be decoded.
    #[error("Certificate data is not a valid PEM: {reason}")]
    InvalidPem { reason: String },

    /// The DER structure is not an X.509 certificate.
    #[error("Certificate data is not a valid DER X.509 certificate: {reason}")]
    InvalidDer { reason: String },

    /// No certificates were found in the supplied bundle.
    #[error("Certificate bundle does not contain any certificates")]
    EmptyBundle,

    /// The PKCS#12 container could not be opened (bad passphrase or corrupt data).
    #[error("PKCS#12 bundle could not be opened: {reason}")]
    Pkcs12 { reason: String },

    /// The PKCS#12 container has no private key entry.
    #[error("PKCS#12 bundle does not contain a private key chain")]
    MissingKeyChain,

    /// A private key block was present but could not be decoded.
    #[error("Private key is not a supported PEM private key: {reason}")]
    InvalidPrivateKey { reason: String },
}

impl CertificateError {
    pub fn invalid_der(reason: impl std::fmt::Display) -> Self {
        Self::InvalidDer { reason: reason.to_string() }
    }

    pub fn invalid_pem(reason: impl std::fmt::Display) -> Self {
        Self::InvalidPem { reason: reason.to_string() }
    }

    pub fn pkcs12(reason: impl std::fmt::Display) -> Self {
        Self::Pkcs12 { reason: reason.to_string() }
    }
}
