//! Core certificate source trait and types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::error::Result;
use crate::certificates::{decode_certificate, CertificateRole, LoadedCertificate, Passphrase};
use crate::errors::CertificateError;

/// The three interchangeable backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Vault,
    PlatformStore,
    LocalFile,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vault => "vault",
            Self::PlatformStore => "platform_store",
            Self::LocalFile => "local_file",
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vault" => Ok(Self::Vault),
            "platform_store" | "store" => Ok(Self::PlatformStore),
            "local_file" | "local" | "file" => Ok(Self::LocalFile),
            _ => Err(format!("Unknown certificate source: {}", s)),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw bytes handed back by a source, not yet decoded.
pub struct CertificateMaterial {
    pub bytes: Zeroizing<Vec<u8>>,
    pub passphrase: Option<Passphrase>,
    /// Where the bytes came from (path, store entry, secret path)
    pub origin: String,
}

impl CertificateMaterial {
    pub fn new(bytes: Vec<u8>, origin: impl Into<String>) -> Self {
        Self { bytes: Zeroizing::new(bytes), passphrase: None, origin: origin.into() }
    }

    pub fn with_passphrase(mut self, passphrase: Option<Passphrase>) -> Self {
        self.passphrase = passphrase;
        self
    }

    pub fn decode(&self) -> std::result::Result<LoadedCertificate, CertificateError> {
        decode_certificate(&self.bytes, self.passphrase.as_ref())
    }
}

impl fmt::Debug for CertificateMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateMaterial")
            .field("bytes", &format!("[{} bytes]", self.bytes.len()))
            .field("passphrase", &self.passphrase)
            .field("origin", &self.origin)
            .finish()
    }
}

/// A place certificates can be fetched from.
///
/// Implementations MUST NOT log passphrases or key bytes, and must be safe to
/// share across concurrent requests.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// The locator this source uses for `role`, or `None` when the role is not
    /// configured for it.
    fn locator_for(&self, role: CertificateRole) -> Option<String>;

    /// Fetch the raw material stored under `locator`.
    async fn find(&self, role: CertificateRole, locator: &str) -> Result<CertificateMaterial>;
}
