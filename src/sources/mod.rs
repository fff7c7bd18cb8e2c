//! # Certificate Sources
//!
//! Three interchangeable backends behind the [`CertificateSource`]
//! capability trait:
//!
//! - [`LocalFileSource`]: bundles on the local filesystem
//! - [`PlatformStoreSource`]: thumbprint lookup in host-managed store scopes
//! - [`VaultSource`]: KV v2 secrets in HashiCorp Vault
//!
//! Sources return raw [`CertificateMaterial`]; decoding and fallback are the
//! locator's job.

pub mod backend;
pub mod error;
pub mod local;
pub mod store;
pub mod vault;

pub use backend::{CertificateMaterial, CertificateSource, SourceKind};
pub use error::{Result, SourceError};
pub use local::LocalFileSource;
pub use store::{PlatformStoreSource, StoreLocation, StoreScope};
pub use vault::{KvVaultClient, VaultCertificate, VaultClient, VaultError, VaultSource};
