//! # Certward
//!
//! mTLS certificate acquisition and trust-chain validation for services that
//! run in more than one kind of environment: a developer machine with
//! certificates on disk, a managed host that loads certificates into a
//! platform store, or a cluster that keeps them in HashiCorp Vault.
//!
//! ## Architecture
//!
//! ```text
//! settings + host probe → SourcePlan → CertificateLocator → LoadedCertificate
//!                                       (vault > store > file)       ↓
//! forwarded header → extract → LoadedCertificate → TrustChainValidator → pass / fail
//! ```
//!
//! ## Core Components
//!
//! - **Sources**: local files, platform store scopes and Vault KV v2 behind one trait
//! - **Locator**: ordered resolution with fallback; exhaustion is `CertificateNotFound`
//! - **Validation**: chain build, relaxed common-name mode, thumbprint pinning
//! - **Forwarded**: client certificates passed by a TLS-terminating proxy
//! - **Service**: the `CertificateService` facade for the HTTP layer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use certward::{CertificateService, CertificateSettings, DefaultCertificateService, HostCapabilities};
//!
//! #[tokio::main]
//! async fn main() -> certward::Result<()> {
//!     let settings = CertificateSettings::load(None)?;
//!     let service = DefaultCertificateService::from_settings(&settings, &HostCapabilities::from_env()).await;
//!     let server = service.load_server().await;
//!     println!("{:?}", server.map(|cert| cert.subject().to_string()));
//!     Ok(())
//! }
//! ```

pub mod certificates;
pub mod cli;
pub mod config;
pub mod errors;
pub mod forwarded;
pub mod locator;
pub mod observability;
pub mod service;
pub mod sources;
pub mod validation;

// Re-export commonly used types and traits
pub use certificates::{CertificateRole, LoadedCertificate, Passphrase};
pub use config::{CertificateSettings, HostCapabilities, SourcePlan};
pub use errors::{CertificateError, Error, Result};
pub use forwarded::{check_proxy_provenance, extract_forwarded_certificate, ForwardedCertificateConfig};
pub use locator::{CertificateLocator, CertificateNotFound};
pub use service::{CertificateService, DefaultCertificateService};
pub use sources::{CertificateSource, SourceError, SourceKind};
pub use validation::{validate, TrustChainResult, TrustChainValidator, ValidationFailure, ValidationPolicy};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
