//! # Certificates
//!
//! The certificate model shared by every source, the validator and the
//! forwarded-header extractor.

pub mod decode;
pub mod loaded;
pub mod passphrase;
pub mod role;

#[cfg(test)]
pub(crate) mod testing;

pub use decode::{decode_certificate, decode_pem_bundle, decode_pkcs12, read_certificate_file};
pub use loaded::{compute_thumbprint, normalize_thumbprint, LoadedCertificate};
pub use passphrase::Passphrase;
pub use role::CertificateRole;
