//! Turning raw bytes from a source into a [`LoadedCertificate`].
//!
//! Three container shapes are understood:
//! - PEM text with one or more `CERTIFICATE` blocks and an optional private key
//! - a bare DER certificate
//! - a PKCS#12 (`.pfx` / `.p12`) bundle, optionally passphrase protected

use std::path::Path;

use p12_keystore::KeyStore;
use rustls::pki_types::{pem, pem::PemObject, CertificateDer, PrivateKeyDer};
use x509_parser::prelude::{FromDer, X509Certificate};
use zeroize::Zeroizing;

use super::{LoadedCertificate, Passphrase};
use crate::errors::CertificateError;

/// Decode whatever container the bytes hold.
///
/// PEM is recognised by its armour, DER by a successful X.509 parse; anything
/// else is treated as PKCS#12, opened with `passphrase` (or the empty
/// passphrase platform stores use).
pub fn decode_certificate(
    bytes: &[u8],
    passphrase: Option<&Passphrase>,
) -> Result<LoadedCertificate, CertificateError> {
    if bytes.is_empty() {
        return Err(CertificateError::EmptyBundle);
    }

    if is_pem(bytes) {
        return decode_pem_bundle(bytes);
    }

    if X509Certificate::from_der(bytes).is_ok() {
        return LoadedCertificate::from_der(bytes.to_vec());
    }

    decode_pkcs12(bytes, passphrase)
}

/// Read and decode a certificate file.
pub async fn read_certificate_file(
    path: &Path,
    passphrase: Option<&Passphrase>,
) -> Result<LoadedCertificate, CertificateError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CertificateError::ReadError { path: path.to_path_buf(), source })?;
    decode_certificate(&bytes, passphrase)
}

/// Decode PEM text: the first certificate is the leaf, later ones form the
/// chain, and a private key block (PKCS#8, PKCS#1 or SEC1) is attached when
/// present.
pub fn decode_pem_bundle(bytes: &[u8]) -> Result<LoadedCertificate, CertificateError> {
    let mut certs: Vec<Vec<u8>> = CertificateDer::pem_slice_iter(bytes)
        .map(|result| {
            result.map(|cert| cert.as_ref().to_vec()).map_err(CertificateError::invalid_pem)
        })
        .collect::<Result<_, _>>()?;

    if certs.is_empty() {
        return Err(CertificateError::EmptyBundle);
    }

    let leaf = certs.remove(0);
    let certificate = LoadedCertificate::from_der(leaf)?.with_chain(certs);

    match PrivateKeyDer::from_pem_slice(bytes) {
        Ok(key) => {
            Ok(certificate.with_private_key(Zeroizing::new(key.secret_der().to_vec())))
        }
        Err(pem::Error::NoItemsFound) => Ok(certificate),
        Err(err) => Err(CertificateError::InvalidPrivateKey { reason: err.to_string() }),
    }
}

/// Open a PKCS#12 bundle and take its private key chain.
pub fn decode_pkcs12(
    bytes: &[u8],
    passphrase: Option<&Passphrase>,
) -> Result<LoadedCertificate, CertificateError> {
    let password = passphrase.map(Passphrase::expose).unwrap_or("");
    let keystore = KeyStore::from_pkcs12(bytes, password).map_err(CertificateError::pkcs12)?;

    let (_, key_chain) = keystore.private_key_chain().ok_or(CertificateError::MissingKeyChain)?;

    let mut certs: Vec<Vec<u8>> =
        key_chain.chain().iter().map(|cert| cert.as_der().to_vec()).collect();
    if certs.is_empty() {
        return Err(CertificateError::EmptyBundle);
    }

    let leaf = certs.remove(0);
    Ok(LoadedCertificate::from_der(leaf)?
        .with_chain(certs)
        .with_private_key(Zeroizing::new(key_chain.key().to_vec())))
}

fn is_pem(bytes: &[u8]) -> bool {
    bytes.windows(11).any(|window| window == b"-----BEGIN ")
}
