use std::fmt;

use chrono::{DateTime, Utc};
use ring::digest;
use x509_parser::prelude::{FromDer, X509Certificate};
use zeroize::Zeroizing;

use crate::errors::CertificateError;
use crate::sources::SourceKind;

/// A decoded X.509 certificate plus whatever came with it from its source.
///
/// Recreated on every load and never cached. Identity fields are extracted
/// once at construction; [`LoadedCertificate::parsed`] re-borrows the DER
/// when the validator needs the full structure.
#[derive(Clone)]
pub struct LoadedCertificate {
    der: Vec<u8>,
    chain: Vec<Vec<u8>>,
    private_key: Option<Zeroizing<Vec<u8>>>,
    subject: String,
    issuer: String,
    subject_common_name: Option<String>,
    issuer_common_name: Option<String>,
    serial_number: String,
    thumbprint: String,
    sha256_fingerprint: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    source: Option<SourceKind>,
}

impl LoadedCertificate {
    /// Decode a single DER-encoded certificate.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CertificateError> {
        let der = der.into();
        let (rest, parsed) =
            X509Certificate::from_der(&der).map_err(CertificateError::invalid_der)?;
        if !rest.is_empty() {
            return Err(CertificateError::invalid_der(format!(
                "{} trailing bytes after certificate",
                rest.len()
            )));
        }

        let validity = parsed.validity();
        let not_before = timestamp(validity.not_before.timestamp())?;
        let not_after = timestamp(validity.not_after.timestamp())?;

        let subject = parsed.subject().to_string();
        let issuer = parsed.issuer().to_string();
        let subject_common_name = first_common_name(parsed.subject());
        let issuer_common_name = first_common_name(parsed.issuer());
        let serial_number = format!("{:X}", parsed.serial);

        let thumbprint = compute_thumbprint(&der);
        let sha256_fingerprint =
            hex::encode_upper(digest::digest(&digest::SHA256, &der).as_ref());

        Ok(Self {
            der,
            chain: Vec::new(),
            private_key: None,
            subject,
            issuer,
            subject_common_name,
            issuer_common_name,
            serial_number,
            thumbprint,
            sha256_fingerprint,
            not_before,
            not_after,
            source: None,
        })
    }

    /// Attach PKCS#8 private key bytes that accompanied the certificate.
    pub fn with_private_key(mut self, key: Zeroizing<Vec<u8>>) -> Self {
        self.private_key = Some(key);
        self
    }

    /// Attach the remaining certificates of the bundle (intermediates, CA).
    pub fn with_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = Some(source);
        self
    }

    /// Re-parse the stored DER.
    pub fn parsed(&self) -> Result<X509Certificate<'_>, CertificateError> {
        X509Certificate::from_der(&self.der)
            .map(|(_, cert)| cert)
            .map_err(CertificateError::invalid_der)
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn chain(&self) -> &[Vec<u8>] {
        &self.chain
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// PKCS#8 private key bytes, when the source delivered one.
    pub fn private_key(&self) -> Option<&[u8]> {
        self.private_key.as_ref().map(|key| key.as_slice())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject_common_name(&self) -> Option<&str> {
        self.subject_common_name.as_deref()
    }

    pub fn issuer_common_name(&self) -> Option<&str> {
        self.issuer_common_name.as_deref()
    }

    /// Serial number as uppercase hex.
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// SHA-1 of the DER encoding as uppercase hex, the form certificate
    /// stores and portals display.
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    pub fn sha256_fingerprint(&self) -> &str {
        &self.sha256_fingerprint
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Which backend produced this certificate, if it came from a source.
    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_before <= instant && instant <= self.not_after
    }

    /// Compare against a configured thumbprint, ignoring case, spaces and
    /// colon separators.
    pub fn matches_thumbprint(&self, expected: &str) -> bool {
        let expected = normalize_thumbprint(expected);
        !expected.is_empty() && expected == self.thumbprint
    }
}

impl PartialEq for LoadedCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl fmt::Debug for LoadedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedCertificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("serial_number", &self.serial_number)
            .field("thumbprint", &self.thumbprint)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .field("chain", &format!("[{} certificates]", self.chain.len()))
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("source", &self.source)
            .finish()
    }
}

/// SHA-1 thumbprint of DER bytes, uppercase hex.
pub fn compute_thumbprint(der: &[u8]) -> String {
    hex::encode_upper(digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, der).as_ref())
}

/// Canonical thumbprint form: uppercase hex with separators stripped.
pub fn normalize_thumbprint(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '\u{200e}')
        .collect::<String>()
        .to_ascii_uppercase()
}

fn first_common_name(name: &x509_parser::x509::X509Name<'_>) -> Option<String> {
    name.iter_common_name().next().and_then(|cn| cn.as_str().ok()).map(str::to_string)
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, CertificateError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| CertificateError::invalid_der(format!("validity out of range: {}", seconds)))
}
