//! # Forwarded Client Certificates
//!
//! The TLS-terminating proxy in front of the service strips the client
//! certificate from the connection and forwards it in a request header,
//! base64-encoded DER by default. Some proxies send PEM instead, either as is
//! or URL-encoded (nginx `$ssl_client_escaped_cert`); both are accepted.
//!
//! Extraction and provenance are separate steps. [`extract_forwarded_certificate`]
//! returns `None` for a missing header and for a malformed one alike.
//! [`check_proxy_provenance`] is a coarse signal that the request passed
//! through the expected proxy: it looks for proxy-injected headers and an
//! `https` forwarded protocol. Any client able to reach the service directly
//! can forge both, so it is not proof of proxy identity.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::certificates::{decode_pem_bundle, LoadedCertificate};
use crate::errors::CertificateError;

pub const DEFAULT_CERTIFICATE_HEADER: &str = "X-ARR-ClientCert";
pub const DEFAULT_PROTOCOL_HEADER: &str = "X-Forwarded-Proto";
pub const DEFAULT_PROVENANCE_HEADERS: [&str; 4] =
    ["X-ARR-SSL", "X-Forwarded-For", "X-Original-URL", "X-Client-IP"];

/// Header names used by the fronting proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardedCertificateConfig {
    /// Header carrying the client certificate
    pub header_name: String,

    /// Headers the proxy injects; at least one must be present
    pub provenance_headers: Vec<String>,

    /// Header carrying the original transport protocol
    pub protocol_header: String,
}

impl Default for ForwardedCertificateConfig {
    fn default() -> Self {
        Self {
            header_name: DEFAULT_CERTIFICATE_HEADER.to_string(),
            provenance_headers: DEFAULT_PROVENANCE_HEADERS.iter().map(|h| h.to_string()).collect(),
            protocol_header: DEFAULT_PROTOCOL_HEADER.to_string(),
        }
    }
}

/// Pull the client certificate out of the request headers.
///
/// `None` covers every way the certificate can be unavailable: header
/// missing, empty, not decodable, or not a certificate.
pub fn extract_forwarded_certificate(
    headers: &HeaderMap,
    config: &ForwardedCertificateConfig,
) -> Option<LoadedCertificate> {
    let value = headers.get(config.header_name.as_str())?;

    let value = match value.to_str() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(header = %config.header_name, "Forwarded certificate header is not visible ASCII");
            return None;
        }
    };

    match decode_header_value(value) {
        Ok(certificate) => {
            tracing::debug!(
                header = %config.header_name,
                subject = %certificate.subject(),
                thumbprint = %certificate.thumbprint(),
                "Decoded forwarded client certificate"
            );
            Some(certificate)
        }
        Err(e) => {
            tracing::debug!(header = %config.header_name, error = %e, "Forwarded certificate header unusable");
            None
        }
    }
}

/// Decode a single header value into a certificate.
pub fn decode_header_value(value: &str) -> Result<LoadedCertificate, CertificateError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CertificateError::EmptyBundle);
    }

    // Base64 never contains '%', so its presence means URL-encoded PEM.
    let unescaped;
    let value = if value.contains('%') {
        unescaped = urlencoding::decode(value).map_err(CertificateError::invalid_pem)?;
        unescaped.trim()
    } else {
        value
    };

    if value.starts_with("-----BEGIN") {
        return decode_pem_bundle(value.as_bytes());
    }

    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let der = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CertificateError::invalid_der(format!("header is not base64: {}", e)))?;

    LoadedCertificate::from_der(der)
}

/// Whether the request carries the marks of the expected proxy: at least one
/// provenance header, and a forwarded protocol of `https`.
pub fn check_proxy_provenance(headers: &HeaderMap, config: &ForwardedCertificateConfig) -> bool {
    let proxy_header = config
        .provenance_headers
        .iter()
        .find(|name| headers.contains_key(name.as_str()));

    let protocol = headers
        .get(config.protocol_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim);

    let https = protocol.map(|p| p.eq_ignore_ascii_case("https")).unwrap_or(false);
    let trusted = proxy_header.is_some() && https;

    if !trusted {
        tracing::debug!(
            proxy_header = ?proxy_header,
            forwarded_proto = ?protocol,
            "Request does not carry expected proxy provenance"
        );
    }

    trusted
}
