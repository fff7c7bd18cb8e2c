//! # Certificate Service
//!
//! The facade the HTTP layer depends on: load each role's certificate, and
//! decide whether a presented client certificate is acceptable.

use async_trait::async_trait;
use http::HeaderMap;

use crate::certificates::{CertificateRole, LoadedCertificate};
use crate::config::{CertificateSettings, HostCapabilities};
use crate::forwarded::{check_proxy_provenance, extract_forwarded_certificate, ForwardedCertificateConfig};
use crate::locator::{CertificateLocator, CertificateNotFound};
use crate::validation::{TrustChainResult, TrustChainValidator, ValidationPolicy};

/// Certificate operations exposed to the request-handling layer.
#[async_trait]
pub trait CertificateService: Send + Sync {
    async fn load_server(&self) -> Result<LoadedCertificate, CertificateNotFound>;

    async fn load_ca(&self) -> Result<LoadedCertificate, CertificateNotFound>;

    async fn load_client(&self) -> Result<LoadedCertificate, CertificateNotFound>;

    /// Whether `certificate` is an acceptable client identity.
    async fn validate_client(&self, certificate: &LoadedCertificate) -> bool;
}

/// [`CertificateService`] over a [`CertificateLocator`].
///
/// Holds no per-request state; every call loads fresh from the sources.
#[derive(Clone)]
pub struct DefaultCertificateService {
    locator: CertificateLocator,
    validator: TrustChainValidator,
    forwarded: ForwardedCertificateConfig,
}

impl DefaultCertificateService {
    pub fn new(
        locator: CertificateLocator,
        policy: ValidationPolicy,
        forwarded: ForwardedCertificateConfig,
    ) -> Self {
        Self { locator, validator: TrustChainValidator::new(policy), forwarded }
    }

    /// Wire up sources and policy from settings and the host probe.
    pub async fn from_settings(settings: &CertificateSettings, capabilities: &HostCapabilities) -> Self {
        let locator = CertificateLocator::connect(settings, capabilities).await;
        let policy = ValidationPolicy::for_host(capabilities);
        Self::new(locator, policy, settings.forwarded.clone())
    }

    pub fn locator(&self) -> &CertificateLocator {
        &self.locator
    }

    pub fn policy(&self) -> &ValidationPolicy {
        self.validator.policy()
    }

    /// Full validation outcome for `certificate`.
    ///
    /// The expected client certificate, when loadable, pins its thumbprint
    /// unless the policy already carries one. A missing CA is logged and
    /// leaves the validator to its CA-less fallback.
    pub async fn validation_result(&self, certificate: &LoadedCertificate) -> TrustChainResult {
        let mut validator = self.validator.clone();
        if validator.policy().pinned_thumbprint.is_none() {
            if let Ok(expected) = self.locator.load(CertificateRole::Client).await {
                validator = TrustChainValidator::new(
                    validator.policy().clone().with_pinned_thumbprint(Some(expected.thumbprint())),
                );
            }
        }

        let ca = match self.locator.load(CertificateRole::CertificateAuthority).await {
            Ok(ca) => Some(ca),
            Err(e) => {
                tracing::warn!(error = %e, "CA certificate unavailable for client validation");
                None
            }
        };

        validator.validate(certificate, ca.as_ref())
    }

    /// Authenticate a request from its forwarded client certificate.
    ///
    /// Returns the certificate only when the request carries proxy provenance,
    /// the header decodes, and validation passes.
    pub async fn authenticate_request(&self, headers: &HeaderMap) -> Option<LoadedCertificate> {
        if !check_proxy_provenance(headers, &self.forwarded) {
            return None;
        }

        let certificate = extract_forwarded_certificate(headers, &self.forwarded)?;
        if self.validate_client(&certificate).await {
            Some(certificate)
        } else {
            None
        }
    }
}

#[async_trait]
impl CertificateService for DefaultCertificateService {
    async fn load_server(&self) -> Result<LoadedCertificate, CertificateNotFound> {
        self.locator.load(CertificateRole::Server).await
    }

    async fn load_ca(&self) -> Result<LoadedCertificate, CertificateNotFound> {
        self.locator.load(CertificateRole::CertificateAuthority).await
    }

    async fn load_client(&self) -> Result<LoadedCertificate, CertificateNotFound> {
        self.locator.load(CertificateRole::Client).await
    }

    async fn validate_client(&self, certificate: &LoadedCertificate) -> bool {
        let result = self.validation_result(certificate).await;
        if result.passed {
            tracing::info!(
                subject = %certificate.subject(),
                thumbprint = %certificate.thumbprint(),
                path = ?result.path,
                "Client certificate accepted"
            );
        } else {
            tracing::warn!(
                subject = %certificate.subject(),
                thumbprint = %certificate.thumbprint(),
                failures = ?result.failures,
                "Client certificate rejected"
            );
        }
        result.passed
    }
}
