//! # Certificate Locator
//!
//! Resolves a [`CertificateRole`] to a [`LoadedCertificate`] by asking each
//! configured source in priority order and stopping at the first success.
//!
//! Every source failure is recoverable here: not-found, access-denied,
//! unreachable and malformed content all move on to the next source. Only
//! total exhaustion reaches the caller, as [`CertificateNotFound`].
//!
//! Log levels: `debug` for each attempt, `warn` for access denied (with the
//! remediation hint) and other fallbacks, `info` when found, `error` when no
//! source could produce the certificate.

use std::sync::Arc;

use thiserror::Error;
use tracing::Instrument;

use crate::certificates::{CertificateRole, LoadedCertificate};
use crate::cert_span;
use crate::config::{CertificateSettings, HostCapabilities, SourcePlan};
use crate::sources::{
    CertificateSource, LocalFileSource, PlatformStoreSource, SourceError, SourceKind, VaultSource,
};

/// No configured source could produce the certificate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("No certificate found for role '{role}' after trying {} source(s)", attempts.len())]
pub struct CertificateNotFound {
    pub role: CertificateRole,
    /// Each source tried, with the reason it failed
    pub attempts: Vec<(SourceKind, SourceError)>,
}

impl CertificateNotFound {
    pub fn access_denied(&self) -> bool {
        self.attempts.iter().any(|(_, err)| err.is_access_denied())
    }
}

/// Ordered, stateless resolution over a set of sources.
#[derive(Clone)]
pub struct CertificateLocator {
    sources: Vec<Arc<dyn CertificateSource>>,
}

impl CertificateLocator {
    /// Sources are tried in the order given.
    pub fn new(sources: Vec<Arc<dyn CertificateSource>>) -> Self {
        Self { sources }
    }

    /// Build the sources named by the resolved [`SourcePlan`].
    ///
    /// A vault that cannot be connected to is logged and left out, so the
    /// remaining sources still serve as fallback.
    pub async fn connect(settings: &CertificateSettings, capabilities: &HostCapabilities) -> Self {
        let plan = SourcePlan::resolve(settings, capabilities);
        let mut sources: Vec<Arc<dyn CertificateSource>> = Vec::with_capacity(plan.sources().len());

        for kind in plan.sources() {
            match kind {
                SourceKind::Vault => match VaultSource::connect(settings.vault.clone()).await {
                    Ok(vault) => sources.push(Arc::new(vault)),
                    Err(e) => log_vault_unavailable(&e),
                },
                SourceKind::PlatformStore => {
                    sources.push(Arc::new(PlatformStoreSource::new(settings.store.clone())));
                }
                SourceKind::LocalFile => {
                    sources.push(Arc::new(LocalFileSource::new(
                        settings.local.clone(),
                        settings.content_root.clone(),
                    )));
                }
            }
        }

        tracing::info!(
            sources = ?sources.iter().map(|s| s.kind().as_str()).collect::<Vec<_>>(),
            chain_build_reliable = capabilities.chain_build_reliable,
            "Certificate locator configured"
        );

        Self::new(sources)
    }

    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|source| source.kind()).collect()
    }

    /// Load the certificate for `role`, freshly, from the first source that
    /// has it.
    pub async fn load(
        &self,
        role: CertificateRole,
    ) -> std::result::Result<LoadedCertificate, CertificateNotFound> {
        self.resolve(role).instrument(cert_span!("load", role = %role)).await
    }

    async fn resolve(
        &self,
        role: CertificateRole,
    ) -> std::result::Result<LoadedCertificate, CertificateNotFound> {
        let mut attempts = Vec::new();

        for source in &self.sources {
            let kind = source.kind();

            let Some(locator) = source.locator_for(role) else {
                tracing::debug!(role = %role, source = %kind, "Source has no locator for role, skipping");
                attempts.push((kind, SourceError::NotConfigured));
                continue;
            };

            tracing::debug!(role = %role, source = %kind, locator = %locator, "Trying certificate source");

            let outcome = match source.find(role, &locator).await {
                Ok(material) => material
                    .decode()
                    .map_err(|e| SourceError::malformed(material.origin.clone(), e)),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(certificate) => {
                    let certificate = certificate.with_source(kind);
                    tracing::info!(
                        role = %role,
                        source = %kind,
                        subject = %certificate.subject(),
                        thumbprint = %certificate.thumbprint(),
                        "Certificate found"
                    );
                    if role.carries_private_key() && !certificate.has_private_key() {
                        tracing::warn!(
                            role = %role,
                            source = %kind,
                            thumbprint = %certificate.thumbprint(),
                            "Certificate has no private key; it cannot be presented as this identity"
                        );
                    }
                    return Ok(certificate);
                }
                Err(SourceError::AccessDenied { locator, remediation }) => {
                    tracing::warn!(
                        role = %role,
                        source = %kind,
                        locator = %locator,
                        remediation = %remediation,
                        "Access denied to certificate; falling back to next source"
                    );
                    attempts.push((kind, SourceError::AccessDenied { locator, remediation }));
                }
                Err(e @ SourceError::NotFound { .. }) | Err(e @ SourceError::NotConfigured) => {
                    tracing::debug!(role = %role, source = %kind, reason = %e, "Certificate not in source");
                    attempts.push((kind, e));
                }
                Err(e) => {
                    tracing::warn!(
                        role = %role,
                        source = %kind,
                        error = %e,
                        "Certificate source failed; falling back to next source"
                    );
                    attempts.push((kind, e));
                }
            }
        }

        tracing::error!(
            role = %role,
            attempted = attempts.len(),
            "Certificate not found in any configured source"
        );
        Err(CertificateNotFound { role, attempts })
    }
}

fn log_vault_unavailable(error: &SourceError) {
    match error {
        SourceError::AccessDenied { locator, remediation } => {
            tracing::warn!(
                source = %SourceKind::Vault,
                locator = %locator,
                remediation = %remediation,
                "Vault login denied; continuing with remaining sources"
            );
        }
        other => {
            tracing::warn!(
                source = %SourceKind::Vault,
                error = %other,
                "Vault source unavailable, continuing with remaining sources"
            );
        }
    }
}
