use serde::Serialize;

use super::{CertificateSettings, HostCapabilities};
use crate::sources::SourceKind;

/// The ordered list of sources the locator will consult.
///
/// The first entry is the primary backend; later entries are the documented
/// fallback allowance, tried only when an earlier source cannot produce the
/// requested certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePlan {
    sources: Vec<SourceKind>,
}

impl SourcePlan {
    pub fn resolve(settings: &CertificateSettings, capabilities: &HostCapabilities) -> Self {
        let mut sources = Vec::new();

        if settings.vault.use_key_vault {
            sources.push(SourceKind::Vault);
        }

        if capabilities.managed_hosting
            && capabilities.store_loading_enabled
            && settings.store.is_configured()
        {
            sources.push(SourceKind::PlatformStore);
        }

        if settings.local.is_configured() {
            sources.push(SourceKind::LocalFile);
        }

        Self { sources }
    }

    pub fn sources(&self) -> &[SourceKind] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
