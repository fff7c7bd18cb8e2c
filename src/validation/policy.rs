use serde::{Deserialize, Serialize};

use crate::certificates::normalize_thumbprint;
use crate::config::HostCapabilities;

/// Revocation checking. Only `NoCheck` exists: there is no CRL or OCSP
/// infrastructure for the private CA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationMode {
    #[default]
    NoCheck,
}

/// Parameters governing trust-chain validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Accept a chain ending at a root that no trust program vouches for.
    /// The client CA is privately issued, so this is normally `true`.
    pub allow_unknown_ca: bool,

    pub revocation_mode: RevocationMode,

    /// Skip chain building and compare issuer/subject common names instead
    pub relaxed: bool,

    /// Thumbprint of the expected client certificate; a leaf with this
    /// thumbprint is accepted before any CA involvement
    pub pinned_thumbprint: Option<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl ValidationPolicy {
    /// Full chain build, private root allowed, no revocation checking.
    pub fn standard() -> Self {
        Self {
            allow_unknown_ca: true,
            revocation_mode: RevocationMode::NoCheck,
            relaxed: false,
            pinned_thumbprint: None,
        }
    }

    pub fn relaxed() -> Self {
        Self { relaxed: true, ..Self::standard() }
    }

    /// Standard where the host can build chains, relaxed where it cannot.
    pub fn for_host(capabilities: &HostCapabilities) -> Self {
        if capabilities.chain_build_reliable {
            Self::standard()
        } else {
            Self::relaxed()
        }
    }

    pub fn with_pinned_thumbprint(mut self, thumbprint: Option<impl AsRef<str>>) -> Self {
        self.pinned_thumbprint = thumbprint
            .map(|t| normalize_thumbprint(t.as_ref()))
            .filter(|t| !t.is_empty());
        self
    }

    pub fn with_allow_unknown_ca(mut self, allow: bool) -> Self {
        self.allow_unknown_ca = allow;
        self
    }
}
