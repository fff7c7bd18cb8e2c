//! Host capability descriptor, probed once at startup.
//!
//! Platform-identity variables are only ever read here. Everything
//! downstream receives the resulting [`HostCapabilities`] value instead of
//! looking at the environment itself.

use serde::Serialize;

/// Variables whose presence means the process runs under a managed host.
const MANAGED_HOST_VARS: [&str; 4] =
    ["WEBSITE_SITE_NAME", "WEBSITE_INSTANCE_ID", "CONTAINER_APP_NAME", "KUBERNETES_SERVICE_HOST"];

/// Set by the host when it has loaded certificates into the platform store.
const STORE_LOADING_VAR: &str = "WEBSITE_LOAD_CERTIFICATES";

/// Explicit override for chain-build reliability.
pub const CHAIN_BUILD_OVERRIDE_VAR: &str = "CERTWARD_CHAIN_BUILD_RELIABLE";

/// What the ambient host can and cannot do for certificate handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostCapabilities {
    /// Running under a managed hosting platform
    pub managed_hosting: bool,

    /// The host populates the platform certificate store
    pub store_loading_enabled: bool,

    /// X.509 chain building works here; false selects relaxed validation
    pub chain_build_reliable: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self { managed_hosting: false, store_loading_enabled: false, chain_build_reliable: true }
    }
}

impl HostCapabilities {
    /// Probe the process environment.
    pub fn from_env() -> Self {
        Self::detect(&|name| std::env::var(name).ok())
    }

    /// Probe using an arbitrary variable lookup on the current OS family.
    pub fn detect(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        Self::detect_for_os(lookup, std::env::consts::OS)
    }

    pub fn detect_for_os(lookup: &dyn Fn(&str) -> Option<String>, os: &str) -> Self {
        let present = |name: &str| lookup(name).map(|v| !v.trim().is_empty()).unwrap_or(false);

        let managed_hosting = MANAGED_HOST_VARS.iter().any(|name| present(name));
        let store_loading_enabled = present(STORE_LOADING_VAR);

        // Managed container runtimes lack the trust-store plumbing chain
        // building relies on.
        let container_runtime =
            present("CONTAINER_APP_NAME") || (present("WEBSITE_SITE_NAME") && os == "linux");

        let chain_build_reliable = lookup(CHAIN_BUILD_OVERRIDE_VAR)
            .and_then(|value| parse_flag(&value))
            .unwrap_or(!container_runtime);

        Self { managed_hosting, store_loading_enabled, chain_build_reliable }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
