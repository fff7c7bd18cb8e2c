//! # Configuration Settings
//!
//! Certificate source configuration: one group per backend, plus the
//! forwarded-header settings and an optional content root for relative paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::certificates::{CertificateRole, Passphrase};
use crate::errors::{Error, Result};
use crate::forwarded::ForwardedCertificateConfig;

/// Environment variable prefix; nested keys use `__`, e.g.
/// `CERTWARD__VAULT__USE_KEY_VAULT=true`.
pub const ENV_PREFIX: &str = "CERTWARD";

/// Complete certificate configuration, resolved once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct CertificateSettings {
    /// Local filesystem source
    #[validate(nested)]
    pub local: LocalSourceSettings,

    /// Platform certificate store source
    #[validate(nested)]
    pub store: StoreSourceSettings,

    /// Secrets vault source
    #[validate(nested)]
    pub vault: VaultSourceSettings,

    /// Forwarded client certificate header handling
    pub forwarded: ForwardedCertificateConfig,

    /// Directory relative local paths are resolved against when the literal
    /// path does not exist
    pub content_root: Option<PathBuf>,
}

impl CertificateSettings {
    /// Load settings from defaults, an optional TOML file and `CERTWARD__*`
    /// environment variables, in that order of precedence.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// As [`CertificateSettings::load`], reading environment overrides from
    /// `env` instead of the process environment when provided.
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__").source(env));

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.vault.use_key_vault {
            let raw = self
                .vault
                .vault_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| Error::config("vault.vault_url is required when use_key_vault is true"))?;

            let parsed = url::Url::parse(raw)
                .map_err(|e| Error::config(format!("vault.vault_url is not a valid URL: {}", e)))?;

            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config(format!(
                    "vault.vault_url must use http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }

        Ok(())
    }
}

/// Local filesystem locators: bundle paths and their passphrases.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct LocalSourceSettings {
    /// PKCS#12 or PEM bundle holding the server certificate and key
    pub server_cert: Option<String>,
    pub server_cert_password: Option<Passphrase>,

    /// Public CA certificate (DER or PEM), never passphrase protected
    pub ca_cert: Option<String>,

    /// PKCS#12 or PEM bundle holding the expected client certificate
    pub client_cert: Option<String>,
    pub client_cert_password: Option<Passphrase>,
}

impl LocalSourceSettings {
    pub fn path_for(&self, role: CertificateRole) -> Option<&str> {
        let path = match role {
            CertificateRole::Server => self.server_cert.as_deref(),
            CertificateRole::CertificateAuthority => self.ca_cert.as_deref(),
            CertificateRole::Client => self.client_cert.as_deref(),
        };
        non_empty(path)
    }

    pub fn password_for(&self, role: CertificateRole) -> Option<&Passphrase> {
        match role {
            CertificateRole::Server => self.server_cert_password.as_ref(),
            CertificateRole::CertificateAuthority => None,
            CertificateRole::Client => self.client_cert_password.as_ref(),
        }
    }

    pub fn is_configured(&self) -> bool {
        CertificateRole::ALL.iter().any(|role| self.path_for(*role).is_some())
    }
}

/// Platform certificate store locators.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StoreSourceSettings {
    pub server_cert_thumbprint: Option<String>,
    pub ca_cert_thumbprint: Option<String>,
    pub client_cert_thumbprint: Option<String>,

    /// Per-user scope, searched first (private entries with keys)
    pub user_store_dir: PathBuf,

    /// Machine-wide scope, searched second; may be unreadable on some hosts
    pub machine_store_dir: PathBuf,
}

impl Default for StoreSourceSettings {
    fn default() -> Self {
        Self {
            server_cert_thumbprint: None,
            ca_cert_thumbprint: None,
            client_cert_thumbprint: None,
            user_store_dir: PathBuf::from("/var/ssl/private"),
            machine_store_dir: PathBuf::from("/var/ssl/certs"),
        }
    }
}

impl StoreSourceSettings {
    pub fn thumbprint_for(&self, role: CertificateRole) -> Option<&str> {
        let thumbprint = match role {
            CertificateRole::Server => self.server_cert_thumbprint.as_deref(),
            CertificateRole::CertificateAuthority => self.ca_cert_thumbprint.as_deref(),
            CertificateRole::Client => self.client_cert_thumbprint.as_deref(),
        };
        non_empty(thumbprint)
    }

    pub fn is_configured(&self) -> bool {
        CertificateRole::ALL.iter().any(|role| self.thumbprint_for(*role).is_some())
    }
}

/// Secrets vault locators.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultSourceSettings {
    /// Master switch; the vault is never contacted unless this is set
    pub use_key_vault: bool,

    pub vault_url: Option<String>,

    pub server_cert_name: Option<String>,
    pub ca_cert_name: Option<String>,
    pub client_cert_name: Option<String>,

    /// KV v2 mount holding the certificate secrets
    #[validate(length(min = 1, message = "Vault mount path cannot be empty"))]
    pub mount_path: String,

    /// Kubernetes auth role, used when no `VAULT_TOKEN` is present
    pub auth_role: Option<String>,

    /// Upper bound for every vault round-trip
    #[validate(range(min = 1, max = 60, message = "Vault timeout must be between 1 and 60 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for VaultSourceSettings {
    fn default() -> Self {
        Self {
            use_key_vault: false,
            vault_url: None,
            server_cert_name: None,
            ca_cert_name: None,
            client_cert_name: None,
            mount_path: "secret".to_string(),
            auth_role: None,
            timeout_seconds: 5,
        }
    }
}

impl VaultSourceSettings {
    pub fn name_for(&self, role: CertificateRole) -> Option<&str> {
        let name = match role {
            CertificateRole::Server => self.server_cert_name.as_deref(),
            CertificateRole::CertificateAuthority => self.ca_cert_name.as_deref(),
            CertificateRole::Client => self.client_cert_name.as_deref(),
        };
        non_empty(name)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
