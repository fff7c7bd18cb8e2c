//! Platform certificate store source.
//!
//! The hosting platform drops certificates into per-scope directories, named
//! by thumbprint: `<THUMBPRINT>.p12` for private entries (empty passphrase)
//! and `<THUMBPRINT>.der`, `.cer` or `.pem` for public ones. A named entry
//! is only returned when its computed thumbprint agrees with the name. When
//! no file qualifies by name, each file in the scope is decoded and its
//! computed thumbprint compared.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use super::backend::{CertificateMaterial, CertificateSource, SourceKind};
use super::error::{Result, SourceError};
use crate::certificates::{decode_certificate, normalize_thumbprint, CertificateRole};
use crate::config::StoreSourceSettings;

const ENTRY_EXTENSIONS: [&str; 5] = ["p12", "pfx", "der", "cer", "pem"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreLocation {
    CurrentUser,
    LocalMachine,
}

impl StoreLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentUser => "current_user",
            Self::LocalMachine => "local_machine",
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreScope {
    pub location: StoreLocation,
    pub root: PathBuf,
}

pub struct PlatformStoreSource {
    settings: StoreSourceSettings,
    scopes: Vec<StoreScope>,
}

impl PlatformStoreSource {
    /// User scope first, then machine scope.
    pub fn new(settings: StoreSourceSettings) -> Self {
        let scopes = vec![
            StoreScope { location: StoreLocation::CurrentUser, root: settings.user_store_dir.clone() },
            StoreScope {
                location: StoreLocation::LocalMachine,
                root: settings.machine_store_dir.clone(),
            },
        ];
        Self { settings, scopes }
    }

    pub fn scopes(&self) -> &[StoreScope] {
        &self.scopes
    }

    async fn search_scope(
        &self,
        scope: &StoreScope,
        thumbprint: &str,
    ) -> std::io::Result<Option<CertificateMaterial>> {
        for extension in ENTRY_EXTENSIONS {
            let path = scope.root.join(format!("{}.{}", thumbprint, extension));
            match tokio::fs::read(&path).await {
                Ok(bytes) if has_thumbprint(&bytes, thumbprint) => {
                    return Ok(Some(CertificateMaterial::new(bytes, path.display().to_string())));
                }
                Ok(_) => {
                    tracing::warn!(
                        path = %path.display(),
                        thumbprint = %thumbprint,
                        "Store entry does not hold the certificate its name claims, ignoring"
                    );
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            }
        }

        let mut entries = tokio::fs::read_dir(&scope.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable store entry");
                    continue;
                }
            };

            if has_thumbprint(&bytes, thumbprint) {
                return Ok(Some(CertificateMaterial::new(bytes, path.display().to_string())));
            }
        }

        Ok(None)
    }
}

/// Store entries open with the empty passphrase.
fn has_thumbprint(bytes: &[u8], thumbprint: &str) -> bool {
    decode_certificate(bytes, None)
        .map(|cert| cert.thumbprint() == thumbprint)
        .unwrap_or(false)
}

#[async_trait]
impl CertificateSource for PlatformStoreSource {
    fn kind(&self) -> SourceKind {
        SourceKind::PlatformStore
    }

    fn locator_for(&self, role: CertificateRole) -> Option<String> {
        self.settings.thumbprint_for(role).map(normalize_thumbprint)
    }

    async fn find(&self, role: CertificateRole, locator: &str) -> Result<CertificateMaterial> {
        let thumbprint = normalize_thumbprint(locator);

        for scope in &self.scopes {
            match self.search_scope(scope, &thumbprint).await {
                Ok(Some(material)) => return Ok(material),
                Ok(None) => {
                    tracing::debug!(
                        role = %role,
                        scope = %scope.location,
                        thumbprint = %thumbprint,
                        "Thumbprint not present in store scope"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        role = %role,
                        scope = %scope.location,
                        root = %scope.root.display(),
                        error = %e,
                        "Store scope inaccessible, skipping"
                    );
                }
            }
        }

        Err(SourceError::not_found(format!("thumbprint {}", thumbprint)))
    }
}
