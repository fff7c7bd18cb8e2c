//! Local filesystem source.
//!
//! Server and client roles point at a PKCS#12 or PEM bundle with the private
//! key; the CA role points at a bare public certificate. Relative paths are
//! tried as given first, then under the configured content root.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::backend::{CertificateMaterial, CertificateSource, SourceKind};
use super::error::{Result, SourceError};
use crate::certificates::CertificateRole;
use crate::config::LocalSourceSettings;

pub struct LocalFileSource {
    settings: LocalSourceSettings,
    content_root: Option<PathBuf>,
}

impl LocalFileSource {
    pub fn new(settings: LocalSourceSettings, content_root: Option<PathBuf>) -> Self {
        Self { settings, content_root }
    }

    /// Candidate paths for a locator, in the order they are tried.
    pub fn candidates(&self, locator: &str) -> Vec<PathBuf> {
        let literal = PathBuf::from(locator);
        let mut candidates = vec![literal.clone()];

        if let Some(root) = &self.content_root {
            if literal.is_relative() {
                candidates.push(root.join(&literal));
            }
        }

        candidates
    }
}

#[async_trait]
impl CertificateSource for LocalFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LocalFile
    }

    fn locator_for(&self, role: CertificateRole) -> Option<String> {
        self.settings.path_for(role).map(str::to_string)
    }

    async fn find(&self, role: CertificateRole, locator: &str) -> Result<CertificateMaterial> {
        for path in self.candidates(locator) {
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    tracing::debug!(role = %role, path = %path.display(), "Read certificate file");
                    return Ok(CertificateMaterial::new(bytes, path.display().to_string())
                        .with_passphrase(self.settings.password_for(role).cloned()));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(role = %role, path = %path.display(), "Certificate file not present");
                }
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    return Err(SourceError::access_denied(
                        path.display().to_string(),
                        format!(
                            "grant the service account read permission on {}",
                            path.display()
                        ),
                    ));
                }
                Err(e) => {
                    return Err(SourceError::unreachable(format!(
                        "failed to read {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(SourceError::not_found(locator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::testing::TestPki;
    use crate::certificates::Passphrase;

    fn settings(server: Option<&str>, ca: Option<&str>) -> LocalSourceSettings {
        LocalSourceSettings {
            server_cert: server.map(str::to_string),
            server_cert_password: Some(Passphrase::new("changeit")),
            ca_cert: ca.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_locator_for_roles() {
        let source = LocalFileSource::new(settings(Some("server.pfx"), None), None);
        assert_eq!(source.locator_for(CertificateRole::Server), Some("server.pfx".to_string()));
        assert_eq!(source.locator_for(CertificateRole::CertificateAuthority), None);
        assert_eq!(source.locator_for(CertificateRole::Client), None);
    }

    #[test]
    fn test_candidates_include_content_root_for_relative_paths() {
        let source =
            LocalFileSource::new(settings(None, None), Some(PathBuf::from("/srv/content")));
        assert_eq!(
            source.candidates("certs/ca.crt"),
            vec![PathBuf::from("certs/ca.crt"), PathBuf::from("/srv/content/certs/ca.crt")]
        );
        assert_eq!(source.candidates("/etc/ca.crt"), vec![PathBuf::from("/etc/ca.crt")]);
    }

    #[tokio::test]
    async fn test_reads_bundle_with_role_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        let pki = TestPki::new("Local CA");
        let pfx = pki.issue("local-server").pkcs12("changeit");
        std::fs::write(dir.path().join("server.pfx"), &pfx).unwrap();

        let source = LocalFileSource::new(
            settings(Some("server.pfx"), None),
            Some(dir.path().to_path_buf()),
        );
        let material = source.find(CertificateRole::Server, "server.pfx").await.unwrap();

        assert_eq!(material.passphrase.as_ref().map(Passphrase::expose), Some("changeit"));
        let cert = material.decode().unwrap();
        assert_eq!(cert.subject_common_name(), Some("local-server"));
    }

    #[tokio::test]
    async fn test_ca_has_no_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        let pki = TestPki::new("Local CA");
        let path = dir.path().join("ca.crt");
        std::fs::write(&path, pki.ca_pem()).unwrap();

        let locator = path.display().to_string();
        let source = LocalFileSource::new(settings(None, Some(&locator)), None);
        let material = source.find(CertificateRole::CertificateAuthority, &locator).await.unwrap();

        assert!(material.passphrase.is_none());
        assert_eq!(material.decode().unwrap().subject_common_name(), Some("Local CA"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalFileSource::new(settings(None, None), Some(dir.path().to_path_buf()));

        let err = source.find(CertificateRole::Server, "absent.pfx").await.unwrap_err();
        assert_eq!(err, SourceError::not_found("absent.pfx"));
    }
}
