use std::sync::Arc;

use certward::config::VaultSourceSettings;
use certward::sources::{KvVaultClient, LocalFileSource, VaultSource};
use certward::{CertificateLocator, CertificateRole, CertificateSource, SourceError, SourceKind};
use serde_json::json;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::CertificateFixtures;

async fn denying_vault() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/secret/data/.+$"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })),
        )
        .mount(&server)
        .await;
    server
}

fn vault_source(server: &MockServer) -> anyhow::Result<Arc<dyn CertificateSource>> {
    let settings = VaultSourceSettings {
        use_key_vault: true,
        vault_url: Some(server.uri()),
        server_cert_name: Some("server-cert".to_string()),
        ca_cert_name: Some("ca-cert".to_string()),
        client_cert_name: Some("client-cert".to_string()),
        ..VaultSourceSettings::default()
    };
    let client = KvVaultClient::with_token(&server.uri(), "test-token", &settings.mount_path)?;
    Ok(Arc::new(VaultSource::new(Arc::new(client), settings)))
}

#[tokio::test]
async fn access_denied_everywhere_is_not_found() -> anyhow::Result<()> {
    let server = denying_vault().await;
    let locator = CertificateLocator::new(vec![vault_source(&server)?]);

    let err = locator.load(CertificateRole::Server).await.unwrap_err();

    assert!(err.access_denied());
    assert_eq!(err.attempts.len(), 1);
    match &err.attempts[0] {
        (SourceKind::Vault, SourceError::AccessDenied { locator, remediation }) => {
            assert_eq!(locator, "secret/data/server-cert");
            assert!(remediation.contains("secret/data/server-cert"));
        }
        other => panic!("expected vault access denied, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn access_denied_falls_through_to_local_files() -> anyhow::Result<()> {
    let server = denying_vault().await;
    let fixtures = CertificateFixtures::generate("Fallback")?;

    let mut local = certward::config::LocalSourceSettings::default();
    local.ca_cert = Some(fixtures.ca_crt.display().to_string());

    let locator = CertificateLocator::new(vec![
        vault_source(&server)?,
        Arc::new(LocalFileSource::new(local, None)),
    ]);

    let ca = locator.load(CertificateRole::CertificateAuthority).await?;
    assert!(ca.subject().contains("Fallback Root CA"));
    assert_eq!(ca.source(), Some(SourceKind::LocalFile));
    Ok(())
}
