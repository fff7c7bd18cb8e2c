use base64::{engine::general_purpose::STANDARD, Engine as _};
use certward::certificates::decode_certificate;
use certward::validation::ValidationPath;
use certward::{
    CertificateRole, CertificateService, CertificateSettings, DefaultCertificateService,
    HostCapabilities, Passphrase, SourceKind, ValidationFailure,
};
use http::HeaderMap;

use super::support::{CertificateFixtures, CLIENT_PASSWORD, SERVER_PASSWORD};

fn local_settings(fixtures: &CertificateFixtures) -> CertificateSettings {
    let mut settings = CertificateSettings::default();
    // Relative paths resolve through the content root.
    settings.local.server_cert = Some("server.pfx".to_string());
    settings.local.server_cert_password = Some(Passphrase::new(SERVER_PASSWORD));
    settings.local.ca_cert = Some("ca.crt".to_string());
    settings.local.client_cert = Some(fixtures.client_pfx.display().to_string());
    settings.local.client_cert_password = Some(Passphrase::new(CLIENT_PASSWORD));
    settings.content_root = Some(fixtures.dir().to_path_buf());
    settings
}

async fn service(fixtures: &CertificateFixtures) -> DefaultCertificateService {
    DefaultCertificateService::from_settings(&local_settings(fixtures), &HostCapabilities::default()).await
}

#[tokio::test]
async fn loads_every_role_from_local_files() -> anyhow::Result<()> {
    let fixtures = CertificateFixtures::generate("Acme")?;
    let service = service(&fixtures).await;

    assert_eq!(service.locator().source_kinds(), vec![SourceKind::LocalFile]);

    let server = service.load_server().await?;
    assert!(server.subject().contains("Acme Server"));
    assert!(server.has_private_key());
    assert_eq!(server.source(), Some(SourceKind::LocalFile));

    let ca = service.load_ca().await?;
    assert!(ca.subject().contains("Acme Root CA"));
    assert!(!ca.has_private_key());
    assert_eq!(server.issuer(), ca.subject());

    let client = service.load_client().await?;
    assert!(client.subject().contains("Acme Client"));
    Ok(())
}

#[tokio::test]
async fn valid_client_passes_and_expired_client_fails() -> anyhow::Result<()> {
    let fixtures = CertificateFixtures::generate("Acme")?;
    let service = service(&fixtures).await;

    let client = service.load_client().await?;
    assert!(service.validate_client(&client).await);

    let expired = decode_certificate(&std::fs::read(&fixtures.expired_client_crt)?, None)?;
    assert!(!service.validate_client(&expired).await);

    let result = service.validation_result(&expired).await;
    assert_eq!(result.path, ValidationPath::ChainBuild);
    assert!(result.has_failure(|f| matches!(f, ValidationFailure::Expired { .. })));
    Ok(())
}

#[tokio::test]
async fn foreign_client_is_rejected() -> anyhow::Result<()> {
    let fixtures = CertificateFixtures::generate("Acme")?;
    let service = service(&fixtures).await;

    let foreign = certward::LoadedCertificate::from_der(fixtures.foreign_client_der()?)?;
    let result = service.validation_result(&foreign).await;

    assert!(!result.passed);
    assert!(result.has_failure(|f| matches!(f, ValidationFailure::UntrustedRoot)));
    Ok(())
}

#[tokio::test]
async fn missing_role_reports_not_found() -> anyhow::Result<()> {
    let fixtures = CertificateFixtures::generate("Acme")?;
    let mut settings = local_settings(&fixtures);
    settings.local.server_cert = Some("missing.pfx".to_string());

    let service = DefaultCertificateService::from_settings(&settings, &HostCapabilities::default()).await;
    let err = service.load_server().await.unwrap_err();

    assert_eq!(err.role, CertificateRole::Server);
    assert_eq!(err.attempts.len(), 1);
    assert!(!err.access_denied());
    Ok(())
}

#[tokio::test]
async fn forwarded_client_certificate_authenticates() -> anyhow::Result<()> {
    let fixtures = CertificateFixtures::generate("Acme")?;
    let service = service(&fixtures).await;
    let client = service.load_client().await?;

    let mut headers = HeaderMap::new();
    headers.insert("X-ARR-ClientCert", STANDARD.encode(client.der()).parse()?);
    headers.insert("X-ARR-SSL", "2048|256|CN=proxy".parse()?);
    headers.insert("X-Forwarded-Proto", "https".parse()?);

    let authenticated = service.authenticate_request(&headers).await;
    assert_eq!(authenticated.as_ref().map(|c| c.thumbprint()), Some(client.thumbprint()));

    headers.remove("X-ARR-ClientCert");
    assert!(service.authenticate_request(&headers).await.is_none());
    Ok(())
}
