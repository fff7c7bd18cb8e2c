//! Round trip through a real Vault server.
//!
//! Needs `VAULT_ADDR` and a `VAULT_TOKEN` allowed to write `secret/data/certward-*`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use certward::config::VaultSourceSettings;
use certward::sources::{KvVaultClient, VaultSource};
use certward::{CertificateLocator, CertificateRole, SourceKind};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::kv2;

use super::support::CertificateFixtures;

#[tokio::test]
async fn loads_ca_written_to_vault() -> anyhow::Result<()> {
    let address = std::env::var("VAULT_ADDR").context("VAULT_ADDR not set")?;
    let token = std::env::var("VAULT_TOKEN").context("VAULT_TOKEN not set")?;
    let fixtures = CertificateFixtures::generate("Live")?;

    let admin = VaultClient::new(
        VaultClientSettingsBuilder::default().address(&address).token(&token).build()?,
    )?;
    let mut secret = HashMap::new();
    secret.insert("certificate", std::fs::read_to_string(&fixtures.ca_crt)?);
    kv2::set(&admin, "secret", "certward-live-ca", &secret).await?;

    let settings = VaultSourceSettings {
        use_key_vault: true,
        vault_url: Some(address.clone()),
        ca_cert_name: Some("certward-live-ca".to_string()),
        ..VaultSourceSettings::default()
    };
    let client = KvVaultClient::with_token(&address, &token, &settings.mount_path)?;
    let locator = CertificateLocator::new(vec![Arc::new(VaultSource::new(Arc::new(client), settings))]);

    let ca = locator.load(CertificateRole::CertificateAuthority).await?;
    assert!(ca.subject().contains("Live Root CA"));
    assert_eq!(ca.source(), Some(SourceKind::Vault));
    Ok(())
}
