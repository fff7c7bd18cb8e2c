use std::path::{Path, PathBuf};

use anyhow::Context;
use p12_keystore::{Certificate as P12Certificate, KeyStore, KeyStoreEntry, PrivateKeyChain};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair, KeyUsagePurpose,
};
use tempfile::TempDir;
use time::{Duration, OffsetDateTime};

pub const SERVER_PASSWORD: &str = "server-secret";
pub const CLIENT_PASSWORD: &str = "client-secret";

/// A throwaway CA plus the certificate files a deployment would mount.
pub struct CertificateFixtures {
    temp_dir: TempDir,
    ca: Certificate,
    ca_key: KeyPair,
    pub server_pfx: PathBuf,
    pub ca_crt: PathBuf,
    pub client_pfx: PathBuf,
    pub expired_client_crt: PathBuf,
}

impl CertificateFixtures {
    pub fn generate(name: &str) -> anyhow::Result<Self> {
        let temp_dir = TempDir::new().context("create temp dir")?;

        let ca_key = KeyPair::generate().context("generate CA key")?;
        let mut params = CertificateParams::new(Vec::<String>::new()).context("build CA params")?;
        params.distinguished_name.push(DnType::CommonName, format!("{name} Root CA"));
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        let ca = params.self_signed(&ca_key).context("self-sign CA")?;

        let now = OffsetDateTime::now_utc();
        let dir = temp_dir.path().to_path_buf();

        let ca_crt = dir.join("ca.crt");
        std::fs::write(&ca_crt, ca.pem()).context("write CA")?;

        let fixtures = Self {
            temp_dir,
            ca,
            ca_key,
            server_pfx: dir.join("server.pfx"),
            ca_crt,
            client_pfx: dir.join("client.pfx"),
            expired_client_crt: dir.join("expired-client.crt"),
        };

        let (server, server_key) =
            fixtures.issue(&format!("{name} Server"), now - Duration::days(1), now + Duration::days(90))?;
        std::fs::write(&fixtures.server_pfx, pkcs12(&server, &server_key, SERVER_PASSWORD)?)
            .context("write server pfx")?;

        let (client, client_key) =
            fixtures.issue(&format!("{name} Client"), now - Duration::days(1), now + Duration::days(90))?;
        std::fs::write(&fixtures.client_pfx, pkcs12(&client, &client_key, CLIENT_PASSWORD)?)
            .context("write client pfx")?;

        let (expired, _) =
            fixtures.issue(&format!("{name} Expired Client"), now - Duration::days(60), now - Duration::days(1))?;
        std::fs::write(&fixtures.expired_client_crt, expired.der().to_vec())
            .context("write expired client")?;

        Ok(fixtures)
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Client certificate signed by a CA the service does not trust.
    pub fn foreign_client_der(&self) -> anyhow::Result<Vec<u8>> {
        let rogue_key = KeyPair::generate().context("generate rogue key")?;
        let mut params = CertificateParams::new(Vec::<String>::new())?;
        params.distinguished_name.push(DnType::CommonName, "Rogue CA");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let rogue = params.self_signed(&rogue_key)?;

        let key = KeyPair::generate()?;
        let mut params = CertificateParams::new(vec!["localhost".to_string()])?;
        params.distinguished_name.push(DnType::CommonName, "Rogue Client");
        Ok(params.signed_by(&key, &rogue, &rogue_key)?.der().to_vec())
    }

    fn issue(
        &self,
        common_name: &str,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> anyhow::Result<(Certificate, KeyPair)> {
        let key = KeyPair::generate().context("generate leaf key")?;
        let mut params = CertificateParams::new(vec!["localhost".to_string()])
            .context("build leaf params")?;
        params.distinguished_name.push(DnType::CommonName, common_name);
        params.not_before = not_before;
        params.not_after = not_after;
        let cert = params.signed_by(&key, &self.ca, &self.ca_key).context("sign leaf")?;
        Ok((cert, key))
    }
}

fn pkcs12(cert: &Certificate, key: &KeyPair, password: &str) -> anyhow::Result<Vec<u8>> {
    let der = cert.der().to_vec();
    let local_key_id = hex::decode(certward::certificates::compute_thumbprint(&der))?;
    let chain = PrivateKeyChain::new(
        key.serialize_der(),
        local_key_id,
        vec![P12Certificate::from_der(&der).context("wrap certificate")?],
    );
    let mut keystore = KeyStore::new();
    keystore.add_entry("certward", KeyStoreEntry::PrivateKeyChain(chain));
    keystore.writer(password).write().context("write pkcs12")
}
