//! In-crate PKI fixtures for unit tests.

use p12_keystore::{Certificate as P12Certificate, KeyStore, KeyStoreEntry, PrivateKeyChain};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair, KeyUsagePurpose,
};
use time::{Duration, OffsetDateTime};

use super::{compute_thumbprint, LoadedCertificate};

pub(crate) struct TestPki {
    ca: Certificate,
    ca_key: KeyPair,
}

pub(crate) struct IssuedCertificate {
    cert: Certificate,
    key: KeyPair,
}

impl TestPki {
    pub fn new(common_name: &str) -> Self {
        let ca_key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.distinguished_name.push(DnType::CommonName, common_name);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        let ca = params.self_signed(&ca_key).unwrap();
        Self { ca, ca_key }
    }

    /// Subordinate CA signed by this one, able to issue its own leaves.
    pub fn intermediate(&self, common_name: &str) -> TestPki {
        let now = OffsetDateTime::now_utc();
        self.intermediate_with_window(common_name, now - Duration::days(1), now + Duration::days(365))
    }

    pub fn intermediate_with_window(
        &self,
        common_name: &str,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> TestPki {
        let ca_key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.distinguished_name.push(DnType::CommonName, common_name);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        params.not_before = not_before;
        params.not_after = not_after;
        let ca = params.signed_by(&ca_key, &self.ca, &self.ca_key).unwrap();
        TestPki { ca, ca_key }
    }

    pub fn ca_der(&self) -> Vec<u8> {
        self.ca.der().to_vec()
    }

    pub fn ca_pem(&self) -> String {
        self.ca.pem()
    }

    pub fn ca_loaded(&self) -> LoadedCertificate {
        LoadedCertificate::from_der(self.ca_der()).unwrap()
    }

    pub fn issue(&self, common_name: &str) -> IssuedCertificate {
        let now = OffsetDateTime::now_utc();
        self.issue_with_window(common_name, now - Duration::days(1), now + Duration::days(30))
    }

    pub fn issue_expired(&self, common_name: &str) -> IssuedCertificate {
        let now = OffsetDateTime::now_utc();
        self.issue_with_window(common_name, now - Duration::days(60), now - Duration::days(1))
    }

    pub fn issue_with_window(
        &self,
        common_name: &str,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> IssuedCertificate {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
        params.distinguished_name.push(DnType::CommonName, common_name);
        params.not_before = not_before;
        params.not_after = not_after;
        let cert = params.signed_by(&key, &self.ca, &self.ca_key).unwrap();
        IssuedCertificate { cert, key }
    }
}

impl IssuedCertificate {
    pub fn der(&self) -> Vec<u8> {
        self.cert.der().to_vec()
    }

    pub fn cert_pem(&self) -> String {
        self.cert.pem()
    }

    pub fn key_pem(&self) -> String {
        self.key.serialize_pem()
    }

    pub fn loaded(&self) -> LoadedCertificate {
        LoadedCertificate::from_der(self.der()).unwrap()
    }

    pub fn pkcs12(&self, password: &str) -> Vec<u8> {
        let der = self.der();
        let local_key_id = hex::decode(compute_thumbprint(&der)).unwrap();
        let chain = PrivateKeyChain::new(
            self.key.serialize_der(),
            local_key_id,
            vec![P12Certificate::from_der(&der).unwrap()],
        );
        let mut keystore = KeyStore::new();
        keystore.add_entry("certward", KeyStoreEntry::PrivateKeyChain(chain));
        keystore.writer(password).write().unwrap()
    }
}
