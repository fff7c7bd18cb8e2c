use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which logical certificate is being requested.
///
/// Used purely as a lookup key: every source maps a role to its own locator
/// (a file path, a store thumbprint or a vault secret name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateRole {
    /// The certificate this service presents to its clients
    Server,
    /// The private CA that issued the client certificates
    #[serde(rename = "ca")]
    CertificateAuthority,
    /// The client certificate this deployment expects callers to present
    Client,
}

impl CertificateRole {
    pub const ALL: [CertificateRole; 3] =
        [Self::Server, Self::CertificateAuthority, Self::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::CertificateAuthority => "ca",
            Self::Client => "client",
        }
    }

    /// Server and client certificates are shipped with their private key; the
    /// CA is a bare public certificate.
    pub fn carries_private_key(&self) -> bool {
        !matches!(self, Self::CertificateAuthority)
    }
}

impl FromStr for CertificateRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "ca" | "certificate_authority" => Ok(Self::CertificateAuthority),
            "client" => Ok(Self::Client),
            _ => Err(format!("Unknown certificate role: {}", s)),
        }
    }
}

impl fmt::Display for CertificateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
