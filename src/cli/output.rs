//! Output formatting for CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::certificates::LoadedCertificate;
use crate::sources::SourceKind;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(format!("Unsupported output format: '{}'. Use 'json' or 'text'.", s)),
        }
    }
}

/// What the CLI prints about a certificate. Never includes key material.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub thumbprint: String,
    pub sha256_fingerprint: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub has_private_key: bool,
    pub chain_length: usize,
    pub source: Option<SourceKind>,
}

impl From<&LoadedCertificate> for CertificateSummary {
    fn from(cert: &LoadedCertificate) -> Self {
        Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial_number: cert.serial_number().to_string(),
            thumbprint: cert.thumbprint().to_string(),
            sha256_fingerprint: cert.sha256_fingerprint().to_string(),
            not_before: cert.not_before(),
            not_after: cert.not_after(),
            has_private_key: cert.has_private_key(),
            chain_length: cert.chain().len(),
            source: cert.source(),
        }
    }
}

impl CertificateSummary {
    pub fn to_text(&self) -> String {
        let source = self.source.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        format!(
            "Subject:        {}\n\
             Issuer:         {}\n\
             Serial:         {}\n\
             Thumbprint:     {}\n\
             SHA-256:        {}\n\
             Not before:     {}\n\
             Not after:      {}\n\
             Private key:    {}\n\
             Chain length:   {}\n\
             Source:         {}",
            self.subject,
            self.issuer,
            self.serial_number,
            self.thumbprint,
            self.sha256_fingerprint,
            self.not_before.to_rfc3339(),
            self.not_after.to_rfc3339(),
            if self.has_private_key { "present" } else { "absent" },
            self.chain_length,
            source,
        )
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}
