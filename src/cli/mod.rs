//! # Command Line Interface
//!
//! Diagnostic commands for operators: inspect what each source resolves to,
//! validate a client certificate file, and show the resolved source plan.

pub mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::certificates::{read_certificate_file, CertificateRole};
use crate::config::{CertificateSettings, HostCapabilities, SourcePlan};
use crate::observability::{init_logging, LoggingConfig};
use crate::service::DefaultCertificateService;
use crate::sources::SourceKind;
use crate::validation::{TrustChainResult, ValidationPolicy};
use crate::{APP_NAME, VERSION};
use output::{print_json, CertificateSummary, OutputFormat};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(about = "Inspect and validate mTLS certificates across configured sources")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file (environment variables still override it)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Output format: text or json
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a certificate role through the configured sources and describe it
    Inspect {
        /// server, ca or client
        role: CertificateRole,
    },

    /// Validate a client certificate file (DER or PEM) against the configured CA
    Validate {
        path: PathBuf,

        /// Force relaxed (common-name) validation regardless of host detection
        #[arg(long)]
        relaxed: bool,
    },

    /// Show host capabilities and the resolved source order
    Sources,
}

#[derive(Serialize)]
struct SourcesReport {
    capabilities: HostCapabilities,
    sources: Vec<SourceKind>,
    relaxed_validation: bool,
}

#[derive(Serialize)]
struct ValidationReport {
    certificate: CertificateSummary,
    result: TrustChainResult,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig::verbose(cli.verbose).with_json(cli.json_logs));

    let settings = CertificateSettings::load(cli.config.as_deref())
        .context("Failed to load certificate configuration")?;
    let capabilities = HostCapabilities::from_env();

    match cli.command {
        Commands::Inspect { role } => {
            let service = DefaultCertificateService::from_settings(&settings, &capabilities).await;
            match service.locator().load(role).await {
                Ok(cert) => {
                    let summary = CertificateSummary::from(&cert);
                    match cli.output {
                        OutputFormat::Json => print_json(&summary)?,
                        OutputFormat::Text => println!("{}", summary.to_text()),
                    }
                }
                Err(e) => {
                    eprintln!("{}", e);
                    for (source, reason) in &e.attempts {
                        eprintln!("  {}: {}", source, reason);
                    }
                    std::process::exit(1);
                }
            }
        }
        Commands::Validate { path, relaxed } => {
            let cert = read_certificate_file(&path, None)
                .await
                .with_context(|| format!("Cannot load client certificate from {}", path.display()))?;

            let mut service = DefaultCertificateService::from_settings(&settings, &capabilities).await;
            if relaxed {
                service = DefaultCertificateService::new(
                    service.locator().clone(),
                    ValidationPolicy::relaxed(),
                    settings.forwarded.clone(),
                );
            }

            let result = service.validation_result(&cert).await;
            let passed = result.passed;
            let report = ValidationReport { certificate: CertificateSummary::from(&cert), result };

            match cli.output {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Text => {
                    println!("{}", report.certificate.to_text());
                    println!("Validation:     {:?}", report.result.path);
                    println!("Result:         {}", if passed { "PASS" } else { "FAIL" });
                    for failure in &report.result.failures {
                        println!("  - {}", failure);
                    }
                }
            }

            if !passed {
                std::process::exit(1);
            }
        }
        Commands::Sources => {
            let plan = SourcePlan::resolve(&settings, &capabilities);
            let report = SourcesReport {
                capabilities,
                sources: plan.sources().to_vec(),
                relaxed_validation: ValidationPolicy::for_host(&capabilities).relaxed,
            };

            match cli.output {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Text => {
                    println!("Managed hosting:       {}", capabilities.managed_hosting);
                    println!("Store loading enabled: {}", capabilities.store_loading_enabled);
                    println!("Chain build reliable:  {}", capabilities.chain_build_reliable);
                    println!("Relaxed validation:    {}", report.relaxed_validation);
                    if plan.is_empty() {
                        println!("Sources:               (none configured)");
                    } else {
                        for (index, source) in plan.sources().iter().enumerate() {
                            println!("Source {}:              {}", index + 1, source);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
