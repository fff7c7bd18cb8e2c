//! # Structured Logging
//!
//! Subscriber setup and span helpers for certificate operations. Library code
//! only emits `tracing` events; installing a subscriber is left to the binary
//! (or to `tracing-test` in tests).

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log output settings for the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    /// Emit newline-delimited JSON instead of human-readable lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    pub fn verbose(verbose: bool) -> Self {
        Self { level: if verbose { "debug" } else { "info" }.to_string(), ..Self::default() }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Install the global subscriber. Returns `false` when one was already set
/// (integration tests, embedding applications), which is not an error.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let installed = if config.json {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().json().with_env_filter(config.filter()).finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(config.filter()).finish(),
        )
    };

    installed.is_ok()
}

/// Create a debug span for a certificate operation.
///
/// ```rust,ignore
/// let span = cert_span!("load", role = %CertificateRole::Server);
/// ```
#[macro_export]
macro_rules! cert_span {
    ($operation:expr) => {
        tracing::debug_span!("certificate_operation", operation = %$operation)
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!("certificate_operation", operation = %$operation, $($field)*)
    };
}
