//! # Observability Infrastructure
//!
//! Structured logging for certificate acquisition and validation.

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
