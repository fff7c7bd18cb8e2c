//! # Configuration Management
//!
//! Settings are read once at startup from an optional TOML file and
//! `CERTWARD__`-prefixed environment variables. Host capabilities are probed
//! separately and combined with the settings into a [`SourcePlan`].

pub mod capabilities;
pub mod plan;
pub mod settings;

pub use capabilities::HostCapabilities;
pub use plan::SourcePlan;
pub use settings::{
    CertificateSettings, LocalSourceSettings, StoreSourceSettings, VaultSourceSettings, ENV_PREFIX,
};
