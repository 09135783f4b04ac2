//! TOML configuration loader with validation.
//!
//! Thin layer over [`ConfigLoader`]: parse, then run every bound check so
//! callers only ever see a validated [`CoreConfig`].

use std::path::Path;

use sst_common::config::{ConfigError, ConfigLoader};
use sst_common::robot::config::CoreConfig;
use tracing::{debug, info};

/// Load and validate the core configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CoreConfig, ConfigError> {
    debug!("loading configuration from {}", path.display());
    let config = CoreConfig::load(path)?;
    config.validate()?;
    info!(
        "configuration loaded: tick={}s supply={}V",
        config.cycle.tick_period_s, config.cycle.supply_voltage
    );
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(toml: &str) -> Result<CoreConfig, ConfigError> {
    let config = CoreConfig::from_toml(toml)?;
    config.validate()?;
    Ok(config)
}
