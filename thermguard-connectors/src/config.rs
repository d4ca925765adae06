//! JSON Configuration Loading
//!
//! Every section of [`MonitorConfig`] carries serde defaults, so a file only
//! states what differs from the stock pack:
//!
//! ```json
//! {
//!   "can": { "cycle_budget_ms": 200 },
//!   "segments": [
//!     { "id": 1, "channels": [0, 1, 2, 3] },
//!     { "id": 2, "channels": [4, 5, 6, 7] }
//!   ]
//! }
//! ```
//!
//! Loaded configurations are validated before they are returned.

use std::fs;
use std::path::Path;

use log::{debug, info};
use thermguard_core::MonitorConfig;

use crate::ConnectorResult;

/// Parse and validate a configuration from JSON text
pub fn from_json_str(json: &str) -> ConnectorResult<MonitorConfig> {
    let config: MonitorConfig = serde_json::from_str(json)?;
    config.validate()?;
    debug!(
        "Parsed configuration: {} segments, {} thermistors",
        config.segments.len(),
        config.thermistor_count()
    );
    Ok(config)
}

/// Read, parse and validate a configuration file
pub fn load_file(path: impl AsRef<Path>) -> ConnectorResult<MonitorConfig> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let config = from_json_str(&json)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Render a configuration as pretty-printed JSON
pub fn to_json_string(config: &MonitorConfig) -> ConnectorResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
