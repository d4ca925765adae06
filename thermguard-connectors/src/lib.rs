//! Host-side Adapters for the ThermGuard Monitor
//!
//! ## Overview
//!
//! `thermguard-core` never touches an operating system. This crate supplies
//! the std-side pieces a deployment wires around it:
//!
//! - [`config`]: load a [`MonitorConfig`](thermguard_core::MonitorConfig)
//!   from JSON, with every missing field taking its default
//! - [`query`]: the `/api/thermistors` handler over [`http`] request and
//!   response types, and its JSON rendering
//! - [`can`]: bus bring-up (driver install then start) and an in-process
//!   [`LoopbackBus`](can::LoopbackBus) that stands in for the controller
//!
//! ## Startup Sequence
//!
//! Startup mirrors the pack controller: bring the bus up, then build the
//! monitor. Any failure aborts before the loop starts.
//!
//! ```rust
//! use thermguard_connectors::{can, config, ConnectorError};
//! use thermguard_core::{time::NoDelay, ChannelId, PackMonitor};
//!
//! let config = config::from_json_str(r#"{ "segments": [{ "id": 1, "channels": [6] }] }"#)?;
//!
//! let mut bus = can::LoopbackBus::new();
//! can::bring_up(&mut bus, &can::BusConfig::default())?;
//!
//! let mut monitor = PackMonitor::new(config)?;
//! let mut adc = |_: ChannelId| 2400u16;
//! let report = monitor.run_cycle(&mut adc, &mut bus, &mut NoDelay);
//! assert_eq!(report.frames_sent, 1);
//! # Ok::<(), ConnectorError>(())
//! ```

pub mod can;
pub mod config;
pub mod query;

// Re-export common types
pub use can::{bring_up, BusConfig, BusMode, CanDriver, LoopbackBus};
pub use query::{render_report, QueryEndpoint, THERMISTORS_PATH};

use thermguard_core::{ConfigError, MonitorError};
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be parsed or produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Monitor refused to start
    #[error("Startup failed: {0}")]
    Startup(#[from] MonitorError),
}

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
