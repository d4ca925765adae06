//! Core monitoring engine for ThermGuard
//!
//! Turns raw thermistor ADC codes from a battery pack into calibrated
//! temperatures, demotes misbehaving sensors, aggregates each segment and
//! reports it to the BMS master as a checksummed CAN frame.
//! Designed for the pack controller itself.
//!
//! Key constraints:
//! - No heap allocation; every collection is `heapless`
//! - Single cooperative loop, hardware injected per call
//! - Sensor faults are state, never errors
//!
//! ```no_run
//! use thermguard_core::{MonitorConfig, PackMonitor};
//! use thermguard_core::thermistor::ChannelId;
//! use thermguard_core::time::NoDelay;
//! # use thermguard_core::transport::Transport;
//! # fn bus() -> impl Transport { struct B; impl Transport for B { type Error = (); fn send(&mut self, _: &thermguard_core::frame::CanFrame, _: fugit::MillisDurationU32) -> Result<(), ()> { Ok(()) } } B }
//!
//! let mut monitor = PackMonitor::new(MonitorConfig::default()).unwrap();
//! let mut adc = |_channel: ChannelId| 2048u16;
//! let mut bus = bus();
//!
//! loop {
//!     let report = monitor.run_cycle(&mut adc, &mut bus, &mut NoDelay);
//!     if report.latch_tripped {
//!         // BMS sees the fault count from here on
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod calibration;
pub mod config;
pub mod constants;
pub mod errors;
pub mod fault;
pub mod frame;
pub mod monitor;
pub mod report;
pub mod sampler;
pub mod segment;
pub mod thermistor;
pub mod time;
pub mod transport;

// Public API
pub use calibration::{CalibrationEntry, TemperatureConverter};
pub use config::{CanSettings, MonitorConfig, SegmentConfig};
pub use errors::{ConfigError, FrameError, MonitorError, MonitorResult};
pub use fault::{FaultDetector, FaultLatch, FaultThresholds};
pub use frame::{CanFrame, CanFrameEncoder, ExtendedId, SegmentFrame};
pub use monitor::{CycleReport, MonitorStats, PackMonitor};
pub use report::{ThermistorEntry, ThermistorReport};
pub use sampler::{AnalogSource, VoltageSampler};
pub use segment::{Segment, SegmentId, SegmentSummary};
pub use thermistor::{ChannelId, Thermistor};
pub use transport::{PollingTransport, SendError, Transmit, Transport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
