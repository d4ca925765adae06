//! Error Types for Monitor Startup and Frame Handling
//!
//! ## Design Philosophy
//!
//! ThermGuard's error system is designed with embedded systems in mind:
//!
//! 1. **Small Size**: Each error variant is kept minimal since errors may be
//!    returned from the control loop on a microcontroller.
//!
//! 2. **No Heap Allocation**: All error data is inline - no String, only
//!    `&'static str` for messages.
//!
//! 3. **Copy Semantics**: Errors implement Copy so they can be logged and
//!    returned without move complications.
//!
//! ## What Is *Not* an Error
//!
//! Sensor faults are data-quality states, not errors. A thermistor that
//! jumps or reads below the lower bound is demoted from aggregation by the
//! [`FaultDetector`](crate::fault::FaultDetector) and reported through the
//! fault latch; nothing is returned as `Err` from the sensor path.
//!
//! Transport failures are also absorbed by the control loop: the frame for
//! that segment and cycle is dropped and counted.
//!
//! ## Error Categories
//!
//! ### Startup
//! - [`ConfigError`]: configuration rejected before the loop starts
//! - [`MonitorError::DriverInit`]: a bus or filesystem collaborator failed
//!   to come up
//!
//! ### Wire
//! - [`FrameError`]: a received frame does not decode as a segment report
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use thermguard_core::{MonitorConfig, MonitorError, PackMonitor};
//!
//! fn start() -> Result<PackMonitor, MonitorError> {
//!     let config = MonitorConfig::default();
//!     // Refuse to enter the main loop in a partially configured state
//!     let monitor = PackMonitor::new(config)?;
//!     Ok(monitor)
//! }
//! # start().unwrap();
//! ```

use thiserror_no_std::Error;

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Configuration problems detected by [`MonitorConfig::validate`](crate::config::MonitorConfig::validate)
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Calibration table has no entries
    #[error("Calibration table is empty")]
    EmptyCalibration,

    /// Calibration table exceeds the fixed capacity
    #[error("Calibration table has {count} entries, at most {max} supported")]
    CalibrationTooLarge {
        /// Entries supplied
        count: usize,
        /// Capacity of the table
        max: usize,
    },

    /// Thresholds must be listed in strictly decreasing order
    #[error("Calibration threshold {threshold} at index {index} is not below its predecessor")]
    ThresholdOrder {
        /// Offending position in the table
        index: usize,
        /// Offending threshold voltage
        threshold: f32,
    },

    /// ADC scaling parameters are unusable
    #[error("Invalid ADC scaling: {reason}")]
    InvalidAdc {
        /// What is wrong with the scaling
        reason: &'static str,
    },

    /// Segment identifiers are 1-based
    #[error("Segment id 0 is reserved")]
    ZeroSegmentId,

    /// Two segments share an identifier
    #[error("Segment id {id} configured twice")]
    DuplicateSegment {
        /// Repeated identifier
        id: u8,
    },

    /// A segment has no thermistors
    #[error("Segment {id} has no thermistors")]
    EmptySegment {
        /// Segment identifier
        id: u8,
    },

    /// A segment has more thermistors than its id range holds
    #[error("Segment {id} has {count} thermistors, at most {max} supported")]
    TooManyThermistors {
        /// Segment identifier
        id: u8,
        /// Thermistors supplied
        count: usize,
        /// Thermistors per segment id range
        max: usize,
    },

    /// More segments than the monitor can hold
    #[error("{count} segments configured, at most {max} supported")]
    TooManySegments {
        /// Segments supplied
        count: usize,
        /// Segment capacity
        max: usize,
    },

    /// CAN identifier does not fit in 29 bits
    #[error("Frame id {id:#x} is not a valid 29-bit extended identifier")]
    InvalidFrameId {
        /// Raw identifier
        id: u32,
    },
}

/// Errors that abort monitor startup
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MonitorError {
    /// Configuration was rejected
    #[error("Configuration rejected: {0}")]
    Config(#[from] ConfigError),

    /// A hardware collaborator failed to initialise
    #[error("Driver initialisation failed: {stage}")]
    DriverInit {
        /// Which step failed (e.g. "bus install", "bus start", "filesystem mount")
        stage: &'static str,
    },
}

/// Frame decoding failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Identifier is not the segment report identifier
    #[error("Unexpected frame id {found:#x}, expected {expected:#x}")]
    UnexpectedId {
        /// Identifier on the wire
        found: u32,
        /// Identifier the decoder accepts
        expected: u32,
    },

    /// Payload length is not 8
    #[error("Frame carries {len} data bytes, expected 8")]
    BadLength {
        /// Data length code on the wire
        len: u8,
    },

    /// Remote-request frames carry no report
    #[error("Remote frame cannot carry a segment report")]
    RemoteFrame,

    /// Byte 7 does not match the recomputed checksum
    #[error("Checksum mismatch: frame has {found:#04x}, computed {computed:#04x}")]
    ChecksumMismatch {
        /// Checksum byte on the wire
        found: u8,
        /// Checksum recomputed from bytes 0-6
        computed: u8,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::EmptyCalibration => defmt::write!(fmt, "Empty calibration"),
            Self::CalibrationTooLarge { count, max } =>
                defmt::write!(fmt, "Calibration {} > {}", count, max),
            Self::ThresholdOrder { index, threshold } =>
                defmt::write!(fmt, "Threshold {} at {} out of order", threshold, index),
            Self::InvalidAdc { reason } => defmt::write!(fmt, "ADC: {}", reason),
            Self::ZeroSegmentId => defmt::write!(fmt, "Segment id 0"),
            Self::DuplicateSegment { id } => defmt::write!(fmt, "Duplicate segment {}", id),
            Self::EmptySegment { id } => defmt::write!(fmt, "Empty segment {}", id),
            Self::TooManyThermistors { id, count, max } =>
                defmt::write!(fmt, "Segment {}: {} > {} thermistors", id, count, max),
            Self::TooManySegments { count, max } =>
                defmt::write!(fmt, "{} > {} segments", count, max),
            Self::InvalidFrameId { id } => defmt::write!(fmt, "Frame id {:x}", id),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MonitorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Config(e) => defmt::write!(fmt, "Config: {}", e),
            Self::DriverInit { stage } => defmt::write!(fmt, "Driver init: {}", stage),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FrameError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::UnexpectedId { found, expected } =>
                defmt::write!(fmt, "Id {:x} != {:x}", found, expected),
            Self::BadLength { len } => defmt::write!(fmt, "Length {}", len),
            Self::RemoteFrame => defmt::write!(fmt, "Remote frame"),
            Self::ChecksumMismatch { found, computed } =>
                defmt::write!(fmt, "Checksum {:x} != {:x}", found, computed),
        }
    }
}
