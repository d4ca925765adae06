//! Constants for ThermGuard Core
//!
//! Centralised values used throughout the monitor. Everything that the
//! battery-pack wiring or the BMS protocol fixes lives here, so that the
//! defaults of [`MonitorConfig`](crate::config::MonitorConfig) read as a
//! list of names rather than magic numbers.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **ADC**: analog front-end scaling
//! - **Calibration**: the factory thermistor table
//! - **CAN**: segment report frame layout and bus timing
//! - **Faults**: fault detector thresholds
//! - **Time**: send timeout and loop pacing
//! - **Buffers**: fixed capacities for no_std collections

/// Analog front-end scaling.
pub mod adc;

/// Factory calibration table for the pack thermistors.
pub mod calibration;

/// Segment report frame layout and bus timing.
pub mod can;

/// Fault detector thresholds.
pub mod faults;

/// Send timeout and cycle pacing budget.
pub mod time;

/// Fixed capacities for heapless collections.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use adc::{ADC_FULL_SCALE_CODE, ADC_REFERENCE_VOLTAGE};

pub use can::{
    SEGMENT_REPORT_FRAME_ID, SEGMENT_REPORT_DLC, CHECKSUM_OFFSET,
    FAULT_OVERRIDE_COUNT, THERMISTOR_ID_STRIDE,
};

pub use faults::{
    DELTA_FAULT_LIMIT_C, RANGE_LOWER_BOUND_C, RANGE_FAULT_COUNT_LIMIT,
    DELTA_FAULT_COUNT_LIMIT, LATCH_FAULT_COUNT_LIMIT,
};

pub use time::{SEND_TIMEOUT_MS, CYCLE_BUDGET_MS};

pub use buffers::{
    MAX_SEGMENTS, MAX_THERMISTORS_PER_SEGMENT, MAX_CALIBRATION_ENTRIES, MAX_REPORT_ENTRIES,
};
