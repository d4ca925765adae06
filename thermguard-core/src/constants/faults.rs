//! Fault Detector Thresholds
//!
//! Each sensor keeps three counters. A counter over its limit escalates the
//! sensor; an escalated sensor that stays escalated trips the pack-wide
//! fault latch.

/// Cycle-to-cycle temperature jump that counts as a delta fault (°C).
///
/// A change of exactly this size already counts.
pub const DELTA_FAULT_LIMIT_C: i16 = 10;

/// Temperatures strictly below this count as range faults (°C).
///
/// An open thermistor pulls the divider to the ADC rail, which the
/// calibration extrapolates to well below -100 °C.
pub const RANGE_LOWER_BOUND_C: i16 = -20;

/// Range faults tolerated before the sensor escalates.
pub const RANGE_FAULT_COUNT_LIMIT: u16 = 3;

/// Delta faults tolerated before the sensor escalates.
pub const DELTA_FAULT_COUNT_LIMIT: u16 = 5;

/// Escalated cycles tolerated before the fault latch trips.
pub const LATCH_FAULT_COUNT_LIMIT: u16 = 3;
