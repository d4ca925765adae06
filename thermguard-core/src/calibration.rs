//! Piecewise-Linear Thermistor Calibration
//!
//! ## Overview
//!
//! NTC thermistor dividers are strongly non-linear. Rather than evaluating
//! the Steinhart-Hart equation on a microcontroller, the pack uses a short
//! table of straight-line fits, each valid above a threshold voltage.
//!
//! ## Lookup Rule
//!
//! ```text
//! for entry in table (thresholds strictly decreasing):
//!     if voltage > entry.threshold:
//!         return entry.slope * voltage + entry.intercept
//! return last.slope * voltage + last.intercept
//! ```
//!
//! The fallback extrapolates the last line below the lowest threshold. It
//! does not clamp, so the converter can report temperatures outside the
//! calibrated band. Bounding readings is the job of the
//! [`FaultDetector`](crate::fault::FaultDetector).
//!
//! ## Usage Example
//!
//! ```rust
//! use thermguard_core::calibration::TemperatureConverter;
//!
//! let converter = TemperatureConverter::default();
//! let celsius = converter.to_celsius(1.5503);
//! assert!((celsius - 54.96).abs() < 0.01);
//! ```

use heapless::Vec;

use crate::constants::buffers::MAX_CALIBRATION_ENTRIES;
use crate::constants::calibration::{DEFAULT_INTERCEPTS, DEFAULT_SLOPES, DEFAULT_THRESHOLDS_V};
use crate::errors::ConfigError;

/// One line of the calibration table
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationEntry {
    /// Entry applies to voltages strictly above this (volts)
    pub threshold: f32,
    /// °C per volt
    pub slope: f32,
    /// °C at zero volts
    pub intercept: f32,
}

impl CalibrationEntry {
    /// Create a table entry
    pub const fn new(threshold: f32, slope: f32, intercept: f32) -> Self {
        Self { threshold, slope, intercept }
    }

    /// Evaluate this entry's line at `voltage`
    #[inline]
    pub fn apply(&self, voltage: f32) -> f32 {
        self.slope * voltage + self.intercept
    }
}

/// Voltage to temperature converter backed by a calibration table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TemperatureConverter {
    entries: Vec<CalibrationEntry, MAX_CALIBRATION_ENTRIES>,
}

impl Default for TemperatureConverter {
    fn default() -> Self {
        let mut entries = Vec::new();
        for i in 0..DEFAULT_THRESHOLDS_V.len() {
            // Default table is far below capacity
            let _ = entries.push(CalibrationEntry::new(
                DEFAULT_THRESHOLDS_V[i],
                DEFAULT_SLOPES[i],
                DEFAULT_INTERCEPTS[i],
            ));
        }
        Self { entries }
    }
}

impl TemperatureConverter {
    /// Build a converter from a table, validating its ordering
    pub fn new(entries: &[CalibrationEntry]) -> Result<Self, ConfigError> {
        let entries = Vec::from_slice(entries).map_err(|_| ConfigError::CalibrationTooLarge {
            count: entries.len(),
            max: MAX_CALIBRATION_ENTRIES,
        })?;
        let converter = Self { entries };
        converter.validate()?;
        Ok(converter)
    }

    /// Check the table is non-empty with strictly decreasing thresholds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::EmptyCalibration);
        }
        for (index, pair) in self.entries.windows(2).enumerate() {
            // NaN thresholds fail this comparison too
            if !(pair[1].threshold < pair[0].threshold) {
                return Err(ConfigError::ThresholdOrder {
                    index: index + 1,
                    threshold: pair[1].threshold,
                });
            }
        }
        Ok(())
    }

    /// Table entries in lookup order
    pub fn entries(&self) -> &[CalibrationEntry] {
        &self.entries
    }

    /// The entry that governs `voltage`
    ///
    /// First entry whose threshold the voltage exceeds, or the last entry
    /// when it exceeds none. `None` only for an empty table.
    pub fn entry_for(&self, voltage: f32) -> Option<&CalibrationEntry> {
        self.entries
            .iter()
            .find(|entry| voltage > entry.threshold)
            .or_else(|| self.entries.last())
    }

    /// Convert a voltage to °C
    pub fn to_celsius(&self, voltage: f32) -> f32 {
        match self.entry_for(voltage) {
            Some(entry) => entry.apply(voltage),
            // Unreachable for validated tables
            None => 0.0,
        }
    }
}

/// Narrow a temperature to whole degrees, truncating toward zero
///
/// Every place a temperature leaves floating point goes through here.
/// Out-of-range values saturate at the `i16` limits and NaN maps to 0.
#[inline]
pub fn to_whole_degrees(celsius: f32) -> i16 {
    libm::truncf(celsius) as i16
}
