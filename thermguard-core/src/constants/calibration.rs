//! Factory Thermistor Calibration
//!
//! Piecewise-linear fit of the pack thermistor divider, voltage in volts to
//! temperature in °C. Entries are ordered by strictly decreasing threshold;
//! an entry applies to voltages above its threshold and at or below the
//! previous one.
//!
//! ```text
//! threshold | slope   | intercept | applies to       | covers
//! ----------|---------|-----------|------------------|-----------
//!   2.17 V  | -148.15 |  321.48   | v > 2.17         | below 0 °C
//!   1.92 V  |  -80.00 |  173.60   | 1.92 < v <= 2.17 |  0 .. 20 °C
//!   1.68 V  |  -83.33 |  180.00   | 1.68 < v <= 1.92 | 20 .. 40 °C
//!   1.59 V  | -111.11 |  226.67   | 1.59 < v <= 1.68 | 40 .. 50 °C
//!   1.51 V  | -125.00 |  248.75   | 1.51 < v <= 1.59 | 50 .. 60 °C
//!   1.48 V  | -166.67 |  311.67   | 1.48 < v <= 1.51 | 60 .. 65 °C
//! ```
//!
//! Voltages at or below 1.48 V keep using the last line (extrapolated, not clamped).

/// Threshold voltages, strictly decreasing (volts).
pub const DEFAULT_THRESHOLDS_V: [f32; 6] = [2.17, 1.92, 1.68, 1.59, 1.51, 1.48];

/// Slope of each segment (°C per volt).
pub const DEFAULT_SLOPES: [f32; 6] = [-148.15, -80.0, -83.33, -111.11, -125.0, -166.67];

/// Intercept of each segment (°C).
pub const DEFAULT_INTERCEPTS: [f32; 6] = [321.48, 173.6, 180.0, 226.67, 248.75, 311.67];
