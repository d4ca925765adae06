//! Common test utilities for integration tests
//!
//! This module provides:
//! - Scripted hardware doubles (ADC, bus) in [`harness`]
//! - Pack layouts and reading scripts in [`scenarios`]
//! - Helpers for predicting what the monitor will compute

#![allow(dead_code)]

use thermguard_core::{
    calibration::to_whole_degrees, CanFrame, CanFrameEncoder, SegmentFrame, TemperatureConverter,
    VoltageSampler,
};

// Re-export submodules
pub mod harness;
pub mod scenarios;

/// Raw code of a healthy room-temperature reading (about 28 °C)
pub const HEALTHY_CODE: u16 = 2400;

/// Raw code of a warmer healthy reading (about 54 °C)
pub const WARM_CODE: u16 = 2048;

/// Raw code of a cool reading (about 20 °C)
pub const COOL_CODE: u16 = 2530;

/// Raw code of a hot reading (about 36 °C)
pub const HOT_CODE: u16 = 2280;

/// Raw code of an open thermistor: the input floats to the reference rail
pub const OPEN_CODE: u16 = 4095;

/// Temperature the default configuration derives from `code`
pub fn expected_celsius(code: u16) -> i16 {
    let voltage = VoltageSampler::default().to_voltage(code);
    to_whole_degrees(TemperatureConverter::default().to_celsius(voltage))
}

/// Decode a frame with the default encoder, panicking on corruption
pub fn decode(frame: &CanFrame) -> SegmentFrame {
    CanFrameEncoder::default()
        .decode(frame)
        .unwrap_or_else(|e| panic!("frame {:?} failed to decode: {}", frame, e))
}
