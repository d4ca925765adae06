//! Analog Front-End Scaling
//!
//! The pack controller samples each thermistor divider with a 12-bit SAR
//! ADC. The attenuated input range tops out a little below the 3.3 V rail.

/// Highest code the ADC returns (12-bit converter).
pub const ADC_FULL_SCALE_CODE: u16 = 4095;

/// Input voltage corresponding to [`ADC_FULL_SCALE_CODE`] (volts).
///
/// Measured full-scale of the ESP32 ADC at 11 dB attenuation on the
/// controller board.
pub const ADC_REFERENCE_VOLTAGE: f32 = 3.1;
