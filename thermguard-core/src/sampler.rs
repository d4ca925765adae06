//! ADC code to voltage conversion
//!
//! Acquisition is kept outside the conversion: the control loop asks an
//! [`AnalogSource`] for a raw code and hands it to [`VoltageSampler::to_voltage`].

use crate::constants::adc::{ADC_FULL_SCALE_CODE, ADC_REFERENCE_VOLTAGE};
use crate::errors::ConfigError;
use crate::thermistor::ChannelId;

/// Hardware that produces one raw ADC code per channel.
///
/// Reading a channel triggers a conversion on the device. Implementations
/// are expected to always return a code; a disconnected input shows up as
/// a rail reading and is caught by the fault detector.
pub trait AnalogSource {
    /// Sample `channel` and return the raw code.
    fn read_raw(&mut self, channel: ChannelId) -> u16;
}

impl<F> AnalogSource for F
where
    F: FnMut(ChannelId) -> u16,
{
    fn read_raw(&mut self, channel: ChannelId) -> u16 {
        self(channel)
    }
}

/// Linear ADC scaling
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VoltageSampler {
    /// Voltage at the top of the ADC range
    pub reference_voltage: f32,
    /// Code returned at `reference_voltage`
    pub full_scale_code: u16,
}

impl Default for VoltageSampler {
    fn default() -> Self {
        Self {
            reference_voltage: ADC_REFERENCE_VOLTAGE,
            full_scale_code: ADC_FULL_SCALE_CODE,
        }
    }
}

impl VoltageSampler {
    /// Create a sampler for a converter with the given full scale
    pub const fn new(reference_voltage: f32, full_scale_code: u16) -> Self {
        Self { reference_voltage, full_scale_code }
    }

    /// Convert a raw code to volts
    #[inline]
    pub fn to_voltage(&self, raw: u16) -> f32 {
        raw as f32 * (self.reference_voltage / self.full_scale_code as f32)
    }

    /// Check the scaling is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.full_scale_code == 0 {
            return Err(ConfigError::InvalidAdc { reason: "full-scale code is zero" });
        }
        if !(self.reference_voltage.is_finite() && self.reference_voltage > 0.0) {
            return Err(ConfigError::InvalidAdc { reason: "reference voltage must be positive" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_scale_code() {
        let sampler = VoltageSampler::default();
        let v = sampler.to_voltage(2048);
        assert!((v - 1.5503).abs() < 1e-4, "got {}", v);
    }

    #[test]
    fn rails() {
        let sampler = VoltageSampler::default();
        assert_eq!(sampler.to_voltage(0), 0.0);
        assert!((sampler.to_voltage(4095) - 3.1).abs() < 1e-5);
    }

    #[test]
    fn closures_are_sources() {
        let mut source = |channel: ChannelId| channel.0 as u16 * 100;
        assert_eq!(source.read_raw(ChannelId(6)), 600);
    }

    #[test]
    fn rejects_degenerate_scaling() {
        assert!(VoltageSampler::new(3.1, 0).validate().is_err());
        assert!(VoltageSampler::new(0.0, 4095).validate().is_err());
        assert!(VoltageSampler::new(f32::NAN, 4095).validate().is_err());
        assert!(VoltageSampler::default().validate().is_ok());
    }
}
