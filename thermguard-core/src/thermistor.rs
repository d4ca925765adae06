//! Per-thermistor state
//!
//! A [`Thermistor`] is created once at startup for a fixed ADC channel and
//! lives for the life of the monitor. Each cycle records a new voltage and
//! temperature; the fault detector then updates its counters.
//!
//! Out-of-cycle reads (dashboard queries) go through [`Thermistor::observe`]
//! and never touch the history the detector compares against.

use crate::calibration::to_whole_degrees;
use crate::fault::FaultCounters;

/// Hardware input line of one thermistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ChannelId(pub u8);

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ch{}", self.0)
    }
}

/// One physical thermistor
#[derive(Debug, Clone, PartialEq)]
pub struct Thermistor {
    channel: ChannelId,
    /// Last sampled divider voltage (volts)
    pub voltage: f32,
    /// Current temperature (whole °C)
    pub temperature: i16,
    /// Temperature recorded the cycle before (whole °C)
    pub previous_temperature: i16,
    /// Fault detector state
    pub faults: FaultCounters,
    recorded_temperature: i16,
}

impl Thermistor {
    /// Thermistor wired to `channel`, reading 0 °C until first sampled
    pub const fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            voltage: 0.0,
            temperature: 0,
            previous_temperature: 0,
            faults: FaultCounters::new(),
            recorded_temperature: 0,
        }
    }

    /// Input line this thermistor is wired to
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Store a cycle sample, shifting the last cycle's temperature into history
    pub fn record(&mut self, voltage: f32, celsius: f32) {
        let temperature = to_whole_degrees(celsius);
        self.voltage = voltage;
        self.previous_temperature = self.recorded_temperature;
        self.temperature = temperature;
        self.recorded_temperature = temperature;
    }

    /// Update the live reading without advancing fault history
    pub fn observe(&mut self, voltage: f32, celsius: f32) {
        self.voltage = voltage;
        self.temperature = to_whole_degrees(celsius);
    }

    /// Change between the last two cycle samples (°C)
    pub fn delta(&self) -> i32 {
        self.recorded_temperature as i32 - self.previous_temperature as i32
    }

    /// Excluded from aggregation
    pub fn is_faulted(&self) -> bool {
        self.faults.is_faulted()
    }
}
