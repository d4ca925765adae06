//! Segments and fault-aware aggregation
//!
//! A [`Segment`] is one physical battery module: a fixed, ordered set of
//! thermistors reported on the bus as a single min/max/average triple.
//!
//! ## Aggregation Rule
//!
//! Faulted thermistors are skipped. With at least one valid reading the
//! summary is recomputed from the valid set, the average using integer
//! division (truncating toward zero). With no valid reading the average
//! drops to 0 while min and max keep the values from the last cycle that
//! had data, so the bus never sees invented extremes.

use heapless::Vec;

use crate::constants::buffers::MAX_THERMISTORS_PER_SEGMENT;
use crate::constants::can::THERMISTOR_ID_STRIDE;
use crate::errors::ConfigError;
use crate::thermistor::{ChannelId, Thermistor};

/// 1-based segment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SegmentId(pub u8);

#[cfg(feature = "defmt")]
impl defmt::Format for SegmentId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "seg{}", self.0)
    }
}

/// Aggregates of one segment (whole °C)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SegmentSummary {
    /// Lowest valid temperature
    pub min: i16,
    /// Highest valid temperature
    pub max: i16,
    /// Mean of valid temperatures
    pub avg: i16,
    /// Thermistors that contributed this cycle
    pub valid: usize,
}

/// One battery module's thermistors and their aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    id: SegmentId,
    thermistors: Vec<Thermistor, MAX_THERMISTORS_PER_SEGMENT>,
    summary: SegmentSummary,
}

impl Segment {
    /// Segment `id` with one thermistor per channel, in channel order given
    pub fn new(id: SegmentId, channels: &[ChannelId]) -> Result<Self, ConfigError> {
        if id.0 == 0 {
            return Err(ConfigError::ZeroSegmentId);
        }
        if channels.is_empty() {
            return Err(ConfigError::EmptySegment { id: id.0 });
        }

        let mut thermistors = Vec::new();
        for &channel in channels {
            thermistors
                .push(Thermistor::new(channel))
                .map_err(|_| ConfigError::TooManyThermistors {
                    id: id.0,
                    count: channels.len(),
                    max: MAX_THERMISTORS_PER_SEGMENT,
                })?;
        }

        Ok(Self {
            id,
            thermistors,
            summary: SegmentSummary::default(),
        })
    }

    /// Segment identifier
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Thermistors in wiring order
    pub fn thermistors(&self) -> &[Thermistor] {
        &self.thermistors
    }

    /// Mutable access for the control loop
    pub fn thermistors_mut(&mut self) -> &mut [Thermistor] {
        &mut self.thermistors
    }

    /// Number of thermistors wired to this segment
    pub fn thermistor_count(&self) -> usize {
        self.thermistors.len()
    }

    /// Aggregates from the most recent [`aggregate`](Self::aggregate)
    pub fn summary(&self) -> &SegmentSummary {
        &self.summary
    }

    /// First id of this segment's thermistor range: `(id - 1) * 80`
    ///
    /// Wraps at 256 like the byte it is sent in.
    pub fn lowest_thermistor_id(&self) -> u8 {
        self.id.0.wrapping_sub(1).wrapping_mul(THERMISTOR_ID_STRIDE)
    }

    /// `(id - 1) * 80 + count`, wrapped to a byte
    pub fn highest_thermistor_id(&self) -> u8 {
        self.lowest_thermistor_id()
            .wrapping_add(self.thermistor_count() as u8)
    }

    /// Recompute min/max/avg over the thermistors that are not faulted
    pub fn aggregate(&mut self) -> &SegmentSummary {
        let mut valid = 0usize;
        let mut sum = 0i32;
        let mut min = i16::MAX;
        let mut max = i16::MIN;

        for thermistor in self.thermistors.iter().filter(|t| !t.is_faulted()) {
            let t = thermistor.temperature;
            valid += 1;
            sum += t as i32;
            min = min.min(t);
            max = max.max(t);
        }

        if valid > 0 {
            self.summary.min = min;
            self.summary.max = max;
            self.summary.avg = (sum / valid as i32) as i16;
        } else {
            // min and max stay at the last cycle with data
            self.summary.avg = 0;
        }
        self.summary.valid = valid;

        &self.summary
    }
}
