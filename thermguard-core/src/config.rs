//! Monitor configuration
//!
//! Everything the pack wiring and the BMS protocol fix at build or install
//! time: ADC scaling, the calibration table, fault thresholds, frame and
//! timing settings, and which ADC channels belong to which segment.
//!
//! With the `serde` feature the whole tree deserializes with per-section
//! defaults, so a file only needs to state what differs from
//! [`MonitorConfig::default`].
//!
//! ```rust
//! use thermguard_core::config::{MonitorConfig, SegmentConfig};
//!
//! let mut config = MonitorConfig::default();
//! config.segments.clear();
//! config.segments.push(SegmentConfig::new(1, &[4, 5, 6]).unwrap()).unwrap();
//! config.segments.push(SegmentConfig::new(2, &[7, 8, 9]).unwrap()).unwrap();
//! assert!(config.validate().is_ok());
//! ```

use fugit::MillisDurationU32;
use heapless::Vec;

use crate::calibration::TemperatureConverter;
use crate::constants::buffers::{MAX_SEGMENTS, MAX_THERMISTORS_PER_SEGMENT};
use crate::constants::can::{
    CHECKSUM_OFFSET, FAULT_OVERRIDE_COUNT, SEGMENT_REPORT_FRAME_ID,
};
use crate::constants::time::{CYCLE_BUDGET_MS, SEND_TIMEOUT_MS};
use crate::errors::ConfigError;
use crate::fault::FaultThresholds;
use crate::frame::FrameSettings;
use crate::sampler::VoltageSampler;
use crate::segment::SegmentId;
use crate::thermistor::ChannelId;

/// Channels wired to one segment
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentConfig {
    /// 1-based segment id
    pub id: u8,
    /// ADC channels in thermistor order
    pub channels: Vec<u8, MAX_THERMISTORS_PER_SEGMENT>,
}

impl SegmentConfig {
    /// Segment `id` over `channels`
    pub fn new(id: u8, channels: &[u8]) -> Result<Self, ConfigError> {
        let channels = Vec::from_slice(channels).map_err(|_| ConfigError::TooManyThermistors {
            id,
            count: channels.len(),
            max: MAX_THERMISTORS_PER_SEGMENT,
        })?;
        Ok(Self { id, channels })
    }

    /// Typed segment id
    pub fn segment_id(&self) -> SegmentId {
        SegmentId(self.id)
    }

    /// Typed channel ids
    pub fn channel_ids(&self) -> Vec<ChannelId, MAX_THERMISTORS_PER_SEGMENT> {
        self.channels.iter().map(|&c| ChannelId(c)).collect()
    }
}

/// Frame layout and loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CanSettings {
    /// Raw 29-bit report identifier
    pub frame_id: u32,
    /// Count byte sent once the fault latch trips
    pub fault_override_count: u8,
    /// Constant folded into the checksum
    pub checksum_offset: u8,
    /// Bounded wait per frame (milliseconds)
    pub send_timeout_ms: u32,
    /// Pacing budget per cycle, split across segments (milliseconds)
    pub cycle_budget_ms: u32,
}

impl Default for CanSettings {
    fn default() -> Self {
        Self {
            frame_id: SEGMENT_REPORT_FRAME_ID,
            fault_override_count: FAULT_OVERRIDE_COUNT,
            checksum_offset: CHECKSUM_OFFSET,
            send_timeout_ms: SEND_TIMEOUT_MS,
            cycle_budget_ms: CYCLE_BUDGET_MS,
        }
    }
}

impl CanSettings {
    /// Encoder view of these settings
    pub fn frame_settings(&self) -> FrameSettings {
        FrameSettings {
            frame_id: self.frame_id,
            fault_override_count: self.fault_override_count,
            checksum_offset: self.checksum_offset,
        }
    }

    /// Per-frame send timeout
    pub fn send_timeout(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.send_timeout_ms)
    }

    /// Pause after each segment: the cycle budget split evenly, or the whole
    /// budget when there are no segments
    pub fn pacing(&self, segment_count: usize) -> MillisDurationU32 {
        let share = match segment_count {
            0 => self.cycle_budget_ms,
            n => self.cycle_budget_ms / n as u32,
        };
        MillisDurationU32::from_ticks(share)
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// ADC scaling
    pub adc: VoltageSampler,
    /// Voltage to temperature table
    pub calibration: TemperatureConverter,
    /// Fault detector limits
    pub faults: FaultThresholds,
    /// Frame layout and timing
    pub can: CanSettings,
    /// Segment wiring, in reporting order
    pub segments: Vec<SegmentConfig, MAX_SEGMENTS>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        // Single segment with the one thermistor on channel 6
        let mut segments = Vec::new();
        let _ = segments.push(SegmentConfig {
            id: 1,
            channels: Vec::from_slice(&[6]).unwrap_or_default(),
        });

        Self {
            adc: VoltageSampler::default(),
            calibration: TemperatureConverter::default(),
            faults: FaultThresholds::default(),
            can: CanSettings::default(),
            segments,
        }
    }
}

impl MonitorConfig {
    /// Check the configuration before any hardware is touched
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.adc.validate()?;
        self.calibration.validate()?;
        self.can.frame_settings().validate()?;

        for (index, segment) in self.segments.iter().enumerate() {
            if segment.id == 0 {
                return Err(ConfigError::ZeroSegmentId);
            }
            if segment.channels.is_empty() {
                return Err(ConfigError::EmptySegment { id: segment.id });
            }
            if self.segments[..index].iter().any(|s| s.id == segment.id) {
                return Err(ConfigError::DuplicateSegment { id: segment.id });
            }
        }
        Ok(())
    }

    /// Total thermistors across all segments
    pub fn thermistor_count(&self) -> usize {
        self.segments.iter().map(|s| s.channels.len()).sum()
    }
}
