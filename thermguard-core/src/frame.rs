//! Segment report CAN frames
//!
//! ## Layout
//!
//! ```text
//! id   = 0x1839F380 (29-bit extended), data frame, DLC 8
//!
//! byte:   0      1     2     3     4        5         6         7
//!       ┌─────┬─────┬─────┬─────┬───────┬─────────┬─────────┬──────┐
//!       │ seg │ min │ max │ avg │ count │ hi id   │ lo id   │ csum │
//!       └─────┴─────┴─────┴─────┴───────┴─────────┴─────────┴──────┘
//! ```
//!
//! Temperatures are whole degrees sent as their low byte, so a negative
//! reading appears in two's complement. `count` is replaced by the fault
//! override value for every segment once the [`FaultLatch`] has tripped.
//!
//! ## Checksum
//!
//! `csum = (b0 + b1 + ... + b6 + offset + dlc) mod 256`, with the offset
//! fixed at 0x39 by the BMS master.

use crate::constants::can::{
    CHECKSUM_OFFSET, EXTENDED_ID_MAX, FAULT_OVERRIDE_COUNT, SEGMENT_REPORT_DLC,
    SEGMENT_REPORT_FRAME_ID,
};
use crate::errors::{ConfigError, FrameError};
use crate::fault::FaultLatch;
use crate::segment::Segment;

/// 29-bit extended CAN identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtendedId(u32);

impl ExtendedId {
    /// Segment report identifier
    pub const SEGMENT_REPORT: Self = Self(SEGMENT_REPORT_FRAME_ID);

    /// Wrap a raw identifier, rejecting values wider than 29 bits
    pub const fn new(raw: u32) -> Option<Self> {
        if raw > EXTENDED_ID_MAX {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Raw identifier value
    pub const fn as_raw(&self) -> u32 {
        self.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ExtendedId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{:x}", self.0)
    }
}

/// Classic CAN frame with an extended identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    id: ExtendedId,
    remote: bool,
    dlc: u8,
    data: [u8; 8],
}

impl CanFrame {
    /// Data frame carrying `data`. Returns `None` for more than 8 bytes.
    pub fn new_data(id: ExtendedId, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[..data.len()].copy_from_slice(data);
        Some(Self {
            id,
            remote: false,
            dlc: data.len() as u8,
            data: buf,
        })
    }

    /// Remote-request frame asking for `dlc` bytes
    pub fn new_remote(id: ExtendedId, dlc: u8) -> Option<Self> {
        if dlc > 8 {
            return None;
        }
        Some(Self { id, remote: true, dlc, data: [0; 8] })
    }

    /// Frame identifier
    pub fn id(&self) -> ExtendedId {
        self.id
    }

    /// Always true; the encoder only builds extended frames
    pub fn is_extended(&self) -> bool {
        true
    }

    /// Remote-request frame
    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Data length code
    pub fn dlc(&self) -> u8 {
        self.dlc
    }

    /// Payload bytes (empty for remote frames)
    pub fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.dlc as usize]
        }
    }
}

/// Checksum over bytes 0-6 of a segment report
pub fn checksum(bytes: &[u8; 7], offset: u8, dlc: u8) -> u8 {
    bytes
        .iter()
        .fold(offset.wrapping_add(dlc), |acc, &b| acc.wrapping_add(b))
}

/// Low byte of a whole-degree temperature, as sent on the bus
#[inline]
pub fn temperature_byte(celsius: i16) -> u8 {
    celsius as u8
}

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSettings {
    /// Raw 29-bit identifier of the report
    pub frame_id: u32,
    /// Count byte sent while the fault latch is set
    pub fault_override_count: u8,
    /// Constant folded into the checksum
    pub checksum_offset: u8,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            frame_id: SEGMENT_REPORT_FRAME_ID,
            fault_override_count: FAULT_OVERRIDE_COUNT,
            checksum_offset: CHECKSUM_OFFSET,
        }
    }
}

impl FrameSettings {
    /// Check the identifier fits in 29 bits
    pub fn validate(&self) -> Result<(), ConfigError> {
        ExtendedId::new(self.frame_id)
            .map(|_| ())
            .ok_or(ConfigError::InvalidFrameId { id: self.frame_id })
    }
}

/// Builds one report frame per segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrameEncoder {
    id: ExtendedId,
    fault_override_count: u8,
    checksum_offset: u8,
}

impl Default for CanFrameEncoder {
    fn default() -> Self {
        Self {
            id: ExtendedId::SEGMENT_REPORT,
            fault_override_count: FAULT_OVERRIDE_COUNT,
            checksum_offset: CHECKSUM_OFFSET,
        }
    }
}

impl CanFrameEncoder {
    /// Encoder for validated settings
    pub fn new(settings: &FrameSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            id: ExtendedId(settings.frame_id),
            fault_override_count: settings.fault_override_count,
            checksum_offset: settings.checksum_offset,
        })
    }

    /// Identifier stamped on every report
    pub fn frame_id(&self) -> ExtendedId {
        self.id
    }

    /// Payload for `segment` given the latch state
    pub fn payload(&self, segment: &Segment, latch: &FaultLatch) -> [u8; 8] {
        let summary = segment.summary();
        let count = if latch.is_tripped() {
            self.fault_override_count
        } else {
            segment.thermistor_count() as u8
        };

        let head = [
            segment.id().0,
            temperature_byte(summary.min),
            temperature_byte(summary.max),
            temperature_byte(summary.avg),
            count,
            segment.highest_thermistor_id(),
            segment.lowest_thermistor_id(),
        ];

        let mut payload = [0u8; 8];
        payload[..7].copy_from_slice(&head);
        payload[7] = checksum(&head, self.checksum_offset, SEGMENT_REPORT_DLC);
        payload
    }

    /// Report frame for `segment`
    pub fn encode(&self, segment: &Segment, latch: &FaultLatch) -> CanFrame {
        CanFrame {
            id: self.id,
            remote: false,
            dlc: SEGMENT_REPORT_DLC,
            data: self.payload(segment, latch),
        }
    }

    /// Parse a report back into its fields, verifying the checksum
    pub fn decode(&self, frame: &CanFrame) -> Result<SegmentFrame, FrameError> {
        if frame.id != self.id {
            return Err(FrameError::UnexpectedId {
                found: frame.id.as_raw(),
                expected: self.id.as_raw(),
            });
        }
        if frame.remote {
            return Err(FrameError::RemoteFrame);
        }
        if frame.dlc != SEGMENT_REPORT_DLC {
            return Err(FrameError::BadLength { len: frame.dlc });
        }

        let d = &frame.data;
        let head = [d[0], d[1], d[2], d[3], d[4], d[5], d[6]];
        let computed = checksum(&head, self.checksum_offset, frame.dlc);
        if computed != d[7] {
            return Err(FrameError::ChecksumMismatch { found: d[7], computed });
        }

        Ok(SegmentFrame {
            segment: d[0],
            min: d[1] as i8,
            max: d[2] as i8,
            avg: d[3] as i8,
            count: d[4],
            highest_id: d[5],
            lowest_id: d[6],
            fault_override: d[4] == self.fault_override_count,
        })
    }
}

/// Decoded segment report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SegmentFrame {
    /// Segment id
    pub segment: u8,
    /// Lowest temperature, reinterpreted as signed
    pub min: i8,
    /// Highest temperature, reinterpreted as signed
    pub max: i8,
    /// Average temperature, reinterpreted as signed
    pub avg: i8,
    /// Thermistor count byte
    pub count: u8,
    /// Highest thermistor id
    pub highest_id: u8,
    /// Lowest thermistor id
    pub lowest_id: u8,
    /// Count byte equals the fault override value
    pub fault_override: bool,
}
