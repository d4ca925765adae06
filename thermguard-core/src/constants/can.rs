//! Segment Report Frame Layout
//!
//! One frame per segment per cycle, in the thermistor expansion module
//! broadcast format the BMS master listens for.
//!
//! ```text
//! byte | content
//! -----|--------------------------------------------------
//!   0  | segment id
//!   1  | lowest temperature (°C, low byte)
//!   2  | highest temperature
//!   3  | average temperature
//!   4  | thermistor count, or FAULT_OVERRIDE_COUNT when latched
//!   5  | highest thermistor id = (id - 1) * 80 + count
//!   6  | lowest thermistor id  = (id - 1) * 80
//!   7  | checksum = sum(bytes 0..=6) + CHECKSUM_OFFSET + DLC (mod 256)
//! ```

/// 29-bit extended identifier of the segment report broadcast.
pub const SEGMENT_REPORT_FRAME_ID: u32 = 0x1839_F380;

/// Largest value an extended identifier can take.
pub const EXTENDED_ID_MAX: u32 = 0x1FFF_FFFF;

/// Payload length of every segment report.
pub const SEGMENT_REPORT_DLC: u8 = 8;

/// Constant folded into the checksum byte.
pub const CHECKSUM_OFFSET: u8 = 0x39;

/// Thermistor-count byte sent by every segment once the fault latch trips.
///
/// Bit 7 set marks the count as invalid for the BMS master.
pub const FAULT_OVERRIDE_COUNT: u8 = 0x80;

/// Width of each segment's thermistor id range.
pub const THERMISTOR_ID_STRIDE: u8 = 80;

/// Bus bitrate used at bring-up (bits per second).
pub const BUS_BITRATE: u32 = 500_000;
