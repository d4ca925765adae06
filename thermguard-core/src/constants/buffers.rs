//! Fixed Capacities
//!
//! All collections in the core are `heapless`, so their capacities are
//! part of the type. These values cover a full pack with headroom.

/// Segments one monitor can drive.
pub const MAX_SEGMENTS: usize = 16;

/// Thermistors per segment; one segment's id range is 80 wide.
pub const MAX_THERMISTORS_PER_SEGMENT: usize = 80;

/// Entries in a calibration table.
pub const MAX_CALIBRATION_ENTRIES: usize = 16;

/// Entries in one query report: every thermistor of a full pack.
pub const MAX_REPORT_ENTRIES: usize = MAX_SEGMENTS * MAX_THERMISTORS_PER_SEGMENT;
