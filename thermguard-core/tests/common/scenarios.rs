//! Pack layouts used across integration tests

use thermguard_core::{MonitorConfig, SegmentConfig};

/// Configuration with the given `(segment id, channels)` layout and
/// defaults everywhere else
pub fn pack(layout: &[(u8, &[u8])]) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.segments.clear();
    for &(id, channels) in layout {
        let segment = SegmentConfig::new(id, channels).expect("segment fits");
        config.segments.push(segment).expect("segment count fits");
    }
    config
}

/// Two segments: channels 0-2 in segment 1, channels 3-4 in segment 2
pub fn two_segment_pack() -> MonitorConfig {
    pack(&[(1, &[0, 1, 2]), (2, &[3, 4])])
}

/// A single segment with a single thermistor on `channel`
pub fn single_sensor_pack(channel: u8) -> MonitorConfig {
    pack(&[(1, &[channel])])
}
