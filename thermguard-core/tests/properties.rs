//! Property tests for conversion, aggregation, framing and the latch

mod common;

use proptest::prelude::*;
use thermguard_core::{
    fault::FaultCounters, frame::checksum, time::NoDelay, CanFrame, CanFrameEncoder, ChannelId,
    ExtendedId, FrameError, PackMonitor, Segment, SegmentId, TemperatureConverter,
};

use common::{harness::RecordingTransport, scenarios::single_sensor_pack};

fn temperatures() -> impl Strategy<Value = Vec<(i16, bool)>> {
    prop::collection::vec((-60i16..=120, any::<bool>()), 1..=40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A voltage inside a band is converted with that band's line
    #[test]
    fn converter_uses_the_governing_band(voltage in 0.0f32..3.2) {
        let converter = TemperatureConverter::default();
        let entries = converter.entries();
        let governing = entries
            .iter()
            .find(|e| voltage > e.threshold)
            .unwrap_or_else(|| entries.last().unwrap());

        prop_assert_eq!(converter.to_celsius(voltage), governing.apply(voltage));
    }

    /// Byte 7 is the wrapping sum of bytes 0-6, the offset and the DLC
    #[test]
    fn checksum_matches_modular_sum(head in any::<[u8; 7]>()) {
        let sum: u32 = head.iter().map(|&b| u32::from(b)).sum::<u32>() + 0x39 + 8;
        prop_assert_eq!(checksum(&head, 0x39, 8), (sum % 256) as u8);

        let mut data = [0u8; 8];
        data[..7].copy_from_slice(&head);
        data[7] = checksum(&head, 0x39, 8);
        let frame = CanFrame::new_data(ExtendedId::SEGMENT_REPORT, &data).unwrap();

        let decoded = CanFrameEncoder::default().decode(&frame);
        prop_assert!(decoded.is_ok());
        let decoded = decoded.unwrap();
        prop_assert_eq!(decoded.segment, head[0]);
        prop_assert_eq!(decoded.lowest_id, head[6]);
    }

    /// Any single flipped bit in bytes 0-6 is caught
    #[test]
    fn single_bit_errors_are_detected(head in any::<[u8; 7]>(), byte in 0usize..7, bit in 0u8..8) {
        let mut data = [0u8; 8];
        data[..7].copy_from_slice(&head);
        data[7] = checksum(&head, 0x39, 8);
        data[byte] ^= 1 << bit;
        let frame = CanFrame::new_data(ExtendedId::SEGMENT_REPORT, &data).unwrap();

        let is_mismatch = matches!(
            CanFrameEncoder::default().decode(&frame),
            Err(FrameError::ChecksumMismatch { .. })
        );
        prop_assert!(is_mismatch);
    }

    /// With any valid reading, min <= avg <= max over exactly the valid set
    #[test]
    fn aggregates_cover_only_valid_readings(readings in temperatures()) {
        let channels: Vec<ChannelId> = (0..readings.len() as u8).map(ChannelId).collect();
        let mut segment = Segment::new(SegmentId(1), &channels).unwrap();
        for (t, &(temp, faulted)) in segment.thermistors_mut().iter_mut().zip(&readings) {
            t.record(1.8, f32::from(temp));
            if faulted {
                t.faults = FaultCounters { delta: 0, range: 4, escalation: 1 };
            }
        }

        let summary = *segment.aggregate();
        let valid: Vec<i16> = readings.iter().filter(|r| !r.1).map(|r| r.0).collect();
        prop_assert_eq!(summary.valid, valid.len());

        if let (Some(&min), Some(&max)) = (valid.iter().min(), valid.iter().max()) {
            prop_assert_eq!(summary.min, min);
            prop_assert_eq!(summary.max, max);
            prop_assert!(min <= summary.avg && summary.avg <= max);
        } else {
            prop_assert_eq!(summary.avg, 0);
        }
    }

    /// Once tripped, the latch stays tripped whatever the sensors do
    #[test]
    fn latch_never_clears(codes in prop::collection::vec(0u16..=4095, 1..60)) {
        let mut monitor = PackMonitor::new(single_sensor_pack(6)).unwrap();
        let mut bus = RecordingTransport::new();
        let mut tripped = false;

        for code in codes {
            let mut adc = move |_: ChannelId| code;
            let report = monitor.run_cycle(&mut adc, &mut bus, &mut NoDelay);
            prop_assert!(!tripped || report.latch_tripped);
            tripped = report.latch_tripped;
        }

        let overridden = bus.frames.iter().filter(|f| f.data()[4] == 0x80).count();
        let first = bus.frames.iter().position(|f| f.data()[4] == 0x80);
        if let Some(first) = first {
            prop_assert_eq!(overridden, bus.frames.len() - first);
        }
    }
}
