//! Pack control loop
//!
//! [`PackMonitor`] owns every segment and walks them strictly in order once
//! per cycle:
//!
//! ```text
//! for each segment:
//!     sample ─► convert ─► fault-check ─► aggregate ─► encode ─► send ─► pace
//! ```
//!
//! Hardware is injected per call: an [`AnalogSource`] for readings, a
//! [`Transport`] for frames and a [`Delay`] for pacing. A failed send drops
//! that segment's frame for the cycle and nothing else; the next segment and
//! the next cycle proceed normally.
//!
//! ## Usage
//!
//! ```rust
//! use thermguard_core::{MonitorConfig, PackMonitor};
//! use thermguard_core::thermistor::ChannelId;
//! use thermguard_core::time::NoDelay;
//! # use thermguard_core::frame::CanFrame;
//! # use thermguard_core::transport::Transport;
//! # struct Sink;
//! # impl Transport for Sink {
//! #     type Error = ();
//! #     fn send(&mut self, _: &CanFrame, _: fugit::MillisDurationU32) -> Result<(), ()> { Ok(()) }
//! # }
//!
//! let mut monitor = PackMonitor::new(MonitorConfig::default()).unwrap();
//! let mut adc = |_channel: ChannelId| 2400u16;
//!
//! let report = monitor.run_cycle(&mut adc, &mut Sink, &mut NoDelay);
//! assert_eq!(report.frames_sent, 1);
//! ```

use heapless::Vec;

use crate::calibration::TemperatureConverter;
use crate::config::{CanSettings, MonitorConfig};
use crate::constants::buffers::MAX_SEGMENTS;
use crate::errors::{ConfigError, MonitorResult};
use crate::fault::{FaultDetector, FaultLatch};
use crate::frame::CanFrameEncoder;
use crate::report::ThermistorReport;
use crate::sampler::{AnalogSource, VoltageSampler};
use crate::segment::{Segment, SegmentId};
use crate::time::{Delay, TimeSource};
use crate::transport::Transport;

/// Outcome of one pass over all segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Frames accepted by the transport
    pub frames_sent: usize,
    /// Frames lost to transport failures
    pub frames_dropped: usize,
    /// Thermistors excluded from aggregation at the end of the cycle
    pub faulted_thermistors: usize,
    /// Fault latch state after the cycle
    pub latch_tripped: bool,
}

/// Running totals since start (or the last [`PackMonitor::reset_stats`])
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Completed cycles
    pub cycles: u64,
    /// Frames accepted by the transport
    pub frames_sent: u64,
    /// Frames lost to transport failures
    pub frames_dropped: u64,
    /// Query snapshots served
    pub snapshots: u64,
}

/// Control loop over a fixed set of segments
#[derive(Debug)]
pub struct PackMonitor {
    sampler: VoltageSampler,
    converter: TemperatureConverter,
    detector: FaultDetector,
    encoder: CanFrameEncoder,
    can: CanSettings,
    latch: FaultLatch,
    segments: Vec<Segment, MAX_SEGMENTS>,
    stats: MonitorStats,
}

impl PackMonitor {
    /// Validate `config` and build every segment
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        config.validate()?;

        let encoder = CanFrameEncoder::new(&config.can.frame_settings())?;

        let mut segments = Vec::new();
        for segment in &config.segments {
            let built = Segment::new(segment.segment_id(), &segment.channel_ids())?;
            segments.push(built).map_err(|_| ConfigError::TooManySegments {
                count: config.segments.len(),
                max: MAX_SEGMENTS,
            })?;
        }

        log_info!(
            "Monitor configured: {} segments, {} thermistors",
            segments.len(),
            config.thermistor_count()
        );

        Ok(Self {
            sampler: config.adc,
            converter: config.calibration,
            detector: FaultDetector::new(config.faults),
            encoder,
            can: config.can,
            latch: FaultLatch::new(),
            segments,
            stats: MonitorStats::default(),
        })
    }

    /// Run one full cycle: every segment is sampled, checked, aggregated and
    /// reported, then the loop pauses for its share of the cycle budget.
    pub fn run_cycle<S, T, D>(
        &mut self,
        source: &mut S,
        transport: &mut T,
        delay: &mut D,
    ) -> CycleReport
    where
        S: AnalogSource,
        T: Transport,
        D: Delay,
    {
        let mut report = CycleReport::default();
        let timeout = self.can.send_timeout();
        let pacing = self.can.pacing(self.segments.len());

        for segment in self.segments.iter_mut() {
            let id = segment.id();

            for (index, thermistor) in segment.thermistors_mut().iter_mut().enumerate() {
                let raw = source.read_raw(thermistor.channel());
                let voltage = self.sampler.to_voltage(raw);
                thermistor.record(voltage, self.converter.to_celsius(voltage));

                let update = self.detector.update(thermistor, &self.latch);
                if update.entered_fault() {
                    log_info!(
                        "Segment {} thermistor {} faulted at {} C",
                        id.0,
                        index + 1,
                        thermistor.temperature
                    );
                } else if update.cleared_fault() {
                    log_info!("Segment {} thermistor {} recovered", id.0, index + 1);
                }
                if update.tripped_latch {
                    log_error!(
                        "Fault latch tripped by segment {} thermistor {}; \
                         reporting fault count from now on",
                        id.0,
                        index + 1
                    );
                }
                if thermistor.is_faulted() {
                    report.faulted_thermistors += 1;
                }
            }

            let summary = *segment.aggregate();
            let frame = self.encoder.encode(segment, &self.latch);

            match transport.send(&frame, timeout) {
                Ok(()) => {
                    report.frames_sent += 1;
                    log_debug!(
                        "Segment {} sent: min {} max {} avg {} ({} valid)",
                        id.0,
                        summary.min,
                        summary.max,
                        summary.avg,
                        summary.valid
                    );
                }
                Err(error) => {
                    report.frames_dropped += 1;
                    log_warn!("Segment {} frame dropped: {:?}", id.0, error);
                }
            }

            delay.delay(pacing);
        }

        if self.segments.is_empty() {
            delay.delay(pacing);
        }

        report.latch_tripped = self.latch.is_tripped();

        self.stats.cycles += 1;
        self.stats.frames_sent += report.frames_sent as u64;
        self.stats.frames_dropped += report.frames_dropped as u64;

        report
    }

    /// Fresh reading of every thermistor for the query endpoint
    ///
    /// Samples, converts and aggregates like a cycle but leaves the fault
    /// counters and the cycle-to-cycle history alone and sends nothing.
    pub fn snapshot<S, C>(&mut self, source: &mut S, clock: &C) -> ThermistorReport
    where
        S: AnalogSource,
        C: TimeSource,
    {
        for segment in self.segments.iter_mut() {
            for thermistor in segment.thermistors_mut() {
                let voltage = self.sampler.to_voltage(source.read_raw(thermistor.channel()));
                thermistor.observe(voltage, self.converter.to_celsius(voltage));
            }
            segment.aggregate();
        }

        self.stats.snapshots += 1;
        ThermistorReport::from_segments(&self.segments, clock.now())
    }

    /// Segments in reporting order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment by id
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id() == id)
    }

    /// Pack-wide fault latch
    pub fn latch(&self) -> &FaultLatch {
        &self.latch
    }

    /// Frame encoder in use
    pub fn encoder(&self) -> &CanFrameEncoder {
        &self.encoder
    }

    /// Running totals
    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Zero the running totals. The fault latch is not affected.
    pub fn reset_stats(&mut self) {
        self.stats = MonitorStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentConfig;
    use crate::frame::CanFrame;
    use crate::thermistor::ChannelId;
    use crate::time::{MockDelay, MockTimeSource, NoDelay};
    use fugit::MillisDurationU32;

    /// Accepts everything, remembering the frames
    #[derive(Default)]
    struct Sink {
        frames: Vec<CanFrame, 32>,
        timeouts: Vec<u32, 32>,
        fail: bool,
    }

    impl Transport for Sink {
        type Error = &'static str;

        fn send(
            &mut self,
            frame: &CanFrame,
            timeout: MillisDurationU32,
        ) -> Result<(), Self::Error> {
            self.timeouts.push(timeout.ticks()).ok();
            if self.fail {
                return Err("bus off");
            }
            self.frames.push(*frame).ok();
            Ok(())
        }
    }

    fn two_segments() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.segments.clear();
        config.segments.push(SegmentConfig::new(1, &[0, 1]).unwrap()).unwrap();
        config.segments.push(SegmentConfig::new(2, &[2, 3, 4]).unwrap()).unwrap();
        config
    }

    #[test]
    fn one_frame_per_segment_in_order() {
        let mut monitor = PackMonitor::new(two_segments()).unwrap();
        let mut sink = Sink::default();
        let mut adc = |_: ChannelId| 2400u16;

        let report = monitor.run_cycle(&mut adc, &mut sink, &mut NoDelay);

        assert_eq!(report.frames_sent, 2);
        assert_eq!(report.frames_dropped, 0);
        assert!(!report.latch_tripped);
        assert_eq!(sink.frames[0].data()[0], 1);
        assert_eq!(sink.frames[1].data()[0], 2);
        assert_eq!(sink.frames[1].data()[4], 3);
        assert_eq!(sink.timeouts.as_slice(), &[1000, 1000]);
        assert_eq!(monitor.stats().cycles, 1);
    }

    #[test]
    fn pacing_splits_budget_across_segments() {
        let clock = MockTimeSource::new(0);
        let mut delay = MockDelay::new(&clock);
        let mut monitor = PackMonitor::new(two_segments()).unwrap();
        let mut adc = |_: ChannelId| 2400u16;

        monitor.run_cycle(&mut adc, &mut Sink::default(), &mut delay);
        assert_eq!(delay.total_ms(), 100);
    }

    #[test]
    fn empty_pack_waits_full_budget() {
        let mut config = MonitorConfig::default();
        config.segments.clear();
        let mut monitor = PackMonitor::new(config).unwrap();

        let clock = MockTimeSource::new(0);
        let mut delay = MockDelay::new(&clock);
        let mut sink = Sink::default();
        let mut adc = |_: ChannelId| 0u16;

        let report = monitor.run_cycle(&mut adc, &mut sink, &mut delay);
        assert_eq!(report, CycleReport::default());
        assert_eq!(delay.total_ms(), 100);
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn transport_failure_drops_frames_only() {
        let mut monitor = PackMonitor::new(two_segments()).unwrap();
        let mut sink = Sink { fail: true, ..Sink::default() };
        let mut adc = |_: ChannelId| 2400u16;

        let report = monitor.run_cycle(&mut adc, &mut sink, &mut NoDelay);
        assert_eq!(report.frames_sent, 0);
        assert_eq!(report.frames_dropped, 2);
        // Both segments were still sampled and aggregated
        assert_eq!(monitor.segments()[1].summary().valid, 3);
        assert_eq!(monitor.stats().frames_dropped, 2);

        monitor.reset_stats();
        assert_eq!(*monitor.stats(), MonitorStats::default());
    }

    #[test]
    fn snapshot_skips_fault_detection() {
        let mut monitor = PackMonitor::new(MonitorConfig::default()).unwrap();
        // Open input reads the rail: far below the range bound
        let mut adc = |_: ChannelId| 4095u16;
        let clock = MockTimeSource::new(1234);

        for _ in 0..10 {
            monitor.snapshot(&mut adc, &clock);
        }
        let report = monitor.snapshot(&mut adc, &clock);

        assert!(!monitor.latch().is_tripped());
        assert!(!monitor.segments()[0].thermistors()[0].is_faulted());
        assert_eq!(report.count, 1);
        assert_eq!(report.timestamp, 1234);
        assert!(report.thermistors[0].temperature < -20);
        assert_eq!(monitor.stats().snapshots, 11);
        assert_eq!(monitor.stats().cycles, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = two_segments();
        config.segments[1].id = 1;
        assert!(PackMonitor::new(config).is_err());
    }

    #[test]
    fn segment_lookup() {
        let monitor = PackMonitor::new(two_segments()).unwrap();
        assert_eq!(monitor.segment(SegmentId(2)).map(|s| s.thermistor_count()), Some(3));
        assert!(monitor.segment(SegmentId(9)).is_none());
    }
}
