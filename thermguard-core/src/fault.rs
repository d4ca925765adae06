//! Sensor Fault Detection and the Pack Fault Latch
//!
//! ## Overview
//!
//! Every cycle, after a thermistor records its new temperature, the
//! [`FaultDetector`] runs a small state machine over three counters:
//!
//! ```text
//! 1. delta:      |T - T_prev| >= delta_limit      ? delta += 1      : delta = 0
//! 2. range:      T < range_lower_bound            ? range += 1      : range = 0
//! 3. escalation: range > range_count_limit
//!                || delta > delta_count_limit     ? escalation += 1 : escalation = 0
//! 4. latch:      escalation > latch_count_limit   => FaultLatch::trip()
//! ```
//!
//! A thermistor is *faulted* (dropped from its segment's aggregates) as soon
//! as `escalation > 0`. That is a much lower bar than the latch: a sensor is
//! excluded for several cycles before it can trip the pack-wide latch, and
//! it rejoins automatically once its readings settle and the counters reset.
//!
//! ## The Latch
//!
//! [`FaultLatch`] is sticky. Nothing on the control path can clear it; the
//! BMS needs a controller reset to recover. Once tripped, every segment
//! report carries the override thermistor count, including segments whose
//! own sensors are healthy.
//!
//! ## Range Check
//!
//! Only a lower bound is enforced. The firmware this replaces tested the
//! bound through a pair of comparisons that reduce to the same inequality;
//! a separate upper bound was never in effect and is not added here.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::constants::faults::{
    DELTA_FAULT_COUNT_LIMIT, DELTA_FAULT_LIMIT_C, LATCH_FAULT_COUNT_LIMIT,
    RANGE_FAULT_COUNT_LIMIT, RANGE_LOWER_BOUND_C,
};
use crate::thermistor::Thermistor;

/// Pack-wide sticky fault flag
///
/// Shared by reference between the detector (writer) and the frame encoder
/// (reader). Tripping is a single atomic swap.
#[derive(Debug, Default)]
pub struct FaultLatch {
    tripped: AtomicBool,
}

impl FaultLatch {
    /// Untripped latch
    pub const fn new() -> Self {
        Self { tripped: AtomicBool::new(false) }
    }

    /// Set the latch. Returns `true` only for the call that tripped it.
    pub fn trip(&self) -> bool {
        !self.tripped.swap(true, Ordering::AcqRel)
    }

    /// Whether any sensor has tripped the latch
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// Clear the latch. Test builds only.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn reset(&self) {
        self.tripped.store(false, Ordering::Release);
    }
}

/// Fault detector limits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FaultThresholds {
    /// Jump that counts as a delta fault (°C, inclusive)
    pub delta_limit: i16,
    /// Temperatures below this count as range faults (°C)
    pub range_lower_bound: i16,
    /// Range faults tolerated before escalation
    pub range_count_limit: u16,
    /// Delta faults tolerated before escalation
    pub delta_count_limit: u16,
    /// Escalated cycles tolerated before the latch trips
    pub latch_count_limit: u16,
}

impl Default for FaultThresholds {
    fn default() -> Self {
        Self {
            delta_limit: DELTA_FAULT_LIMIT_C,
            range_lower_bound: RANGE_LOWER_BOUND_C,
            range_count_limit: RANGE_FAULT_COUNT_LIMIT,
            delta_count_limit: DELTA_FAULT_COUNT_LIMIT,
            latch_count_limit: LATCH_FAULT_COUNT_LIMIT,
        }
    }
}

/// Rolling fault counters for one thermistor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultCounters {
    /// Consecutive cycles with a large jump
    pub delta: u16,
    /// Consecutive cycles below the lower bound
    pub range: u16,
    /// Consecutive cycles with either counter over its limit
    pub escalation: u16,
}

impl FaultCounters {
    /// All counters at zero
    pub const fn new() -> Self {
        Self { delta: 0, range: 0, escalation: 0 }
    }

    /// Thermistor is excluded from aggregation
    pub fn is_faulted(&self) -> bool {
        self.escalation > 0
    }
}

/// Outcome of one detector pass over a thermistor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultUpdate {
    /// Faulted before this pass
    pub was_faulted: bool,
    /// Faulted after this pass
    pub is_faulted: bool,
    /// This pass tripped the latch
    pub tripped_latch: bool,
}

impl FaultUpdate {
    /// Thermistor just dropped out of aggregation
    pub fn entered_fault(&self) -> bool {
        !self.was_faulted && self.is_faulted
    }

    /// Thermistor just rejoined aggregation
    pub fn cleared_fault(&self) -> bool {
        self.was_faulted && !self.is_faulted
    }
}

/// Stateless rule set applied to each thermistor's counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaultDetector {
    thresholds: FaultThresholds,
}

impl FaultDetector {
    /// Detector with custom limits
    pub const fn new(thresholds: FaultThresholds) -> Self {
        Self { thresholds }
    }

    /// Limits in use
    pub fn thresholds(&self) -> &FaultThresholds {
        &self.thresholds
    }

    /// Run one cycle of the state machine on a freshly recorded thermistor
    pub fn update(&self, thermistor: &mut Thermistor, latch: &FaultLatch) -> FaultUpdate {
        let limits = &self.thresholds;
        let was_faulted = thermistor.is_faulted();
        let delta = thermistor.delta();
        let temperature = thermistor.temperature;
        let counters = &mut thermistor.faults;

        if delta.abs() >= limits.delta_limit as i32 {
            counters.delta = counters.delta.saturating_add(1);
        } else {
            counters.delta = 0;
        }

        if temperature < limits.range_lower_bound {
            counters.range = counters.range.saturating_add(1);
        } else {
            counters.range = 0;
        }

        if counters.range > limits.range_count_limit || counters.delta > limits.delta_count_limit {
            counters.escalation = counters.escalation.saturating_add(1);
        } else {
            counters.escalation = 0;
        }

        let tripped_latch = counters.escalation > limits.latch_count_limit && latch.trip();

        FaultUpdate {
            was_faulted,
            is_faulted: counters.is_faulted(),
            tripped_latch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermistor::ChannelId;

    fn settled(temp: f32) -> Thermistor {
        let mut t = Thermistor::new(ChannelId(1));
        t.record(1.8, temp);
        t.record(1.8, temp);
        t
    }

    #[test]
    fn latch_is_sticky() {
        let latch = FaultLatch::new();
        assert!(!latch.is_tripped());
        assert!(latch.trip());
        assert!(!latch.trip());
        assert!(latch.is_tripped());
        latch.reset();
        assert!(!latch.is_tripped());
    }

    #[cfg(feature = "std")]
    #[test]
    fn concurrent_trips_report_once() {
        let latch = FaultLatch::new();
        let first_trips: usize = std::thread::scope(|scope| {
            let handles: std::vec::Vec<_> =
                (0..8).map(|_| scope.spawn(|| latch.trip() as usize)).collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(first_trips, 1);
        assert!(latch.is_tripped());
    }

    #[test]
    fn six_large_jumps_fault_the_sensor() {
        let detector = FaultDetector::default();
        let latch = FaultLatch::new();
        let mut t = settled(20.0);
        detector.update(&mut t, &latch);

        for cycle in 1..=6 {
            let temp = if cycle % 2 == 0 { 20.0 } else { 30.0 };
            t.record(1.8, temp);
            let update = detector.update(&mut t, &latch);
            assert_eq!(t.faults.delta, cycle);
            assert_eq!(update.is_faulted, cycle == 6, "cycle {}", cycle);
        }
        assert!(t.faults.delta > DELTA_FAULT_COUNT_LIMIT);
        assert!(t.is_faulted());

        // One calm cycle resets everything
        t.record(1.8, 21.0);
        let update = detector.update(&mut t, &latch);
        assert_eq!(t.faults.delta, 0);
        assert_eq!(t.faults.escalation, 0);
        assert!(update.cleared_fault());
        assert!(!latch.is_tripped());
    }

    #[test]
    fn jump_of_exactly_limit_counts() {
        let detector = FaultDetector::default();
        let latch = FaultLatch::new();
        let mut t = settled(20.0);
        t.record(1.8, 30.0);
        detector.update(&mut t, &latch);
        assert_eq!(t.faults.delta, 1);

        t.record(1.8, 21.0);
        detector.update(&mut t, &latch);
        assert_eq!(t.faults.delta, 0);
    }

    #[test]
    fn cold_reading_escalates_after_four_cycles() {
        let detector = FaultDetector::default();
        let latch = FaultLatch::new();
        let mut t = settled(-137.0);

        let mut updates = [false; 8];
        for slot in updates.iter_mut() {
            t.record(3.1, -137.0);
            *slot = detector.update(&mut t, &latch).is_faulted;
        }
        // range: 1,2,3 not faulted; 4 faulted
        assert_eq!(&updates[..4], &[false, false, false, true]);
        // escalation 1..=5: latch trips once it exceeds 3
        assert!(latch.is_tripped());
    }

    #[test]
    fn latch_trips_on_fourth_escalated_cycle() {
        let detector = FaultDetector::default();
        let latch = FaultLatch::new();
        let mut t = settled(-50.0);
        let mut tripped_at = None;
        for cycle in 1..=10u16 {
            t.record(3.0, -50.0);
            if detector.update(&mut t, &latch).tripped_latch {
                tripped_at = Some(cycle);
            }
        }
        // range > 3 from cycle 4, escalation > 3 from cycle 7
        assert_eq!(tripped_at, Some(7));
    }

    #[test]
    fn lower_bound_is_exclusive() {
        let detector = FaultDetector::default();
        let latch = FaultLatch::new();
        let mut t = settled(RANGE_LOWER_BOUND_C as f32);
        detector.update(&mut t, &latch);
        assert_eq!(t.faults.range, 0);
    }

    #[test]
    fn hot_readings_are_not_range_faults() {
        let detector = FaultDetector::default();
        let latch = FaultLatch::new();
        let mut t = settled(400.0);
        for _ in 0..10 {
            t.record(0.0, 400.0);
            detector.update(&mut t, &latch);
        }
        assert_eq!(t.faults.range, 0);
        assert!(!t.is_faulted());
    }
}
