//! Time management for the control loop
//!
//! Two concerns, both injected so the loop can run against a mock clock:
//! - [`TimeSource`]: reading the current time (send deadlines, report stamps)
//! - [`Delay`]: suspending the loop (inter-segment pacing)

use core::cell::Cell;

use fugit::MillisDurationU32;

/// Timestamp in milliseconds since epoch (or device boot for monotonic)
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool {
        false
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }
}

/// Blocking wait used for pacing between segments
pub trait Delay {
    /// Suspend the loop for `duration`
    fn delay(&mut self, duration: MillisDurationU32);
}

/// Delay that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&mut self, _duration: MillisDurationU32) {}
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Thread-sleeping delay (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay(&mut self, duration: MillisDurationU32) {
        std::thread::sleep(std::time::Duration::from_millis(duration.ticks() as u64));
    }
}

/// Controllable time source for testing
///
/// Every call to [`now`](TimeSource::now) returns the current value and then
/// moves the clock forward by `step` milliseconds, so polling loops make
/// progress without a real timer. A step of 0 gives a frozen clock.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    current: Cell<Timestamp>,
    step: Cell<u64>,
}

impl MockTimeSource {
    /// Frozen clock at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Cell::new(start),
            step: Cell::new(0),
        }
    }

    /// Clock that advances `step` ms on every read
    pub fn stepping(start: Timestamp, step: u64) -> Self {
        Self {
            current: Cell::new(start),
            step: Cell::new(step),
        }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.current.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.current.set(self.current.get().saturating_add(ms));
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        let now = self.current.get();
        self.current.set(now.saturating_add(self.step.get()));
        now
    }
}

/// Delay that advances a [`MockTimeSource`] instead of sleeping
#[derive(Debug)]
pub struct MockDelay<'a> {
    clock: &'a MockTimeSource,
    total_ms: u64,
}

impl<'a> MockDelay<'a> {
    /// Delay driving `clock`
    pub fn new(clock: &'a MockTimeSource) -> Self {
        Self { clock, total_ms: 0 }
    }

    /// Sum of all requested delays
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }
}

impl Delay for MockDelay<'_> {
    fn delay(&mut self, duration: MillisDurationU32) {
        let ms = duration.ticks() as u64;
        self.total_ms += ms;
        self.clock.advance(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::ExtU32;

    #[test]
    fn mock_time_advances() {
        let time = MockTimeSource::new(1000);
        assert_eq!(time.now(), 1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);
    }

    #[test]
    fn stepping_clock_moves_on_read() {
        let time = MockTimeSource::stepping(0, 10);
        assert_eq!(time.now(), 0);
        assert_eq!(time.now(), 10);
        assert_eq!((&time).now(), 20);
    }

    #[test]
    fn mock_delay_drives_clock() {
        let time = MockTimeSource::new(0);
        let mut delay = MockDelay::new(&time);
        delay.delay(25.millis());
        delay.delay(25.millis());
        assert_eq!(delay.total_ms(), 50);
        assert_eq!(time.now(), 50);
    }
}
