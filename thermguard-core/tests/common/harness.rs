//! Hardware doubles for driving the monitor in tests
//!
//! Provides:
//! - [`ScriptedAdc`]: per-channel raw codes that tests change between cycles
//! - [`RecordingTransport`]: keeps every frame, fails on chosen sends
//! - [`BusyMailbox`]: `nb` transmitter that never frees a mailbox

use std::collections::{HashMap, HashSet};

use fugit::MillisDurationU32;
use thermguard_core::{transport::Transmit, CanFrame, ChannelId, Transport};

/// ADC returning a fixed code per channel
#[derive(Debug, Clone)]
pub struct ScriptedAdc {
    codes: HashMap<u8, u16>,
    default_code: u16,
    reads: usize,
}

impl ScriptedAdc {
    /// Every channel reads `default_code` until told otherwise
    pub fn new(default_code: u16) -> Self {
        Self {
            codes: HashMap::new(),
            default_code,
            reads: 0,
        }
    }

    /// Pin `channel` to `code`
    pub fn set(&mut self, channel: u8, code: u16) {
        self.codes.insert(channel, code);
    }

    /// Return `channel` to the default code
    pub fn clear(&mut self, channel: u8) {
        self.codes.remove(&channel);
    }

    /// Conversions performed so far
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl thermguard_core::AnalogSource for ScriptedAdc {
    fn read_raw(&mut self, channel: ChannelId) -> u16 {
        self.reads += 1;
        *self.codes.get(&channel.0).unwrap_or(&self.default_code)
    }
}

/// Error returned by [`RecordingTransport`] on a scheduled failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFailure {
    /// 0-based index of the failed send
    pub attempt: usize,
}

/// Transport that records frames and fails on scheduled attempts
#[derive(Debug, Default)]
pub struct RecordingTransport {
    /// Frames accepted, in send order
    pub frames: Vec<CanFrame>,
    /// Timeout passed with every attempt
    pub timeouts: Vec<u32>,
    fail_on: HashSet<usize>,
    fail_all: bool,
}

impl RecordingTransport {
    /// Transport accepting every frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `attempt`-th send (0-based, counted across cycles)
    pub fn fail_on(mut self, attempt: usize) -> Self {
        self.fail_on.insert(attempt);
        self
    }

    /// Reject every send
    pub fn failing() -> Self {
        Self { fail_all: true, ..Self::default() }
    }

    /// Send attempts so far
    pub fn attempts(&self) -> usize {
        self.timeouts.len()
    }

    /// Accepted frames whose first byte is `segment`
    pub fn frames_for(&self, segment: u8) -> Vec<&CanFrame> {
        self.frames.iter().filter(|f| f.data()[0] == segment).collect()
    }
}

impl Transport for RecordingTransport {
    type Error = InjectedFailure;

    fn send(&mut self, frame: &CanFrame, timeout: MillisDurationU32) -> Result<(), Self::Error> {
        let attempt = self.timeouts.len();
        self.timeouts.push(timeout.ticks());
        if self.fail_all || self.fail_on.contains(&attempt) {
            return Err(InjectedFailure { attempt });
        }
        self.frames.push(*frame);
        Ok(())
    }
}

/// Transmitter whose mailboxes are always full
#[derive(Debug, Default)]
pub struct BusyMailbox {
    /// Transmit attempts so far
    pub polls: usize,
}

impl Transmit for BusyMailbox {
    type Error = core::convert::Infallible;

    fn try_transmit(&mut self, _frame: &CanFrame) -> nb::Result<(), Self::Error> {
        self.polls += 1;
        Err(nb::Error::WouldBlock)
    }
}
