//! CAN Bus Bring-up and Loopback Transport
//!
//! ## Startup
//!
//! The controller is brought up in two steps, install then start, and the
//! monitor must not run unless both succeed. [`bring_up`] performs the
//! sequence against any [`CanDriver`] and reports the failed step as
//! [`MonitorError::DriverInit`].
//!
//! ```text
//! install(500 kbit/s, mode, accept-all) ──► start ──► ready for Transport::send
//!        │ fail                               │ fail
//!        ▼                                    ▼
//!   "bus install"                        "bus start"
//! ```
//!
//! ## Loopback
//!
//! [`LoopbackBus`] is an in-process controller for host runs and tests. In
//! [`BusMode::NoAckLoopback`] every transmitted frame is also received back,
//! which lets diagnostics decode exactly what went on the wire.

use std::collections::VecDeque;
use std::fmt;

use fugit::MillisDurationU32;
use log::{debug, error, info};
use thermguard_core::constants::can::BUS_BITRATE;
use thermguard_core::{CanFrame, CanFrameEncoder, FrameError, MonitorError, SegmentFrame, Transport};
use thiserror::Error;

/// Controller operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusMode {
    /// Regular bus participant
    #[default]
    Normal,
    /// Self-test: no acknowledgement needed, frames are received back
    NoAckLoopback,
}

/// Acceptance filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusFilter {
    /// Accept every identifier
    #[default]
    AcceptAll,
    /// Accept only identifiers matching `id` under `mask`
    Match {
        /// Identifier bits to compare
        id: u32,
        /// Which bits are significant
        mask: u32,
    },
}

impl BusFilter {
    /// Whether a frame with identifier `id` passes the filter
    pub fn accepts(&self, id: u32) -> bool {
        match *self {
            Self::AcceptAll => true,
            Self::Match { id: want, mask } => id & mask == want & mask,
        }
    }
}

/// Parameters handed to the driver at install time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Nominal bitrate (bit/s)
    pub bitrate: u32,
    /// Operating mode
    pub mode: BusMode,
    /// Acceptance filter
    pub filter: BusFilter,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bitrate: BUS_BITRATE,
            mode: BusMode::Normal,
            filter: BusFilter::AcceptAll,
        }
    }
}

impl BusConfig {
    /// Self-test configuration that receives its own frames
    pub fn loopback() -> Self {
        Self {
            mode: BusMode::NoAckLoopback,
            ..Self::default()
        }
    }
}

/// Two-step controller bring-up
pub trait CanDriver {
    /// Driver-specific failure
    type Error: fmt::Display;

    /// Configure the controller
    fn install(&mut self, config: &BusConfig) -> Result<(), Self::Error>;

    /// Join the bus
    fn start(&mut self) -> Result<(), Self::Error>;
}

/// Install and start `driver`, stopping at the first failure
pub fn bring_up<D: CanDriver>(driver: &mut D, config: &BusConfig) -> Result<(), MonitorError> {
    info!(
        "Installing CAN driver: {} kbit/s, {:?}, {:?}",
        config.bitrate / 1000,
        config.mode,
        config.filter
    );
    if let Err(e) = driver.install(config) {
        error!("Failed to install CAN driver: {}", e);
        return Err(MonitorError::DriverInit { stage: "bus install" });
    }
    info!("CAN driver installed");

    if let Err(e) = driver.start() {
        error!("Failed to start CAN driver: {}", e);
        return Err(MonitorError::DriverInit { stage: "bus start" });
    }
    info!("CAN driver started");
    Ok(())
}

/// Loopback controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// `install` called twice
    #[error("driver already installed")]
    AlreadyInstalled,
    /// `start` before `install`
    #[error("driver not installed")]
    NotInstalled,
    /// Send before `start`
    #[error("driver not started")]
    NotRunning,
    /// Injected install failure
    #[error("install rejected by controller")]
    InstallRejected,
    /// Injected start failure
    #[error("controller failed to start")]
    StartRejected,
    /// Injected transmit failure
    #[error("transmit failed")]
    TransmitFailed,
}

/// Traffic counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BusStats {
    /// Frames accepted for transmission
    pub frames_sent: u64,
    /// Sends that returned an error
    pub frames_failed: u64,
    /// Payload bytes accepted
    pub bytes_sent: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninstalled,
    Installed(BusConfig),
    Running(BusConfig),
}

/// In-process CAN controller
#[derive(Debug)]
pub struct LoopbackBus {
    state: State,
    transmitted: Vec<CanFrame>,
    received: VecDeque<CanFrame>,
    fail_install: bool,
    fail_start: bool,
    failing_sends: usize,
    stats: BusStats,
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBus {
    /// Controller that has not been installed yet
    pub fn new() -> Self {
        Self {
            state: State::Uninstalled,
            transmitted: Vec::new(),
            received: VecDeque::new(),
            fail_install: false,
            fail_start: false,
            failing_sends: 0,
            stats: BusStats::default(),
        }
    }

    /// Make the next `install` fail
    pub fn fail_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    /// Make the next `start` fail
    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Make the next `count` sends fail
    pub fn fail_next_sends(&mut self, count: usize) {
        self.failing_sends = count;
    }

    /// Whether `start` has succeeded
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    /// Configuration given at install time
    pub fn config(&self) -> Option<&BusConfig> {
        match &self.state {
            State::Uninstalled => None,
            State::Installed(config) | State::Running(config) => Some(config),
        }
    }

    /// Every frame accepted so far, in order
    pub fn transmitted(&self) -> &[CanFrame] {
        &self.transmitted
    }

    /// Next frame received back in loopback mode
    pub fn receive(&mut self) -> Option<CanFrame> {
        self.received.pop_front()
    }

    /// Next received frame, decoded as a segment report
    pub fn receive_report(
        &mut self,
        encoder: &CanFrameEncoder,
    ) -> Option<Result<SegmentFrame, FrameError>> {
        self.receive().map(|frame| encoder.decode(&frame))
    }

    /// Traffic counters
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }
}

impl CanDriver for LoopbackBus {
    type Error = BusError;

    fn install(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        if self.state != State::Uninstalled {
            return Err(BusError::AlreadyInstalled);
        }
        if self.fail_install {
            self.fail_install = false;
            return Err(BusError::InstallRejected);
        }
        self.state = State::Installed(*config);
        Ok(())
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        let config = match self.state {
            State::Uninstalled => return Err(BusError::NotInstalled),
            State::Installed(config) | State::Running(config) => config,
        };
        if self.fail_start {
            self.fail_start = false;
            return Err(BusError::StartRejected);
        }
        self.state = State::Running(config);
        Ok(())
    }
}

impl Transport for LoopbackBus {
    type Error = BusError;

    fn send(&mut self, frame: &CanFrame, _timeout: MillisDurationU32) -> Result<(), Self::Error> {
        let config = match self.state {
            State::Running(config) => config,
            _ => {
                self.stats.frames_failed += 1;
                return Err(BusError::NotRunning);
            }
        };
        if self.failing_sends > 0 {
            self.failing_sends -= 1;
            self.stats.frames_failed += 1;
            return Err(BusError::TransmitFailed);
        }

        self.transmitted.push(*frame);
        self.stats.frames_sent += 1;
        self.stats.bytes_sent += frame.data().len() as u64;

        if config.mode == BusMode::NoAckLoopback && config.filter.accepts(frame.id().as_raw()) {
            self.received.push_back(*frame);
        }
        debug!("Loopback accepted frame {:#x}", frame.id().as_raw());
        Ok(())
    }
}
