//! CAN transport contract
//!
//! The control loop hands each report to a [`Transport`] with a bounded
//! timeout and treats failure as a dropped frame. Bus drivers that expose a
//! non-blocking transmit (`nb` style, like most embedded CAN peripherals)
//! plug in through [`PollingTransport`].
//!
//! ## Two-Level Error Model
//!
//! [`Transmit::try_transmit`] follows `nb` conventions:
//! - `nb::Error::WouldBlock` - mailboxes full, try again
//! - `nb::Error::Other(E)` - the controller rejected the frame
//!
//! [`PollingTransport`] retries `WouldBlock` until the deadline and maps the
//! outcome to [`SendError`].

use core::fmt::Debug;

use fugit::MillisDurationU32;

use crate::frame::CanFrame;
use crate::time::TimeSource;

/// Blocking send with a bounded wait
pub trait Transport {
    /// Why a frame was not sent
    type Error: Debug;

    /// Queue `frame` on the bus, giving up after `timeout`
    fn send(&mut self, frame: &CanFrame, timeout: MillisDurationU32) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, frame: &CanFrame, timeout: MillisDurationU32) -> Result<(), Self::Error> {
        (**self).send(frame, timeout)
    }
}

/// Non-blocking transmit primitive of a CAN controller
pub trait Transmit {
    /// Controller error
    type Error: Debug;

    /// Try to place `frame` in a transmit mailbox
    fn try_transmit(&mut self, frame: &CanFrame) -> nb::Result<(), Self::Error>;
}

/// Failure of a bounded send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError<E> {
    /// No mailbox freed up before the deadline
    Timeout,
    /// Controller rejected the frame
    Bus(E),
}

impl<E: Debug> core::fmt::Display for SendError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "transmit timed out"),
            Self::Bus(e) => write!(f, "bus error: {:?}", e),
        }
    }
}

/// [`Transport`] over an `nb` transmitter and a clock
#[derive(Debug)]
pub struct PollingTransport<T, C> {
    tx: T,
    clock: C,
}

impl<T: Transmit, C: TimeSource> PollingTransport<T, C> {
    /// Wrap a transmitter
    pub fn new(tx: T, clock: C) -> Self {
        Self { tx, clock }
    }

    /// Underlying transmitter
    pub fn inner(&self) -> &T {
        &self.tx
    }

    /// Take the transmitter and clock back
    pub fn release(self) -> (T, C) {
        (self.tx, self.clock)
    }
}

impl<T: Transmit, C: TimeSource> Transport for PollingTransport<T, C> {
    type Error = SendError<T::Error>;

    fn send(&mut self, frame: &CanFrame, timeout: MillisDurationU32) -> Result<(), Self::Error> {
        let deadline = self.clock.now().saturating_add(timeout.ticks() as u64);
        loop {
            match self.tx.try_transmit(frame) {
                Ok(()) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(SendError::Bus(e)),
                Err(nb::Error::WouldBlock) => {
                    if self.clock.now() >= deadline {
                        return Err(SendError::Timeout);
                    }
                }
            }
        }
    }
}
