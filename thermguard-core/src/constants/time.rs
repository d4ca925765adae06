//! Time-Related Constants
//!
//! The two timing knobs of the control loop.

/// Bounded wait for one frame transmission (milliseconds).
pub const SEND_TIMEOUT_MS: u32 = 1000;

/// Pacing budget for one full cycle over all segments (milliseconds).
///
/// Divided evenly across the configured segments.
pub const CYCLE_BUDGET_MS: u32 = 100;
