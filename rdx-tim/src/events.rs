//! Defines the events a countdown broadcasts and the requests it accepts.
//!
//! The status label is just another subscriber of the `TimerEvent` stream; the
//! engine never talks to a UI directly.

use crate::common::{Phase, Pid};
use crate::countdown::Reading;
use chrono::{DateTime, Utc};

/// Events related to the lifecycle of one countdown.
#[derive(Debug, Clone)]
pub enum TimerEvent {
    /// Fired once when the tick loop begins.
    Started {
        pid: Pid,
        target: DateTime<Utc>,
        total_seconds: u64,
    },
    /// Fired on every tick, whether or not the label changed.
    Tick { label: String, phase: Phase },
    /// Fired once when the target time passes.
    OverTime,
    /// Fired once the finish sequence has cleaned up.
    Finished,
    /// Fired when a cancellation request ended the countdown.
    Cancelled { reading: Reading },
}

/// Why a countdown was asked to stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelRequest {
    /// Enter was pressed on the controlling terminal.
    Enter,
    /// Ctrl+C.
    Interrupt,
}
