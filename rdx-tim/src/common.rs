//! Contains common, primitive types shared by every part of tim.
//!
//! `Pid` is the registry key and the handle used for liveness checks, so it gets
//! its own type instead of travelling around as a bare integer.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

pub const SECONDS_IN_MINUTE: u64 = 60;

/// Identifies one operating system process.
///
/// Every running countdown owns exactly one registry line keyed by its `Pid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u32);

impl Pid {
    /// The identity of the calling process.
    pub fn current() -> Self {
        Pid(std::process::id())
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Pid {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(Pid)
    }
}

/// The phases of a countdown. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The target time is still ahead.
    Running,
    /// The target has passed; the display counts up with a minus sign.
    OverTime,
    /// Terminal. The finish sequence or a cancellation has completed.
    Finished,
}
