//! Refresh notifications for external registry readers.

use super::command::{self, WaitOutcome};
use crate::config::RefreshConfig;
use crate::registry::RefreshNotifier;
use std::time::Duration;
use tracing::{debug, trace};

/// Runs a configured command (by default an `emacsclient` call) under a short deadline.
#[derive(Debug, Clone)]
pub struct CommandRefresh {
    argv: Vec<String>,
    timeout: Duration,
}

impl CommandRefresh {
    /// `None` when the configured command is empty.
    pub fn from_config(config: &RefreshConfig) -> Option<Self> {
        if config.command.is_empty() {
            return None;
        }
        Some(Self {
            argv: config.command.clone(),
            timeout: config.timeout(),
        })
    }
}

impl RefreshNotifier for CommandRefresh {
    fn refresh(&self) {
        let Some(mut cmd) = command::build(&self.argv, &[]) else {
            return;
        };
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(error = %e, program = %self.argv[0], "refresh command could not start");
                return;
            }
        };
        match command::wait_with_timeout(child, self.timeout) {
            Ok(WaitOutcome::Exited(status)) => trace!(%status, "refresh command finished"),
            Ok(WaitOutcome::TimedOut) => trace!("refresh command timed out"),
            Err(e) => debug!(error = %e, "refresh command failed"),
        }
    }
}

/// Used when no refresh command is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

impl RefreshNotifier for NoRefresh {
    fn refresh(&self) {}
}
