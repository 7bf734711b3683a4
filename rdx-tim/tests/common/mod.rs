#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tim::prelude::*;

/// Liveness decided by a fixed set of pids.
pub struct StubLiveness {
    alive: Mutex<HashSet<u32>>,
}

impl StubLiveness {
    pub fn with(alive: &[u32]) -> Arc<Self> {
        Arc::new(Self {
            alive: Mutex::new(alive.iter().copied().collect()),
        })
    }

    pub fn kill(&self, pid: u32) {
        self.alive.lock().unwrap().remove(&pid);
    }
}

impl Liveness for StubLiveness {
    fn is_alive(&self, pid: Pid) -> bool {
        self.alive.lock().unwrap().contains(&pid.0)
    }
}

/// Counts refresh notifications.
#[derive(Default)]
pub struct CountingRefresh {
    count: AtomicUsize,
}

impl CountingRefresh {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl RefreshNotifier for CountingRefresh {
    fn refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records finish messages instead of showing them.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
    delay: Duration,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Blocks like a dialog waiting for the user.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl FinishNotifier for RecordingNotifier {
    fn notify(&self, message: &str) -> anyhow::Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        std::thread::sleep(self.delay);
        if self.fail {
            anyhow::bail!("no notification daemon");
        }
        Ok(())
    }
}

pub fn registry_at(
    path: &Path,
    own: u32,
    liveness: Arc<StubLiveness>,
    refresh: Arc<CountingRefresh>,
) -> TimerRegistry {
    TimerRegistry::new(path, Pid(own), liveness, refresh)
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
