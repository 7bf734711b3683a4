//! The shared, file-based registry of running countdowns.
//!
//! Every running countdown owns one line of the form `<pid> <display text>`.
//! There is no lock: each write reads the whole file, drops this process's old
//! line and every line whose process is gone, appends the fresh line, and
//! overwrites the file. Two writers racing can lose one line for one tick; the
//! affected countdown puts it back on its next change.

use crate::common::Pid;
use crate::components::liveness::ProcessTable;
use crate::components::refresh::{CommandRefresh, NoRefresh};
use crate::config::TimConfig;
use anyhow::Context;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Answers whether a process is still running.
pub trait Liveness: Send + Sync {
    fn is_alive(&self, pid: Pid) -> bool;
}

/// Prompts an external reader to re-read the registry. Best effort, never fails.
pub trait RefreshNotifier: Send + Sync {
    fn refresh(&self);
}

/// One line of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEntry {
    pub pid: Pid,
    pub text: String,
}

impl TimerEntry {
    /// Splits a trimmed line at its first space. Lines without a numeric pid yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let (pid, text) = line.split_once(' ').unwrap_or((line, ""));
        let pid = pid.parse().ok()?;
        Some(Self {
            pid,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for TimerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pid, self.text)
    }
}

/// Rebuilds the registry content from `current`.
///
/// Keeps every line that belongs to another, still running process, in its
/// original order, then appends `entry` for `own` if one is given. Lines whose
/// pid cannot be read are dropped because their owner cannot be verified.
pub fn rewrite(
    current: &str,
    own: Pid,
    entry: Option<&str>,
    is_alive: impl Fn(Pid) -> bool,
) -> String {
    let mut out = String::new();
    for line in current.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(existing) = TimerEntry::parse(line) else {
            trace!(line, "dropping unreadable registry line");
            continue;
        };
        if existing.pid == own {
            continue;
        }
        if !is_alive(existing.pid) {
            debug!(pid = %existing.pid, "pruning registry entry of a dead process");
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    if let Some(text) = entry {
        let own_entry = TimerEntry {
            pid: own,
            text: text.to_string(),
        };
        out.push_str(&own_entry.to_string());
        out.push('\n');
    }
    out
}

/// A handle on the registry file, bound to one process identity.
pub struct TimerRegistry {
    path: PathBuf,
    own: Pid,
    liveness: Arc<dyn Liveness>,
    refresh: Arc<dyn RefreshNotifier>,
    announced: AtomicBool,
}

impl TimerRegistry {
    pub fn new(
        path: impl Into<PathBuf>,
        own: Pid,
        liveness: Arc<dyn Liveness>,
        refresh: Arc<dyn RefreshNotifier>,
    ) -> Self {
        Self {
            path: path.into(),
            own,
            liveness,
            refresh,
            announced: AtomicBool::new(false),
        }
    }

    /// The registry of the calling process, wired to the real process table and
    /// the configured refresh command.
    pub fn for_current_process(config: &TimConfig) -> Self {
        let refresh: Arc<dyn RefreshNotifier> = match CommandRefresh::from_config(&config.refresh) {
            Some(command) => Arc::new(command),
            None => Arc::new(NoRefresh),
        };
        Self::new(
            config.registry_path.clone(),
            Pid::current(),
            Arc::new(ProcessTable),
            refresh,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn own_pid(&self) -> Pid {
        self.own
    }

    /// Replaces this process's line with `text`, pruning dead entries on the way.
    ///
    /// The first write of a non-empty text in this process's lifetime also
    /// triggers a refresh notification.
    pub fn upsert_self(&self, text: &str) -> anyhow::Result<()> {
        let current = self.read()?;
        let next = rewrite(&current, self.own, Some(text), |pid| self.liveness.is_alive(pid));
        self.write(&next)?;
        trace!(pid = %self.own, text, "registry entry published");

        if !text.is_empty() && !self.announced.swap(true, Ordering::AcqRel) {
            self.refresh.refresh();
        }
        Ok(())
    }

    /// Removes this process's line, pruning dead entries on the way, and always
    /// triggers a refresh notification.
    pub fn remove_self(&self) -> anyhow::Result<()> {
        let current = self.read()?;
        let next = rewrite(&current, self.own, None, |pid| self.liveness.is_alive(pid));
        self.write(&next)?;
        debug!(pid = %self.own, "registry entry removed");
        self.refresh.refresh();
        Ok(())
    }

    /// Entries whose processes are alive, in file order. Never writes.
    pub fn live_entries(&self) -> anyhow::Result<Vec<TimerEntry>> {
        let current = self.read()?;
        Ok(current
            .lines()
            .map(str::trim)
            .filter_map(TimerEntry::parse)
            .filter(|entry| self.liveness.is_alive(entry.pid))
            .collect())
    }

    fn read(&self) -> anyhow::Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to read timer registry {}", self.path.display())
            }),
        }
    }

    fn write(&self, content: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create registry directory {}", parent.display())
            })?;
        }
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write timer registry {}", self.path.display()))
    }
}
