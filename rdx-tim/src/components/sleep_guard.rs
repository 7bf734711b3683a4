//! Keeps the machine awake while a countdown runs.

use super::command;
use crate::common::Pid;
use anyhow::Context;
use std::process::Child;
use std::sync::Mutex;
use tracing::{debug, info};

/// Owns the sleep inhibitor child process.
///
/// `stop` may be called from the finish sequence and from cancellation; only the
/// first call does anything. The child is also stopped on drop.
pub struct SleepGuard {
    child: Mutex<Option<Child>>,
    pid: Option<Pid>,
}

impl SleepGuard {
    /// Spawns the inhibitor. An empty `argv` yields a disabled guard.
    pub fn start(argv: &[String]) -> anyhow::Result<Self> {
        let Some(mut cmd) = command::build(argv, &[]) else {
            return Ok(Self::disabled());
        };
        // Helpers like `systemd-inhibit … sleep infinity` fork; a group of their
        // own lets `stop` reach the grandchildren too.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let child = cmd
            .spawn()
            .with_context(|| format!("failed to start sleep inhibitor `{}`", argv.join(" ")))?;
        let pid = Pid(child.id());
        info!(%pid, "sleep inhibitor started");
        Ok(Self {
            child: Mutex::new(Some(child)),
            pid: Some(pid),
        })
    }

    pub fn disabled() -> Self {
        Self {
            child: Mutex::new(None),
            pid: None,
        }
    }

    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    /// Kills the inhibitor's process group and reaps the inhibitor. Errors are
    /// ignored; it may already be gone.
    pub fn stop(&self) {
        let taken = self
            .child
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(mut child) = taken {
            kill_group(&child);
            let _ = child.kill();
            let _ = child.wait();
            debug!(pid = child.id(), "sleep inhibitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.child
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        if pgid > 0 {
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

impl Drop for SleepGuard {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_disabled() {
        let guard = SleepGuard::start(&[]).unwrap();
        assert_eq!(guard.pid(), None);
        assert!(!guard.is_running());
        guard.stop();
    }

    #[test]
    fn missing_program_is_an_error() {
        let argv = vec!["tim-no-such-inhibitor".to_string()];
        assert!(SleepGuard::start(&argv).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn stop_kills_the_inhibitor_once() {
        use crate::components::liveness::ProcessTable;
        use crate::registry::Liveness;

        let argv = vec!["sleep".to_string(), "30".to_string()];
        let guard = SleepGuard::start(&argv).unwrap();
        let pid = guard.pid().unwrap();
        assert!(ProcessTable.is_alive(pid));

        guard.stop();
        assert!(!guard.is_running());
        assert!(!ProcessTable.is_alive(pid));
        guard.stop();
    }

    /// Linux only: a grandchild killed with its parent may linger as a zombie
    /// until it is reaped, which still counts as dead here.
    #[cfg(target_os = "linux")]
    fn gone(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(')')
                .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z')),
            Err(_) => true,
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn stop_also_kills_forked_helpers() {
        use std::time::{Duration, Instant};

        let dir = tempfile::tempdir().unwrap();
        let pidfile = dir.path().join("helper.pid");
        let script = format!("sleep 120 & echo $! > {}; wait", pidfile.display());
        let argv = vec!["sh".to_string(), "-c".to_string(), script];
        let guard = SleepGuard::start(&argv).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let helper = loop {
            let written = std::fs::read_to_string(&pidfile).unwrap_or_default();
            if let Ok(pid) = written.trim().parse::<u32>() {
                break pid;
            }
            assert!(Instant::now() < deadline, "helper never started");
            std::thread::sleep(Duration::from_millis(10));
        };
        assert!(!gone(helper));

        guard.stop();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !gone(helper) {
            assert!(Instant::now() < deadline, "helper {helper} outlived stop()");
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}
