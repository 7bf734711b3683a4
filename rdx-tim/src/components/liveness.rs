//! Process liveness through the operating system's process table.

use crate::common::Pid;
use crate::registry::Liveness;

/// Probes pids with signal 0. Nothing is delivered; only existence is checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTable;

impl Liveness for ProcessTable {
    fn is_alive(&self, pid: Pid) -> bool {
        #[cfg(unix)]
        {
            // 0 and negative values address process groups, never probe those.
            let Ok(raw) = libc::pid_t::try_from(pid.0) else {
                return false;
            };
            if raw <= 0 {
                return false;
            }
            if unsafe { libc::kill(raw, 0) } == 0 {
                return true;
            }
            // EPERM: the process exists but belongs to another user.
            std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
        }
        #[cfg(not(unix))]
        {
            let _ = pid;
            false
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_alive() {
        assert!(ProcessTable.is_alive(Pid::current()));
    }

    #[test]
    fn group_addresses_are_never_alive() {
        assert!(!ProcessTable.is_alive(Pid(0)));
        assert!(!ProcessTable.is_alive(Pid(u32::MAX)));
    }

    #[test]
    fn processes_of_other_users_are_alive() {
        // pid 1 exists in every pid namespace, whoever owns it.
        assert!(ProcessTable.is_alive(Pid(1)));
    }

    #[test]
    fn reaped_child_is_dead() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = Pid(child.id());
        child.wait().unwrap();
        assert!(!ProcessTable.is_alive(pid));
    }
}
