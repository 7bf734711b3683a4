//! Small helpers for running configured external commands.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Builds a command from `argv`, substituting `{name}` placeholders in every argument.
///
/// Returns `None` for an empty `argv`.
pub(crate) fn build(argv: &[String], vars: &[(&str, &str)]) -> Option<Command> {
    let (program, args) = argv.split_first()?;
    let mut command = Command::new(substitute(program, vars));
    command
        .args(args.iter().map(|arg| substitute(arg, vars)))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(command)
}

fn substitute(arg: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(arg.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

pub(crate) enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
}

/// Waits for `child` until `timeout` passes, then kills it.
pub(crate) fn wait_with_timeout(mut child: Child, timeout: Duration) -> io::Result<WaitOutcome> {
    let start = Instant::now();
    let check_interval = Duration::from_millis(5).min(timeout.max(Duration::from_millis(1)));
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(WaitOutcome::Exited(status));
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(WaitOutcome::TimedOut);
        }
        thread::sleep(check_interval);
    }
}
