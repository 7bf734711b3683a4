//! Contains the collaborators a countdown drives but does not own the logic of.
//!
//! Each one wraps an operating system facility behind a small type: the process
//! table, external commands, the sleep inhibitor, the desktop notifier, and the
//! watchers that turn terminal input into cancellation requests.

pub(crate) mod command;
pub mod liveness;
pub mod notifier;
pub mod refresh;
pub mod sleep_guard;
pub mod watcher;
