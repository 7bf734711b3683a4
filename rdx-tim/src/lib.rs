//! # tim
//!
//! A countdown timer with an aesthetically restricted display and a shared,
//! per-process registry of running timers.
//!
//! ## Core Concepts
//!
//! - **Fine display**: the remaining time is never shown raw. It is rounded
//!   forward to the next second whose minute and second digit sums add up to a
//!   multiple of three, then rendered as `MSS` (`501`) or, past nine minutes, as
//!   a quantized minute marker (`15°`). See [`quantize`].
//! - **Countdown engine**: a tick loop that walks `Running → OverTime →
//!   Finished`, launches the finish sequence exactly once when the target
//!   passes, and keeps counting up with a minus sign while the user is notified.
//!   See [`engine`].
//! - **Registry**: a plain text file with one `<pid> <display>` line per running
//!   timer, so an editor mode line or a status bar can show every timer at once.
//!   Each writer prunes lines of dead processes. See [`registry`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tim::prelude::*;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(TimConfig::default());
//!     let spec = TimerSpec::from_args("5", Some("tea".to_string()))?;
//!
//!     let collaborators = Collaborators {
//!         registry: Arc::new(TimerRegistry::for_current_process(&config)),
//!         sleep_guard: Arc::new(SleepGuard::disabled()),
//!         notifier: Arc::new(DesktopNotifier::from_config(&config.notify)),
//!     };
//!     let engine = CountdownEngine::new(config, spec, chrono::Utc::now(), collaborators)?;
//!
//!     let (_cancel_tx, cancel_rx) = mpsc::channel(1);
//!     let outcome = engine.run(cancel_rx).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub const APP_NAME: &str = "tim";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod components;
pub mod config;
pub mod countdown;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod quantize;
pub mod registry;

/// A prelude module for easy importing of the most common tim types.
pub mod prelude {
    pub use crate::common::{Phase, Pid};
    pub use crate::components::notifier::{DesktopNotifier, FinishNotifier};
    pub use crate::components::sleep_guard::SleepGuard;
    pub use crate::config::{FailurePolicy, TickCadence, TimConfig};
    pub use crate::countdown::{Countdown, Reading, TimerSpec};
    pub use crate::engine::{Collaborators, CountdownEngine, Outcome, TickReport};
    pub use crate::error::DurationError;
    pub use crate::events::{CancelRequest, TimerEvent};
    pub use crate::registry::{Liveness, RefreshNotifier, TimerEntry, TimerRegistry};
}
