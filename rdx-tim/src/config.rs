//! Defines all configuration structures for tim.
//!
//! These structs are deserialized with `serde` from layered sources: built-in
//! defaults, then an optional TOML file (`~/.tim/config.toml`, or the path in
//! `TIM_CONFIG`), then `TIM_*` environment variables such as
//! `TIM_REGISTRY_PATH` or `TIM_REFRESH__TIMEOUT_MS`.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "TIM_CONFIG";

const TIM_DIR: &str = ".tim";

/// The top-level configuration shared by `tim` and `timstat`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimConfig {
    /// The shared registry file every running countdown writes its line into.
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// How often the countdown recomputes and republishes its display.
    #[serde(default)]
    pub cadence: TickCadence,

    /// Default log directive when `TIM_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// What to do when a desktop collaborator (notifier, sound, sleep inhibitor) fails.
    #[serde(default)]
    pub collaborator_failures: FailurePolicy,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub sleep_inhibitor: SleepInhibitorConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Defines the tick speed of the countdown loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickCadence {
    /// Slightly under a second, so the display never visibly skips a second.
    #[default]
    Standard,
    /// A user-defined interval in milliseconds.
    Custom { interval_ms: u64 },
}

impl TickCadence {
    pub fn interval(&self) -> Duration {
        match self {
            TickCadence::Standard => Duration::from_millis(999),
            TickCadence::Custom { interval_ms } => Duration::from_millis((*interval_ms).max(1)),
        }
    }
}

/// Whether a failing desktop collaborator takes the whole timer down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the process with the collaborator's error.
    Fatal,
    /// Log the error and keep counting.
    #[default]
    Warn,
}

impl FailurePolicy {
    /// Applies the policy to the outcome of one collaborator call.
    pub fn absorb(self, what: &str, outcome: anyhow::Result<()>) -> anyhow::Result<()> {
        match (self, outcome) {
            (_, Ok(())) => Ok(()),
            (FailurePolicy::Fatal, Err(e)) => Err(e.context(format!("{what} failed"))),
            (FailurePolicy::Warn, Err(e)) => {
                warn!(error = %format!("{e:#}"), "{what} failed; continuing");
                Ok(())
            }
        }
    }
}

/// The command that prompts an external reader to re-read the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Program and arguments. Empty disables refresh notifications.
    #[serde(default = "default_refresh_command")]
    pub command: Vec<String>,

    /// The command is killed once this deadline passes.
    #[serde(default = "default_refresh_timeout_ms")]
    pub timeout_ms: u64,
}

impl RefreshConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// The helper process that keeps the machine from idling into sleep.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepInhibitorConfig {
    /// Program and arguments. Empty disables the inhibitor.
    #[serde(default = "default_sleep_inhibitor_command")]
    pub command: Vec<String>,
}

/// The finish notification. `{title}` and `{message}` are substituted in every argument.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_title")]
    pub title: String,

    /// Shows a desktop notification. Empty disables it.
    #[serde(default = "default_notify_command")]
    pub command: Vec<String>,

    /// Blocks until the user has seen the result. Empty skips the wait.
    #[serde(default = "default_acknowledge_command")]
    pub acknowledge_command: Vec<String>,

    /// Audio player; the sound file is appended as the last argument.
    #[serde(default = "default_audio_command")]
    pub audio_command: Vec<String>,

    /// Relative paths are resolved next to the executable.
    #[serde(default = "default_sound_file")]
    pub sound_file: Option<PathBuf>,
}

impl TimConfig {
    /// Loads the configuration from the default file location and the environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&default_config_path())
    }

    /// Loads the configuration from `path` (if it exists) and the environment.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(
                config::Environment::with_prefix("TIM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

impl Default for TimConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            cadence: TickCadence::default(),
            log_level: default_log_level(),
            collaborator_failures: FailurePolicy::default(),
            refresh: RefreshConfig::default(),
            sleep_inhibitor: SleepInhibitorConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            command: default_refresh_command(),
            timeout_ms: default_refresh_timeout_ms(),
        }
    }
}

impl Default for SleepInhibitorConfig {
    fn default() -> Self {
        Self {
            command: default_sleep_inhibitor_command(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            title: default_notify_title(),
            command: default_notify_command(),
            acknowledge_command: default_acknowledge_command(),
            audio_command: default_audio_command(),
            sound_file: default_sound_file(),
        }
    }
}

/// `$TIM_CONFIG`, or `~/.tim/config.toml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => tim_dir().join("config.toml"),
    }
}

fn tim_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TIM_DIR)
}

// --- Default value functions for serde ---

fn default_registry_path() -> PathBuf {
    tim_dir().join("timers.org")
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_refresh_command() -> Vec<String> {
    argv(&["emacsclient", "--eval", "(tim-mode-line-check)"])
}

fn default_refresh_timeout_ms() -> u64 {
    60
}

fn default_sleep_inhibitor_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        argv(&["caffeinate", "-i"])
    } else if cfg!(target_os = "linux") {
        argv(&[
            "systemd-inhibit",
            "--what=idle",
            "--who=tim",
            "--why=countdown running",
            "sleep",
            "infinity",
        ])
    } else {
        Vec::new()
    }
}

fn default_notify_title() -> String {
    "Timer is finished".to_string()
}

fn default_notify_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        argv(&[
            "osascript",
            "-e",
            "display notification \"{message}\" with title \"{title}\"",
        ])
    } else {
        argv(&["notify-send", "{title}", "{message}"])
    }
}

fn default_acknowledge_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        argv(&[
            "osascript",
            "-e",
            "display dialog \"{message}\" with title \"{title}\" buttons {\"OK\"} default button 1",
        ])
    } else {
        argv(&["zenity", "--info", "--title={title}", "--text={message}"])
    }
}

fn default_audio_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        argv(&["afplay"])
    } else {
        argv(&["ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet"])
    }
}

fn default_sound_file() -> Option<PathBuf> {
    Some(PathBuf::from("you-can-heal.mp3"))
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}
