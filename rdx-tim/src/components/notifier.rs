//! The desktop side of finishing a countdown: a notification, a sound, and a
//! dialog that blocks until the user has seen it.

use super::command;
use crate::config::NotifyConfig;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, warn};

/// Tells the user that a countdown is over.
///
/// Called once per countdown from a blocking context. May block for as long as
/// the user takes to acknowledge.
pub trait FinishNotifier: Send + Sync {
    fn notify(&self, message: &str) -> anyhow::Result<()>;
}

/// Drives external notification, audio and dialog commands.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    title: String,
    command: Vec<String>,
    acknowledge_command: Vec<String>,
    audio_command: Vec<String>,
    sound_file: Option<PathBuf>,
}

impl DesktopNotifier {
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self {
            title: config.title.clone(),
            command: config.command.clone(),
            acknowledge_command: config.acknowledge_command.clone(),
            audio_command: config.audio_command.clone(),
            sound_file: config.sound_file.as_deref().map(resolve_sound_file),
        }
    }

    fn run_to_completion(&self, argv: &[String], message: &str) -> anyhow::Result<()> {
        let vars = [("title", self.title.as_str()), ("message", message)];
        let Some(mut cmd) = command::build(argv, &vars) else {
            return Ok(());
        };
        let status = cmd
            .status()
            .with_context(|| format!("failed to run `{}`", argv[0]))?;
        if !status.success() {
            bail!("`{}` exited with {status}", argv[0]);
        }
        Ok(())
    }

    /// Starts the audio player without waiting for it.
    fn play_sound(&self) -> anyhow::Result<()> {
        let Some(sound) = &self.sound_file else {
            return Ok(());
        };
        if !sound.exists() {
            debug!(path = %sound.display(), "sound file not found, skipping audio");
            return Ok(());
        }
        let mut argv = self.audio_command.clone();
        if argv.is_empty() {
            return Ok(());
        }
        argv.push(sound.display().to_string());
        let Some(mut cmd) = command::build(&argv, &[]) else {
            return Ok(());
        };
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to start audio player `{}`", argv[0]))?;
        thread::spawn(move || match child.wait() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(%status, "audio player failed"),
            Err(e) => warn!(error = %e, "audio player failed"),
        });
        Ok(())
    }
}

impl FinishNotifier for DesktopNotifier {
    /// Runs every step even when an earlier one fails; the failures are
    /// reported together afterwards.
    fn notify(&self, message: &str) -> anyhow::Result<()> {
        let steps = [
            ("desktop notification", self.run_to_completion(&self.command, message)),
            ("finish sound", self.play_sound()),
            ("finish dialog", self.run_to_completion(&self.acknowledge_command, message)),
        ];
        let failures: Vec<String> = steps
            .into_iter()
            .filter_map(|(what, outcome)| outcome.err().map(|e| format!("{what}: {e:#}")))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            bail!("{}", failures.join("; "))
        }
    }
}

/// Relative sound files live next to the executable.
fn resolve_sound_file(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(path)))
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(command: &[&str], acknowledge: &[&str]) -> DesktopNotifier {
        DesktopNotifier {
            title: "Timer is finished".to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
            acknowledge_command: acknowledge.iter().map(|s| s.to_string()).collect(),
            audio_command: Vec::new(),
            sound_file: None,
        }
    }

    #[test]
    fn absolute_sound_files_are_kept() {
        let path = Path::new("/usr/share/sounds/bell.wav");
        assert_eq!(resolve_sound_file(path), path.to_path_buf());
    }

    #[test]
    fn relative_sound_files_sit_next_to_the_executable() {
        let resolved = resolve_sound_file(Path::new("you-can-heal.mp3"));
        assert!(resolved.ends_with("you-can-heal.mp3"));
        assert!(resolved.is_absolute());
    }

    #[test]
    fn empty_commands_notify_nothing() {
        assert!(notifier(&[], &[]).notify("501 passed.").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_commands_are_reported() {
        let err = notifier(&["false"], &[]).notify("501 passed.").unwrap_err();
        assert!(format!("{err:#}").contains("desktop notification"));

        let err = notifier(&["true"], &["false"]).notify("501 passed.").unwrap_err();
        assert!(format!("{err:#}").contains("finish dialog"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_notification_still_shows_the_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("acknowledged");
        let seen_arg = seen.display().to_string();

        let err = notifier(&["tim-no-such-notify-send"], &["touch", seen_arg.as_str()])
            .notify("501 passed.")
            .unwrap_err();

        assert!(seen.exists());
        let message = format!("{err:#}");
        assert!(message.contains("desktop notification"));
        assert!(!message.contains("finish dialog"));
    }

    #[test]
    fn missing_sound_file_is_skipped() {
        let mut quiet = notifier(&[], &[]);
        quiet.audio_command = vec!["tim-no-such-player".to_string()];
        quiet.sound_file = Some(PathBuf::from("/nonexistent/tim/sound.mp3"));
        assert!(quiet.notify("501 passed.").is_ok());
    }
}
