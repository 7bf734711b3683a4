use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tim::components::liveness::ProcessTable;
use tim::components::refresh::NoRefresh;
use tim::prelude::*;

/// Prints the running tim countdowns on one line.
#[derive(Parser, Debug)]
#[command(name = "timstat", version, about)]
struct Cli {
    /// Re-print every MS milliseconds until Ctrl+C.
    #[arg(long, value_name = "MS")]
    watch: Option<u64>,

    /// Print without colors, e.g. for an editor mode line.
    #[arg(long)]
    plain: bool,

    /// Placed between two countdowns.
    #[arg(long, default_value = "  ")]
    separator: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.plain {
        colored::control::set_override(false);
    }

    let config = TimConfig::load().context("failed to load configuration")?;
    tim::logging::init(&config.log_level)?;

    // Read-only: this process never writes, so its own pid is irrelevant.
    let registry = TimerRegistry::new(
        config.registry_path.clone(),
        Pid::current(),
        Arc::new(ProcessTable),
        Arc::new(NoRefresh),
    );

    let Some(every) = cli.watch else {
        println!("{}", render(&registry.live_entries()?, &cli.separator));
        return Ok(());
    };

    let mut ticker = tokio::time::interval(Duration::from_millis(every.max(1)));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
            _ = ticker.tick() => {
                let line = render(&registry.live_entries()?, &cli.separator);
                print!("\r\x1b[2K{line}");
                io::stdout().flush().ok();
            }
        }
    }
}

/// Joins the display texts of `entries`, overdue countdowns in red.
fn render(entries: &[TimerEntry], separator: &str) -> String {
    entries
        .iter()
        .map(|entry| {
            if is_overdue(&entry.text) {
                entry.text.red().bold().to_string()
            } else {
                entry.text.bold().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Overdue labels end in a token starting with `-`, e.g. `tea -003`.
fn is_overdue(text: &str) -> bool {
    text.rsplit(' ')
        .next()
        .is_some_and(|shown| shown.starts_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pid: u32, text: &str) -> TimerEntry {
        TimerEntry {
            pid: Pid(pid),
            text: text.to_string(),
        }
    }

    #[test]
    fn overdue_is_read_from_the_last_token() {
        assert!(is_overdue("-003"));
        assert!(is_overdue("tea -003"));
        assert!(!is_overdue("tea 501"));
        assert!(!is_overdue("-tea 501"));
    }

    #[test]
    fn entries_are_joined_in_order() {
        colored::control::set_override(false);
        let line = render(&[entry(1, "tea 501"), entry(2, "-003")], " | ");
        assert_eq!(line, "tea 501 | -003");
        assert_eq!(render(&[], " | "), "");
    }
}
