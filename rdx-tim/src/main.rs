use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use tim::components::watcher;
use tim::prelude::*;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

/// Counts down with a fine display and publishes it to the shared timer registry.
#[derive(Parser, Debug)]
#[command(name = "tim", version, about)]
struct Cli {
    /// Countdown length: `M` minutes, `M,S` minutes and seconds, or `,S` seconds.
    duration: String,

    /// Shown in front of the countdown, e.g. `tea`.
    name: Option<String>,
}

fn print_usage() {
    println!(
        "Usage:\n  {} {{time option}} {{optional timer name}}\n\n\
         Valid time options are:\n  \
         ,15      (15 seconds)\n  \
         30       (30 minutes)\n  \
         30,45    (30 minutes and 45 seconds)",
        tim::APP_NAME
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Read the arguments. Anything malformed prints usage and exits with 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            print_usage();
            process::exit(1);
        }
    };
    let spec = match TimerSpec::from_args(&cli.duration, cli.name) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            print_usage();
            process::exit(1);
        }
    };
    let started_at = chrono::Utc::now();

    // 2. Configuration and structured logging.
    let config = Arc::new(TimConfig::load().context("failed to load configuration")?);
    tim::logging::init(&config.log_level)?;

    // 3. Collaborators.
    let policy = config.collaborator_failures;
    let sleep_guard = match SleepGuard::start(&config.sleep_inhibitor.command) {
        Ok(guard) => guard,
        Err(e) => {
            policy.absorb("sleep inhibitor", Err(e))?;
            SleepGuard::disabled()
        }
    };
    if let Some(pid) = sleep_guard.pid() {
        info!(%pid, "keeping the system awake");
    }
    let collaborators = Collaborators {
        registry: Arc::new(TimerRegistry::for_current_process(&config)),
        sleep_guard: Arc::new(sleep_guard),
        notifier: Arc::new(DesktopNotifier::from_config(&config.notify)),
    };

    // 4. The engine, its status label, and the cancellation watchers.
    let engine = CountdownEngine::new(config, spec, started_at, collaborators)?;
    spawn_status_label(engine.subscribe_events());

    let (cancel_tx, cancel_rx) = mpsc::channel(4);
    watcher::spawn_stdin_watcher(cancel_tx.clone());
    watcher::spawn_interrupt_watcher(cancel_tx);

    // 5. Run until finished or cancelled.
    match engine.run(cancel_rx).await? {
        Outcome::Finished => println!(),
        Outcome::Cancelled(reading) => println!("\n{reading}"),
    }
    Ok(())
}

/// Renders every tick's label in place on the terminal.
fn spawn_status_label(mut events: broadcast::Receiver<TimerEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TimerEvent::Tick { label, phase }) => {
                    let shown = match phase {
                        Phase::Running => label.bold(),
                        Phase::OverTime | Phase::Finished => label.red().bold(),
                    };
                    print!("\r\x1b[2K{shown}");
                    io::stdout().flush().ok();
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
