//! Defines watchers that turn outside input into `CancelRequest`s.

use crate::events::CancelRequest;
use std::io::{self, BufRead};
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const CANCEL_PROMPT: &str = "Hit Enter to cancel.";

/// Watches a line-oriented input and requests cancellation on the first line.
///
/// Reading blocks, so this runs on its own thread instead of a runtime worker;
/// the thread is left behind when the process exits. End of input (for example
/// when launched in the background) retires the watcher without cancelling.
pub fn spawn_enter_watcher<R>(input: R, cancel_tx: mpsc::Sender<CancelRequest>)
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || watch_lines(input, &cancel_tx));
}

fn watch_lines<R: BufRead>(mut input: R, cancel_tx: &mpsc::Sender<CancelRequest>) {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => debug!("input closed; Enter watcher retired"),
        Ok(_) => {
            cancel_tx.blocking_send(CancelRequest::Enter).ok();
        }
        Err(e) => warn!(error = %e, "failed to read input; Enter watcher retired"),
    }
}

/// Watches the terminal's stdin and prints the cancel prompt.
pub fn spawn_stdin_watcher(cancel_tx: mpsc::Sender<CancelRequest>) {
    println!("{CANCEL_PROMPT}");
    spawn_enter_watcher(io::BufReader::new(io::stdin()), cancel_tx);
}

/// Watches for Ctrl+C.
pub fn spawn_interrupt_watcher(cancel_tx: mpsc::Sender<CancelRequest>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                cancel_tx.send(CancelRequest::Interrupt).await.ok();
            }
            Err(e) => warn!(error = %e, "failed to listen for Ctrl+C"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[tokio::test]
    async fn enter_requests_cancellation() {
        let (tx, mut rx) = mpsc::channel(1);
        spawn_enter_watcher(Cursor::new(b"\n".to_vec()), tx);
        let request = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(request, Some(CancelRequest::Enter));
    }

    #[tokio::test]
    async fn closed_input_does_not_cancel() {
        let (tx, mut rx) = mpsc::channel(1);
        spawn_enter_watcher(Cursor::new(Vec::new()), tx);
        let request = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(request, None);
    }
}
