//! The countdown engine: a tick-driven state machine over `Running`, `OverTime`
//! and `Finished`.

use crate::common::Phase;
use crate::components::notifier::FinishNotifier;
use crate::components::sleep_guard::SleepGuard;
use crate::config::{FailurePolicy, TimConfig};
use crate::countdown::{Countdown, Reading, TimerSpec};
use crate::events::{CancelRequest, TimerEvent};
use crate::quantize;
use crate::registry::TimerRegistry;
use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

/// The collaborators a countdown drives.
pub struct Collaborators {
    pub registry: Arc<TimerRegistry>,
    pub sleep_guard: Arc<SleepGuard>,
    pub notifier: Arc<dyn FinishNotifier>,
}

/// How a countdown ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The finish sequence ran to completion.
    Finished,
    /// A cancellation request arrived first.
    Cancelled(Reading),
}

/// What one tick computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub label: String,
    /// True only on the tick that moved the countdown from `Running` to `OverTime`.
    pub entered_overtime: bool,
}

/// One countdown.
///
/// The engine owns all state that changes between ticks: the phase, the last
/// label published to the registry, and handles on its collaborators. It is
/// driven either by [`CountdownEngine::run`] or, one step at a time, by
/// [`CountdownEngine::tick_at`].
pub struct CountdownEngine {
    config: Arc<TimConfig>,
    spec: TimerSpec,
    target: DateTime<Utc>,
    phase: Phase,
    last_label: Option<String>,
    registry: Arc<TimerRegistry>,
    sleep_guard: Arc<SleepGuard>,
    notifier: Arc<dyn FinishNotifier>,
    event_sender: broadcast::Sender<TimerEvent>,
}

impl CountdownEngine {
    /// Creates a countdown for `spec` that started at `started_at`.
    pub fn new(
        config: Arc<TimConfig>,
        spec: TimerSpec,
        started_at: DateTime<Utc>,
        collaborators: Collaborators,
    ) -> anyhow::Result<Self> {
        const CHANNEL_CAPACITY: usize = 64;
        let (event_sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        let length = i64::try_from(spec.total_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .with_context(|| format!("countdown of {} seconds is too long", spec.total_seconds))?;
        let target = started_at
            .checked_add_signed(length)
            .context("countdown target is out of range")?;

        Ok(Self {
            config,
            spec,
            target,
            phase: Phase::Running,
            last_label: None,
            registry: collaborators.registry,
            sleep_guard: collaborators.sleep_guard,
            notifier: collaborators.notifier,
            event_sender,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Subscribes to the `TimerEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_sender.subscribe()
    }

    /// Runs one tick as of `now`.
    ///
    /// Detects the overtime transition, renders the label, publishes it to the
    /// registry when it changed since the previous tick, and broadcasts it as a
    /// `TimerEvent::Tick` regardless.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> anyhow::Result<TickReport> {
        let remaining = Countdown::until(self.target, now);

        let entered_overtime = self.phase == Phase::Running && remaining.is_over_time();
        if entered_overtime {
            self.phase = Phase::OverTime;
            info!(name = ?self.spec.name, "countdown reached its target");
            self.event_sender.send(TimerEvent::OverTime).ok();
        }

        let label = self.label_for(remaining);
        if self.last_label.as_deref() != Some(label.as_str()) {
            self.registry
                .upsert_self(&label)
                .context("failed to publish countdown to the timer registry")?;
            self.last_label = Some(label.clone());
        }

        trace!(%label, phase = ?self.phase, "tick");
        self.event_sender
            .send(TimerEvent::Tick {
                label: label.clone(),
                phase: self.phase,
            })
            .ok();

        Ok(TickReport {
            label,
            entered_overtime,
        })
    }

    fn label_for(&self, remaining: Countdown) -> String {
        let shown = match self.phase {
            Phase::Running => remaining.display(),
            Phase::OverTime | Phase::Finished => {
                let overdue = remaining.flip_for_over_time();
                let shown = overdue.display();
                // No minus on whole minutes, so the zero crossing never reads "-000".
                if overdue.seconds == 0 {
                    shown
                } else {
                    format!("-{shown}")
                }
            }
        };
        match &self.spec.name {
            Some(name) => format!("{name} {shown}"),
            None => shown,
        }
    }

    /// Ticks until the finish sequence completes or a cancellation request arrives.
    ///
    /// The finish sequence is spawned exactly once, on the tick that enters
    /// `OverTime`, and runs alongside the loop so the overtime display keeps
    /// updating while the user is being notified.
    pub async fn run(
        mut self,
        mut cancel_rx: mpsc::Receiver<CancelRequest>,
    ) -> anyhow::Result<Outcome> {
        let (finish_tx, mut finish_rx) = mpsc::channel::<anyhow::Result<()>>(1);
        let mut ticker = tokio::time::interval(self.config.cadence.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            pid = %self.registry.own_pid(),
            total_seconds = self.spec.total_seconds,
            registry = %self.registry.path().display(),
            "countdown starting"
        );
        self.event_sender
            .send(TimerEvent::Started {
                pid: self.registry.own_pid(),
                target: self.target,
                total_seconds: self.spec.total_seconds,
            })
            .ok();

        loop {
            tokio::select! {
                biased;
                Some(finished) = finish_rx.recv() => {
                    finished?;
                    // Only this loop writes the own entry, so no tick can restore it.
                    self.registry
                        .remove_self()
                        .context("failed to remove countdown from the timer registry")?;
                    self.phase = Phase::Finished;
                    self.event_sender.send(TimerEvent::Finished).ok();
                    info!("countdown finished");
                    return Ok(Outcome::Finished);
                }
                Some(request) = cancel_rx.recv() => {
                    return self.cancel(request, Utc::now());
                }
                _ = ticker.tick() => {
                    let report = self.tick_at(Utc::now())?;
                    if report.entered_overtime {
                        self.spawn_finish(finish_tx.clone());
                    }
                }
            }
        }
    }

    /// Ends the countdown early: removes the registry entry, stops the sleep
    /// inhibitor, and reports the reading as of `now`.
    pub fn cancel(
        &mut self,
        request: CancelRequest,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Outcome> {
        let reading = Reading::at(self.target, now);
        info!(?request, %reading, "countdown cancelled");

        self.registry
            .remove_self()
            .context("failed to remove countdown from the timer registry")?;
        self.sleep_guard.stop();
        self.phase = Phase::Finished;

        self.event_sender
            .send(TimerEvent::Cancelled {
                reading: reading.clone(),
            })
            .ok();
        Ok(Outcome::Cancelled(reading))
    }

    fn spawn_finish(&self, done: mpsc::Sender<anyhow::Result<()>>) {
        let finish = FinishSequence {
            total_seconds: self.spec.total_seconds,
            policy: self.config.collaborator_failures,
            sleep_guard: self.sleep_guard.clone(),
            notifier: self.notifier.clone(),
        };
        debug!("spawning finish sequence");
        tokio::spawn(async move {
            let result = finish.run().await;
            done.send(result).await.ok();
        });
    }
}

/// The one-shot work done once the target passes. Registry cleanup is left to
/// the tick loop.
struct FinishSequence {
    total_seconds: u64,
    policy: FailurePolicy,
    sleep_guard: Arc<SleepGuard>,
    notifier: Arc<dyn FinishNotifier>,
}

impl FinishSequence {
    async fn run(self) -> anyhow::Result<()> {
        self.sleep_guard.stop();

        let message = finish_message(self.total_seconds);
        let notifier = self.notifier.clone();
        let notified = tokio::task::spawn_blocking(move || notifier.notify(&message))
            .await
            .context("finish notifier panicked")?;
        self.policy.absorb("finish notification", notified)
    }
}

/// The human-readable message for a countdown of `total_seconds`, e.g. `501 passed.`.
pub fn finish_message(total_seconds: u64) -> String {
    format!("{} passed.", quantize::total_seconds_to_string(total_seconds))
}
