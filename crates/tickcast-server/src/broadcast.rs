//! The broadcast loop.
//!
//! Every `interval` the loop advances the counter, builds one [`Tick`],
//! encodes it once and offers the text to each subscriber in a registry
//! snapshot. What happens when an offer fails is decided by the configured
//! [`FailurePolicy`]:
//!
//! - `FailStop` clears the shared [`Liveness`] flag and the loop exits on
//!   the spot. Remaining subscribers get nothing more, ever.
//! - `DropSubscriber` deregisters the failed subscriber and carries on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tickcast_common::{DeliveryError, Tick, TickcastError};
use tickcast_config::{BroadcastConfig, FailurePolicy};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::clock::{Clock, LocalClock};
use crate::generator::ValueGenerator;
use crate::registry::Registry;

/// Process-wide run flag for the broadcast loop.
///
/// Starts alive and can only be cleared. Clearing it also wakes a loop that
/// is sleeping between ticks.
#[derive(Debug)]
pub struct Liveness {
    alive: AtomicBool,
    wake: Notify,
}

impl Liveness {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            alive: AtomicBool::new(true),
            wake: Notify::new(),
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Clear the flag. Returns true if this call was the one that cleared it.
    pub fn stop(&self) -> bool {
        let was_alive = self.alive.swap(false, Ordering::AcqRel);
        self.wake.notify_waiters();
        was_alive
    }

    /// Resolve once the flag has been cleared.
    pub async fn stopped(&self) {
        loop {
            let notified = self.wake.notified();
            if !self.is_alive() {
                return;
            }
            notified.await;
        }
    }
}

/// Why the loop exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    DeliveryFailure(DeliveryError),
}

/// Counters accumulated over the lifetime of one loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub ticks: u64,
    pub deliveries: u64,
    pub failures: u64,
    pub stopped_by: StopReason,
}

impl Default for BroadcastReport {
    fn default() -> Self {
        Self {
            ticks: 0,
            deliveries: 0,
            failures: 0,
            stopped_by: StopReason::Shutdown,
        }
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub value: i64,
    pub delivered: usize,
    pub failures: Vec<DeliveryError>,
    /// True when a failure cleared the liveness flag during this tick.
    pub halted: bool,
}

pub struct BroadcastLoop<C: Clock = LocalClock> {
    generator: ValueGenerator,
    registry: Registry,
    liveness: Arc<Liveness>,
    policy: FailurePolicy,
    interval: Duration,
    clock: C,
    report: BroadcastReport,
}

impl BroadcastLoop<LocalClock> {
    pub fn new(config: &BroadcastConfig, registry: Registry, liveness: Arc<Liveness>) -> Self {
        Self {
            generator: ValueGenerator::new(config.value_min, config.value_max),
            registry,
            liveness,
            policy: config.on_send_error,
            interval: config.interval(),
            clock: LocalClock,
            report: BroadcastReport::default(),
        }
    }
}

impl<C: Clock> BroadcastLoop<C> {
    /// Swap the timestamp source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> BroadcastLoop<C2> {
        BroadcastLoop {
            generator: self.generator,
            registry: self.registry,
            liveness: self.liveness,
            policy: self.policy,
            interval: self.interval,
            clock,
            report: self.report,
        }
    }

    pub fn liveness(&self) -> &Arc<Liveness> {
        &self.liveness
    }

    pub fn report(&self) -> &BroadcastReport {
        &self.report
    }

    /// Run until the liveness flag is cleared.
    pub async fn run(mut self) -> BroadcastReport {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            policy = %self.policy,
            "Broadcast loop started"
        );

        while self.liveness.is_alive() {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.liveness.stopped() => break,
            }
            if !self.liveness.is_alive() {
                break;
            }
            self.run_tick().await;
        }

        match &self.report.stopped_by {
            StopReason::Shutdown => tracing::info!(
                ticks = self.report.ticks,
                deliveries = self.report.deliveries,
                "Broadcast loop stopped"
            ),
            StopReason::DeliveryFailure(e) => tracing::warn!(
                ticks = self.report.ticks,
                deliveries = self.report.deliveries,
                error = %e,
                "Broadcast loop halted by delivery failure"
            ),
        }
        self.report
    }

    /// Produce one message and offer it to every subscriber in a snapshot.
    pub async fn run_tick(&mut self) -> TickOutcome {
        let value = self.generator.next();
        let tick = Tick::new(self.clock.timestamp(), value);
        let text: Arc<str> = Arc::from(tick.to_json());

        let subscribers = self.registry.snapshot().await;
        let mut outcome = TickOutcome {
            value,
            delivered: 0,
            failures: Vec::new(),
            halted: false,
        };
        self.report.ticks += 1;

        for subscriber in &subscribers {
            match subscriber.send(&text) {
                Ok(()) => {
                    outcome.delivered += 1;
                    self.report.deliveries += 1;
                    tracing::trace!(subscriber = %subscriber.id(), %text, "Sent");
                }
                Err(e) => {
                    self.report.failures += 1;
                    outcome.failures.push(e.clone());
                    match self.policy {
                        FailurePolicy::FailStop => {
                            tracing::warn!(error = %e, "Send failed, stopping broadcast");
                            self.liveness.stop();
                            self.report.stopped_by = StopReason::DeliveryFailure(e);
                            outcome.halted = true;
                            return outcome;
                        }
                        FailurePolicy::DropSubscriber => {
                            tracing::warn!(error = %e, "Send failed, dropping subscriber");
                            self.registry.remove(e.subscriber()).await;
                        }
                    }
                }
            }
        }

        outcome
    }
}

/// A broadcast loop running on its own task.
pub struct BroadcastTask {
    liveness: Arc<Liveness>,
    handle: JoinHandle<BroadcastReport>,
}

/// Start `broadcast` on a new tokio task.
pub fn spawn_broadcast<C: Clock>(broadcast: BroadcastLoop<C>) -> BroadcastTask {
    let liveness = Arc::clone(broadcast.liveness());
    let handle = tokio::spawn(broadcast.run());
    BroadcastTask { liveness, handle }
}

impl BroadcastTask {
    pub fn liveness(&self) -> &Arc<Liveness> {
        &self.liveness
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to exit on its own.
    pub async fn join(self) -> Result<BroadcastReport, TickcastError> {
        self.handle
            .await
            .map_err(|e| TickcastError::Other(format!("broadcast task failed: {e}")))
    }

    /// Clear the liveness flag and wait for the loop to exit.
    pub async fn shutdown(self) -> Result<BroadcastReport, TickcastError> {
        self.liveness.stop();
        self.join().await
    }
}
