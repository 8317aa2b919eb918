//! Two-phase synchronization of N workers.
//!
//! 1. Spawn N workers and wait for N `Ready` reports.
//! 2. Fire the release gate once.
//! 3. Wait for N `Done` reports.
//!
//! The orchestrator only counts reports; a failed connection is a worker-local
//! fact and never surfaces here as an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::gate::release_gate;
use super::signal::{Outcome, Signal};
use super::worker::Worker;
use crate::core::{ConfigError, RaceConfig};
use crate::trigger::RequestTemplate;

/// Counts gathered over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Workers spawned.
    pub workers: usize,
    /// Workers that reached the barrier with the prefix sent.
    pub armed: usize,
    /// Workers that reached the barrier only by failing first.
    pub unarmed: usize,
    /// Workers whose readiness had not arrived when the release fired.
    pub late: usize,
    /// Workers that sent the trigger byte and drained.
    pub completed: usize,
    /// Workers that failed at any stage.
    pub failed: usize,
    /// Response bytes drained across all workers.
    pub drained: usize,
    /// Time from spawn to release.
    pub time_to_release: Duration,
    /// Time from spawn to the last completion.
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    fn ready_count(&self) -> usize {
        self.armed + self.unarmed
    }

    fn done_count(&self) -> usize {
        self.completed + self.failed
    }

    fn record(&mut self, signal: Signal) {
        match signal {
            Signal::Ready { armed: true, .. } => self.armed += 1,
            Signal::Ready { armed: false, .. } => self.unarmed += 1,
            Signal::Done {
                outcome: Outcome::Completed { drained },
                ..
            } => {
                self.completed += 1;
                self.drained += drained;
            }
            Signal::Done {
                outcome: Outcome::Failed(_),
                ..
            } => self.failed += 1,
        }
    }
}

/// Spawns the workers and owns both synchronization points.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Arc<RaceConfig>,
}

impl Orchestrator {
    /// Create an orchestrator for a validated configuration.
    pub fn new(config: RaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Execute one race: every worker sends the same template.
    pub async fn run(&self, template: Arc<RequestTemplate>) -> RunSummary {
        let workers = self.config.workers;
        let started = Instant::now();
        let mut summary = RunSummary::new(workers);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let (gate, waiter) = release_gate();

        info!(
            workers,
            endpoint = %self.config.endpoint,
            secure = self.config.secure,
            prefix = template.prefix().len(),
            "starting race"
        );

        let handles: Vec<JoinHandle<Outcome>> = (0..workers)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&template),
                    Arc::clone(&self.config),
                    tx.clone(),
                    waiter.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();
        // Only workers hold senders now, so `recv` yields `None` once they
        // are all gone.
        drop(tx);
        drop(waiter);

        let deadline = self
            .config
            .ready_timeout
            .map(|t| tokio::time::Instant::now() + t);
        while summary.ready_count() < workers {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, rx.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        summary.late = workers - summary.ready_count();
                        warn!(
                            late = summary.late,
                            "readiness deadline passed, releasing without them"
                        );
                        break;
                    }
                },
                None => rx.recv().await,
            };
            let Some(signal) = next else {
                error!("all workers exited before reporting readiness");
                break;
            };
            debug!(?signal, "report");
            summary.record(signal);
        }

        summary.time_to_release = started.elapsed();
        gate.fire();
        info!(
            armed = summary.armed,
            unarmed = summary.unarmed,
            elapsed = ?summary.time_to_release,
            "released"
        );

        while summary.done_count() < workers {
            let Some(signal) = rx.recv().await else {
                error!(
                    missing = workers - summary.done_count(),
                    "workers exited without reporting completion"
                );
                break;
            };
            debug!(?signal, "report");
            summary.record(signal);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task panicked");
            }
        }

        summary.elapsed = started.elapsed();
        info!(
            completed = summary.completed,
            failed = summary.failed,
            drained = summary.drained,
            elapsed = ?summary.elapsed,
            "race finished"
        );
        summary
    }
}
