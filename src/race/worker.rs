//! Per-connection worker.
//!
//! connect -> prefix -> (preflush) -> ready -> release -> (jitter) ->
//! trigger -> drain -> done. A worker that fails before readiness still
//! reports `Ready` (unarmed) and `Done`, so the orchestrator's fixed counts
//! always complete.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{Instrument, debug, info_span, trace, warn};

use super::gate::ReleaseWaiter;
use super::signal::{Outcome, Signal, Stage};
use super::timing::{jitter_delay, precise_sleep};
use crate::core::{RaceConfig, ResponseSink};
use crate::transport::{self, RaceStream};
use crate::trigger::RequestTemplate;

/// One connection's worth of the race.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    template: Arc<RequestTemplate>,
    config: Arc<RaceConfig>,
    reports: mpsc::UnboundedSender<Signal>,
    release: ReleaseWaiter,
    stage: Stage,
    ready_sent: bool,
}

impl Worker {
    /// Create a worker. Nothing happens until [`run`](Self::run).
    pub fn new(
        id: usize,
        template: Arc<RequestTemplate>,
        config: Arc<RaceConfig>,
        reports: mpsc::UnboundedSender<Signal>,
        release: ReleaseWaiter,
    ) -> Self {
        Self {
            id,
            template,
            config,
            reports,
            release,
            stage: Stage::Connecting,
            ready_sent: false,
        }
    }

    /// Drive the connection to completion. The connection is closed when
    /// this returns, on every path.
    pub async fn run(mut self) -> Outcome {
        let span = info_span!("worker", worker = self.id);
        async move {
            let outcome = match self.attempt().await {
                Ok(drained) => Outcome::Completed { drained },
                Err(stage) => Outcome::Failed(stage),
            };
            if !self.ready_sent {
                self.report_ready(false);
            }
            self.enter(Stage::Done);
            self.report(Signal::Done {
                worker: self.id,
                outcome,
            });
            outcome
        }
        .instrument(span)
        .await
    }

    async fn attempt(&mut self) -> Result<usize, Stage> {
        let config = Arc::clone(&self.config);

        self.enter(Stage::Connecting);
        let mut stream = transport::connect(config.secure, &config.endpoint, config.connect_timeout)
            .await
            .map_err(|e| self.failed(e))?;

        self.enter(Stage::SendingPrefix);
        transport::write_all(&mut stream, self.template.prefix(), config.io_timeout)
            .await
            .map_err(|e| self.failed(e))?;

        if !config.preflush_delay.is_zero() {
            self.enter(Stage::AwaitingOptionalDelay);
            precise_sleep(config.preflush_delay).await;
        }

        self.enter(Stage::SignalingReady);
        self.report_ready(true);

        self.enter(Stage::WaitingForRelease);
        if !self.release.wait().await {
            return Err(self.failed("release gate closed without firing"));
        }

        if let Some(delay) = jitter_delay(config.jitter_us) {
            self.enter(Stage::AwaitingJitter);
            precise_sleep(delay).await;
        }

        self.enter(Stage::SendingTrigger);
        transport::write_all(&mut stream, self.template.trigger(), config.io_timeout)
            .await
            .map_err(|e| self.failed(e))?;
        if config.half_close {
            self.half_close(&mut stream).await;
        }

        self.enter(Stage::Draining);
        let drained = match config.sink {
            ResponseSink::Discard => {
                transport::drain(&mut stream, None::<&mut tokio::io::Sink>, config.io_timeout).await
            }
            ResponseSink::Stdout => {
                let mut out = tokio::io::stdout();
                transport::drain(&mut stream, Some(&mut out), config.io_timeout).await
            }
        };
        debug!(drained, "response drained");
        Ok(drained)
    }

    async fn half_close(&self, stream: &mut RaceStream) {
        match stream.half_close().await {
            Ok(true) => trace!("write half closed"),
            Ok(false) => trace!("half-close skipped on encrypted connection"),
            Err(e) => debug!(error = %e, "half-close failed"),
        }
    }

    fn enter(&mut self, stage: Stage) {
        trace!(%stage, "stage");
        self.stage = stage;
    }

    fn failed(&self, error: impl fmt::Display) -> Stage {
        warn!(stage = %self.stage, error = %error, "worker failed");
        self.stage
    }

    fn report_ready(&mut self, armed: bool) {
        self.ready_sent = true;
        self.report(Signal::Ready {
            worker: self.id,
            armed,
        });
    }

    fn report(&self, signal: Signal) {
        // Only fails if the orchestrator is gone, in which case nobody is
        // counting anymore.
        let _ = self.reports.send(signal);
    }
}
