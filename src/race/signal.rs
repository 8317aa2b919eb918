//! Worker stages and the reports workers send to the orchestrator.

use std::fmt;

/// Position of a worker in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Dialing and (optionally) handshaking.
    Connecting,
    /// Writing everything before the trigger byte.
    SendingPrefix,
    /// Letting the prefix reach the wire before reporting.
    AwaitingOptionalDelay,
    /// Reporting readiness.
    SignalingReady,
    /// Blocked on the release gate.
    WaitingForRelease,
    /// Random pre-trigger delay.
    AwaitingJitter,
    /// Writing the trigger byte (and half-closing if configured).
    SendingTrigger,
    /// Reading whatever the target sends back.
    Draining,
    /// Finished.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Connecting => "connecting",
            Stage::SendingPrefix => "sending prefix",
            Stage::AwaitingOptionalDelay => "preflush delay",
            Stage::SignalingReady => "signaling ready",
            Stage::WaitingForRelease => "waiting for release",
            Stage::AwaitingJitter => "jitter delay",
            Stage::SendingTrigger => "sending trigger",
            Stage::Draining => "draining",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a worker's run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The trigger byte was sent; `drained` response bytes were read.
    Completed {
        /// Response bytes observed.
        drained: usize,
    },
    /// The worker gave up in the given stage.
    Failed(Stage),
}

/// A report from a worker. Every worker sends exactly one `Ready` followed
/// by exactly one `Done`, whether or not its connection worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The worker reached the barrier. `armed` is `false` when it only got
    /// here by failing early and has nothing to release.
    Ready {
        /// Worker index.
        worker: usize,
        /// Prefix is on the wire and the trigger byte is pending.
        armed: bool,
    },
    /// The worker finished.
    Done {
        /// Worker index.
        worker: usize,
        /// Result of the attempt.
        outcome: Outcome,
    },
}

impl Signal {
    /// Index of the reporting worker.
    pub fn worker(&self) -> usize {
        match self {
            Signal::Ready { worker, .. } | Signal::Done { worker, .. } => *worker,
        }
    }

    /// Whether this is a readiness report.
    pub fn is_ready(&self) -> bool {
        matches!(self, Signal::Ready { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_accessors() {
        let ready = Signal::Ready {
            worker: 3,
            armed: true,
        };
        let done = Signal::Done {
            worker: 7,
            outcome: Outcome::Failed(Stage::Connecting),
        };
        assert_eq!(ready.worker(), 3);
        assert!(ready.is_ready());
        assert_eq!(done.worker(), 7);
        assert!(!done.is_ready());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Connecting.to_string(), "connecting");
        assert_eq!(Stage::SendingTrigger.to_string(), "sending trigger");
    }
}
