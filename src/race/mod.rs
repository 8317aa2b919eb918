//! lastbyte - Race Layer
//!
//! Coordinates N connection workers through a fixed two-phase barrier:
//!
//! ```text
//!  worker 0 ──connect──prefix──Ready─┐            ┌─trigger──drain──Done─┐
//!  worker 1 ──connect──prefix──Ready─┤  release   ├─trigger──drain──Done─┤
//!     ...                            ├──(once)────┤                      ├─> summary
//!  worker N ──connect──✗─────── Ready┘            └────────────────Done──┘
//! ```
//!
//! - [`Worker`]: per-connection state machine, see [`Stage`]
//! - [`Orchestrator`]: counts N `Ready`, fires the [`ReleaseGate`], counts N `Done`
//! - [`Signal`]: the only thing that flows from workers back to the orchestrator

mod gate;
mod orchestrator;
mod signal;
mod timing;
mod worker;

pub use gate::{ReleaseGate, ReleaseWaiter, release_gate};
pub use orchestrator::{Orchestrator, RunSummary};
pub use signal::{Outcome, Signal, Stage};
pub use timing::{jitter_delay, precise_sleep};
pub use worker::Worker;
