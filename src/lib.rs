//! # lastbyte
//!
//! Synchronized last-byte request dispatch for probing time-of-check /
//! time-of-use races in network services.
//!
//! Many connections are opened to one endpoint. Each sends the request up to,
//! but excluding, a single trigger byte. Once every connection has reached
//! that point, all of them are released together and send the final byte,
//! so the target processes the requests as close to simultaneously as the
//! network allows.
//!
//! ## Feature Flags
//!
//! - `tls` (default): encrypted transport via rustls, without certificate
//!   verification
//!
//! ## Modules
//!
//! - [`core`]: Configuration, constants, and error types
//! - [`trigger`]: Request template and trigger offset analysis
//! - [`transport`]: Connection establishment and bounded I/O
//! - [`race`]: Workers, release gate, and the orchestrator
//!
//! ## Example Usage
//!
//! ```no_run
//! use lastbyte::prelude::*;
//!
//! # async fn example() -> Result<(), RaceError> {
//! let template = RequestTemplate::new(
//!     &b"POST /transfer HTTP/1.1\r\nHost: bank.test\r\nContent-Length: 2\r\n\r\n{}"[..],
//! )?;
//! let config = RaceConfigBuilder::new()
//!     .host("bank.test")
//!     .port(8080)
//!     .workers(30)
//!     .build()?;
//!
//! let summary = lastbyte::run(template, config).await?;
//! println!("{} of {} completed", summary.completed, summary.workers);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod core;
pub mod race;
pub mod transport;
pub mod trigger;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::race::{Orchestrator, Outcome, RunSummary, Signal, Stage};
    pub use crate::trigger::{RequestTemplate, locate_trigger};
}

use std::sync::Arc;

pub use crate::core::{ConfigError, ConnectError, RaceConfig, RaceConfigBuilder, RaceError};
pub use crate::race::{Orchestrator, RunSummary};
pub use crate::trigger::{RequestTemplate, locate_trigger};

/// Run one race with `config` against `template`.
///
/// Only configuration problems are returned as errors; per-connection
/// failures are logged and counted in the summary.
pub async fn run(template: RequestTemplate, config: RaceConfig) -> Result<RunSummary, RaceError> {
    let orchestrator = Orchestrator::new(config)?;
    Ok(orchestrator.run(Arc::new(template)).await)
}
