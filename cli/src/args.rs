//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use lastbyte::core::constants::{DEFAULT_PORT, DEFAULT_PREFLUSH_DELAY, DEFAULT_WORKERS};
use lastbyte::core::{ConfigError, RaceConfig, RaceConfigBuilder, ResponseSink};

/// Send a request over many connections, holding back its last byte until
/// every connection is ready, then release them all at once.
#[derive(Debug, Parser)]
#[command(name = "lastbyte", version, disable_help_flag = true)]
pub struct Args {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Number of concurrent connections
    #[arg(short = 'g', long = "workers", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// File containing the raw request, or `-` for stdin
    #[arg(short = 'f', long = "file", default_value = "-")]
    pub file: PathBuf,

    /// Target host
    #[arg(short = 'h', long = "host")]
    pub host: Option<String>,

    /// Target port
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Use TLS (certificates are not verified)
    #[arg(short = 's', long = "secure")]
    pub secure: bool,

    /// Pause after sending the prefix, before reporting ready (microseconds)
    #[arg(long, default_value_t = DEFAULT_PREFLUSH_DELAY.as_micros() as u64)]
    pub delay_us: u64,

    /// Random delay bound applied before the trigger byte (microseconds)
    #[arg(long, default_value_t = 0)]
    pub jitter_us: u64,

    /// Shut down the write half after the trigger byte (plaintext only)
    #[arg(long)]
    pub half_close: bool,

    /// Discard responses instead of writing them to stdout
    #[arg(long)]
    pub discard: bool,

    /// Give up waiting for stragglers after this long and release anyway (milliseconds)
    #[arg(long)]
    pub ready_timeout_ms: Option<u64>,

    /// Connect and TLS handshake timeout (milliseconds)
    #[arg(long, default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    /// Timeout for each write or read attempt (milliseconds)
    #[arg(long, default_value_t = 5000)]
    pub io_timeout_ms: u64,

    /// Log filter, e.g. `info` or `lastbyte=debug`
    #[arg(long, env = "LASTBYTE_LOG", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Build and validate the run configuration.
    pub fn to_config(&self) -> Result<RaceConfig, ConfigError> {
        let mut builder = RaceConfigBuilder::new()
            .host(self.host.clone().unwrap_or_default())
            .port(self.port)
            .secure(self.secure)
            .workers(self.workers)
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .io_timeout(Duration::from_millis(self.io_timeout_ms))
            .preflush_delay(Duration::from_micros(self.delay_us))
            .jitter_us(self.jitter_us)
            .half_close(self.half_close)
            .sink(if self.discard {
                ResponseSink::Discard
            } else {
                ResponseSink::Stdout
            });
        if let Some(ms) = self.ready_timeout_ms {
            builder = builder.ready_timeout(Duration::from_millis(ms));
        }
        builder.build()
    }
}
