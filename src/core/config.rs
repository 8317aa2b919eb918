//! Run configuration.

use std::fmt;
use std::time::Duration;

use super::constants::{
    CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_PREFLUSH_DELAY, DEFAULT_WORKERS, IO_TIMEOUT,
};
use super::error::ConfigError;

/// Target of every connection in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or IP literal; also used as the TLS server name.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Address string accepted by `TcpStream::connect`.
    pub fn authority(&self) -> String {
        // Bare IPv6 literals need brackets to be resolvable with a port.
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

/// Where drained response bytes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseSink {
    /// Read and drop.
    #[default]
    Discard,
    /// Forward to the process's standard output. Chunks from different
    /// workers interleave in arrival order.
    Stdout,
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct RaceConfig {
    /// Target endpoint.
    pub endpoint: Endpoint,

    /// Wrap each connection in TLS (no certificate verification).
    pub secure: bool,

    /// Number of concurrent connections.
    pub workers: usize,

    /// Bound on TCP connect and, separately, on the TLS handshake.
    pub connect_timeout: Duration,

    /// Bound on each individual write/read attempt.
    pub io_timeout: Duration,

    /// Pause after the prefix write before reporting readiness.
    pub preflush_delay: Duration,

    /// Upper bound (microseconds) of the random delay applied before the
    /// trigger byte. Zero disables jitter.
    pub jitter_us: u64,

    /// Shut down the write half after the trigger byte (plaintext only).
    pub half_close: bool,

    /// Destination of drained response bytes.
    pub sink: ResponseSink,

    /// Overall bound on the readiness phase. `None` waits for every worker.
    pub ready_timeout: Option<Duration>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::new("", DEFAULT_PORT),
            secure: false,
            workers: DEFAULT_WORKERS,
            connect_timeout: CONNECT_TIMEOUT,
            io_timeout: IO_TIMEOUT,
            preflush_delay: DEFAULT_PREFLUSH_DELAY,
            jitter_us: 0,
            half_close: false,
            sink: ResponseSink::Discard,
            ready_timeout: None,
        }
    }
}

impl RaceConfig {
    /// Check that the configuration can start a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.endpoint.port == 0 {
            return Err(ConfigError::InvalidPort(self.endpoint.port));
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.secure && !cfg!(feature = "tls") {
            return Err(ConfigError::TlsUnavailable);
        }
        Ok(())
    }
}

/// Builder for creating a `RaceConfig`.
#[derive(Debug)]
pub struct RaceConfigBuilder {
    config: RaceConfig,
}

impl RaceConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: RaceConfig::default(),
        }
    }

    /// Set the target host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.endpoint.host = host.into();
        self
    }

    /// Set the target port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.endpoint.port = port;
        self
    }

    /// Set host and port at once.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.endpoint = endpoint;
        self
    }

    /// Use TLS.
    pub fn secure(mut self, secure: bool) -> Self {
        self.config.secure = secure;
        self
    }

    /// Set the number of concurrent connections.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the connect/handshake timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the per-attempt write/read timeout.
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.config.io_timeout = timeout;
        self
    }

    /// Set the pause between the prefix write and the readiness report.
    pub fn preflush_delay(mut self, delay: Duration) -> Self {
        self.config.preflush_delay = delay;
        self
    }

    /// Set the jitter bound in microseconds.
    pub fn jitter_us(mut self, jitter_us: u64) -> Self {
        self.config.jitter_us = jitter_us;
        self
    }

    /// Enable or disable half-close after the trigger byte.
    pub fn half_close(mut self, enabled: bool) -> Self {
        self.config.half_close = enabled;
        self
    }

    /// Set where drained response bytes go.
    pub fn sink(mut self, sink: ResponseSink) -> Self {
        self.config.sink = sink;
        self
    }

    /// Bound the readiness phase.
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.config.ready_timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<RaceConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for RaceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
