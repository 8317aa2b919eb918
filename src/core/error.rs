//! Error types for lastbyte.

use std::io;

use thiserror::Error;

/// Invalid or missing run settings. Always fatal, raised before any
/// connection is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No target host was given.
    #[error("host is required")]
    MissingHost,

    /// Port 0 cannot be dialed.
    #[error("invalid port: {0}")]
    InvalidPort(u16),

    /// At least one worker is needed for a run.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// The request template has no bytes.
    #[error("request can not be empty")]
    EmptyTemplate,

    /// Encrypted transport was requested but this build has no TLS support.
    #[error("encrypted transport requested but the `tls` feature is disabled")]
    TlsUnavailable,
}

/// Failures while establishing a single connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// TCP connect did not finish in time.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// TLS handshake did not finish in time.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(std::time::Duration),

    /// Host portion of the endpoint is not usable as a TLS server name.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// TLS client configuration could not be built.
    #[error("tls configuration failed: {0}")]
    Tls(String),

    /// Encrypted transport requested without TLS support compiled in.
    #[error("tls support not compiled in")]
    TlsUnavailable,

    /// I/O error (dial or handshake).
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ConnectError {
    /// Check if this error is a timeout rather than a refusal or reset.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ConnectError::ConnectTimeout(_) | ConnectError::HandshakeTimeout(_)
        )
    }
}

/// Top-level lastbyte errors.
#[derive(Debug, Error)]
pub enum RaceError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection establishment error.
    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),

    /// A bounded write or read exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl RaceError {
    /// Check if this error is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        match self {
            RaceError::Timeout(_) => true,
            RaceError::Connect(e) => e.is_timeout(),
            RaceError::Io(e) => e.kind() == io::ErrorKind::TimedOut,
            RaceError::Config(_) => false,
        }
    }

    /// Check if this error is fatal to the whole run (as opposed to one
    /// connection).
    pub fn is_fatal(&self) -> bool {
        matches!(self, RaceError::Config(_))
    }
}

/// Result type for lastbyte operations.
pub type RaceResult<T> = Result<T, RaceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timeout_classification() {
        assert!(RaceError::Timeout(Duration::from_secs(5)).is_timeout());
        assert!(RaceError::from(ConnectError::ConnectTimeout(Duration::from_secs(5))).is_timeout());
        assert!(
            RaceError::from(ConnectError::HandshakeTimeout(Duration::from_secs(5))).is_timeout()
        );
        assert!(RaceError::Io(io::Error::new(io::ErrorKind::TimedOut, "slow")).is_timeout());

        assert!(!RaceError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "no")).is_timeout());
        assert!(!RaceError::from(ConfigError::MissingHost).is_timeout());
    }

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(RaceError::from(ConfigError::EmptyTemplate).is_fatal());
        assert!(RaceError::from(ConfigError::NoWorkers).is_fatal());

        assert!(!RaceError::Timeout(Duration::from_secs(1)).is_fatal());
        assert!(!RaceError::from(ConnectError::TlsUnavailable).is_fatal());
    }

    #[test]
    fn test_messages() {
        assert_eq!(ConfigError::EmptyTemplate.to_string(), "request can not be empty");
        assert_eq!(ConfigError::MissingHost.to_string(), "host is required");
        assert_eq!(
            RaceError::from(ConfigError::InvalidPort(0)).to_string(),
            "configuration error: invalid port: 0"
        );
    }
}
