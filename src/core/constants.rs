//! Timing and framing constants.
//!
//! The timeouts are tunables, not protocol requirements; `RaceConfig` carries
//! the values actually used by a run.

use std::time::Duration;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Bound on TCP connect, and separately on the TLS handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on each individual write or read attempt.
pub const IO_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// WORKERS
// =============================================================================

/// Default number of concurrent connections.
pub const DEFAULT_WORKERS: usize = 20;

/// Default plaintext port.
pub const DEFAULT_PORT: u16 = 80;

/// Default pause after the prefix write, before reporting readiness.
pub const DEFAULT_PREFLUSH_DELAY: Duration = Duration::from_micros(20);

/// Read buffer used while draining responses.
pub const DRAIN_BUFFER_SIZE: usize = 4096;

// =============================================================================
// HTTP FRAMING
// =============================================================================

/// Header block terminator.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Header line separator.
pub const LINE_SEPARATOR: &[u8] = b"\r\n";

/// Header naming the body length (matched case-insensitively).
pub const CONTENT_LENGTH: &str = "content-length";
