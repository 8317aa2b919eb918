//! Shared, immutable request template.

use std::fmt;

use super::analyzer::locate_trigger;
use crate::core::ConfigError;

/// Raw request bytes plus the precomputed trigger offset.
///
/// Built once per run and shared read-only (behind an `Arc`) by every worker.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    bytes: Vec<u8>,
    offset: usize,
}

impl RequestTemplate {
    /// Create a template, rejecting empty input.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptyTemplate);
        }
        let offset = locate_trigger(&bytes);
        Ok(Self { bytes, offset })
    }

    /// The full template.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Template length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty templates are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Index of the withheld byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes sent before readiness is reported.
    pub fn prefix(&self) -> &[u8] {
        &self.bytes[..self.offset]
    }

    /// The single byte sent after release.
    pub fn trigger(&self) -> &[u8] {
        &self.bytes[self.offset..self.offset + 1]
    }

    /// Bytes past the trigger byte. These are never sent; only one byte is
    /// withheld per connection.
    pub fn remainder(&self) -> &[u8] {
        &self.bytes[self.offset + 1..]
    }
}

impl fmt::Debug for RequestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTemplate")
            .field("len", &self.bytes.len())
            .field("offset", &self.offset)
            .field("trigger", &self.trigger())
            .finish()
    }
}
