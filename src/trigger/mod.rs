//! Request template analysis.
//!
//! Decides which single byte of a request is held back until release, so
//! that every connection has sent a fully framed request minus its last byte.

mod analyzer;
mod template;

pub use analyzer::locate_trigger;
pub use template::RequestTemplate;
