//! Core types: configuration, constants, and errors.

mod config;
pub mod constants;
mod error;

pub use config::*;
pub use error::*;
