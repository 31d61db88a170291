//! Shared utilities for coinbot
//!
//! Logging setup shared by the bot binary and anything else in the workspace
//! that needs a subscriber installed.

pub mod logging;

pub use logging::{DEFAULT_FILTER, LogFormat, init_tracing};
