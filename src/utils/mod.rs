//! Shared utilities for the `newsletter` crate: error types and logging setup.

pub mod error;
pub mod logging;
