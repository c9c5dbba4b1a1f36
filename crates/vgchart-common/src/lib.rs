//! # vgchart common
//!
//! Shared error type, logging setup and test helpers used by every crate in
//! the vgchart workspace.

pub mod error;
pub mod logging;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, VgError};
pub use logging::{init_logging, LoggingConfig};
