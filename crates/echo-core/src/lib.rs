//! Echo Exporter Core Library
//!
//! This crate provides common types, utilities, and error handling
//! shared across all Echo exporter components.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::types::*;
}
