//! # modeladmin-core
//!
//! Foundation types for the modeladmin-rs workspace. This crate has no
//! domain dependencies and provides the error and logging layer shared by
//! the other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result alias
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;

// Re-export the most commonly used types at the crate root.
pub use error::{AdminError, AdminResult};
