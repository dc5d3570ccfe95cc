//! Core error types for the modeladmin-rs workspace.
//!
//! This module provides the [`AdminError`] enum covering configuration
//! errors, registration errors, and the request-time error categories the
//! admin layer can surface. Configuration problems are fatal and raised at
//! registration time; request-time permission problems are represented as
//! denials, not errors (see the helper crates).

use thiserror::Error;

/// The primary error type for the modeladmin layer.
///
/// Each variant maps to an appropriate HTTP status code via
/// [`AdminError::status_code`], used by the router layer when a bound view
/// fails.
#[derive(Error, Debug)]
pub enum AdminError {
    /// The admin layer is misconfigured. Raised at registration time so the
    /// mistake is caught before serving traffic.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A model or action was looked up that was never registered.
    #[error("Not registered: {0}")]
    NotRegistered(String),

    /// HTTP 403 Forbidden / Permission Denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AdminError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `PermissionDenied` -> 403
    /// - `NotFound`, `NotRegistered` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) | Self::NotRegistered(_) => 404,
            Self::ImproperlyConfigured(_) | Self::InternalServerError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, AdminError>`.
pub type AdminResult<T> = Result<T, AdminError>;
