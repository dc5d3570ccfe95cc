//! View binding and route registration types.
//!
//! Each action that needs its own route carries an [`ActionView`] — the
//! async handler the router dispatches to. The admin layer never renders
//! HTML itself; it hands the host one [`UrlRegistration`] per routed action
//! and wires the bound views into an axum router (see
//! [`AdminSite::into_router`](crate::site::AdminSite::into_router)).

use std::collections::HashMap;

use async_trait::async_trait;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use modeladmin_core::AdminResult;

/// The request data handed to a bound view.
#[derive(Debug, Clone, Default)]
pub struct ActionViewContext {
    /// The codename of the action whose route matched.
    pub codename: String,
    /// The primary key captured from the path, for instance routes.
    pub pk: Option<String>,
    /// The query-string parameters.
    pub query: HashMap<String, String>,
}

/// An async view bound to an action's route.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use axum::response::{IntoResponse, Response};
/// use modeladmin::routes::{ActionView, ActionViewContext};
/// use modeladmin_core::AdminResult;
///
/// struct EditView;
///
/// #[async_trait]
/// impl ActionView for EditView {
///     async fn dispatch(&self, ctx: ActionViewContext) -> AdminResult<Response> {
///         Ok(format!("editing {}", ctx.pk.unwrap_or_default()).into_response())
///     }
/// }
/// ```
#[async_trait]
pub trait ActionView: Send + Sync {
    /// Handles one request for the action's route.
    async fn dispatch(&self, ctx: ActionViewContext) -> AdminResult<Response>;
}

/// One (path pattern, route name) registration handed to the host router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRegistration {
    /// The route pattern, axum-style (`{pk}` for the instance segment).
    pub pattern: String,
    /// The reversible route name.
    pub name: String,
    /// The codename of the action this route serves.
    pub codename: String,
}
