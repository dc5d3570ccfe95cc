//! Admin site registry and router generation.
//!
//! The [`AdminSite`] is the registry model admins are added to. It produces
//! an axum [`Router`] wiring every action that requires a distinct route to
//! its bound [`ActionView`](crate::routes::ActionView). A registered action
//! without a resolvable view is a configuration error raised at router
//! build time, before any traffic is served.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;

use tracing::Instrument;

use modeladmin_core::{AdminError, AdminResult};

use crate::options::ModelAdmin;
use crate::routes::{ActionView, ActionViewContext};

/// The registry of model admins for one admin installation.
///
/// # Examples
///
/// ```
/// use modeladmin::options::ModelAdmin;
/// use modeladmin::site::AdminSite;
///
/// let mut site = AdminSite::new("admin");
/// let admin = ModelAdmin::builder("blog", "article").build().unwrap();
/// site.register(admin).unwrap();
/// assert!(site.is_registered("blog.article"));
/// ```
pub struct AdminSite {
    name: String,
    admins: Vec<Arc<ModelAdmin>>,
}

impl AdminSite {
    /// Creates a new admin site with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admins: Vec::new(),
        }
    }

    /// Returns the site name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a model admin. Registering the same model key twice is a
    /// configuration error.
    pub fn register(&mut self, admin: ModelAdmin) -> AdminResult<()> {
        let key = admin.model_key();
        if self.is_registered(&key) {
            return Err(AdminError::ImproperlyConfigured(format!(
                "'{key}' is already registered with the '{}' admin site",
                self.name
            )));
        }
        self.admins.push(Arc::new(admin));
        Ok(())
    }

    /// Returns the admin registered under `model_key`, if any.
    pub fn get(&self, model_key: &str) -> Option<&Arc<ModelAdmin>> {
        self.admins.iter().find(|a| a.model_key() == model_key)
    }

    /// Returns whether a model is registered.
    pub fn is_registered(&self, model_key: &str) -> bool {
        self.get(model_key).is_some()
    }

    /// Returns the registered model keys in registration order.
    pub fn registered_models(&self) -> Vec<String> {
        self.admins.iter().map(|a| a.model_key()).collect()
    }

    /// Returns the number of registered models.
    pub fn model_count(&self) -> usize {
        self.admins.len()
    }

    /// Generates the axum router for every registered admin.
    ///
    /// One route is added per action requiring registration, at the pattern
    /// the URL helper reports. Instance routes capture the primary key as
    /// `{pk}` and hand it to the bound view's context.
    pub fn into_router(self) -> AdminResult<Router> {
        let mut router = Router::new();
        for admin in &self.admins {
            let url_helper = admin.url_helper();
            for action in admin.actions().for_url_registration() {
                let view = action.view.clone().ok_or_else(|| {
                    AdminError::ImproperlyConfigured(format!(
                        "No view could be identified for the '{}' action on '{}'. Bind \
                         one in the action definition or with the builder's 'view' option",
                        action.codename,
                        admin.model_key()
                    ))
                })?;
                let pattern = url_helper.action_url_pattern(action);
                let codename = action.codename.clone();
                if pattern.contains("{pk}") {
                    let handler = move |Path(pk): Path<String>,
                                        Query(query): Query<HashMap<String, String>>| {
                        let view = Arc::clone(&view);
                        let codename = codename.clone();
                        async move { dispatch(view, codename, Some(pk), query).await }
                    };
                    router = router.route(&pattern, any(handler));
                } else {
                    let handler = move |Query(query): Query<HashMap<String, String>>| {
                        let view = Arc::clone(&view);
                        let codename = codename.clone();
                        async move { dispatch(view, codename, None, query).await }
                    };
                    router = router.route(&pattern, any(handler));
                }
            }
        }
        Ok(router)
    }
}

impl fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSite")
            .field("name", &self.name)
            .field("model_count", &self.admins.len())
            .field("models", &self.registered_models().join(", "))
            .finish_non_exhaustive()
    }
}

async fn dispatch(
    view: Arc<dyn ActionView>,
    codename: String,
    pk: Option<String>,
    query: HashMap<String, String>,
) -> Response {
    let span = modeladmin_core::logging::action_span(&codename);
    let ctx = ActionViewContext { codename, pk, query };
    match view.dispatch(ctx).instrument(span).await {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &AdminError) -> Response {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        axum::Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}
