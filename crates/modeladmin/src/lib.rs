//! # modeladmin
//!
//! An extension layer for CMS-style model administration: register a model,
//! declare its actions, and get consistent buttons, URLs, permission
//! checks, and route registrations for the admin UI.
//!
//! ## Modules
//!
//! - [`actions`] - Action descriptors and the per-model action registry
//! - [`options`] - The [`ModelAdmin`](options::ModelAdmin) registrar and builder
//! - [`helpers`] - Per-request permission, URL, and button helpers
//! - [`widgets`] - Button value objects and ordered button specs
//! - [`records`] - The administered-object trait
//! - [`pages`] - The content-tree abstraction for page models
//! - [`routes`] - View bindings and route registrations
//! - [`site`] - The admin site registry and router generation
//!
//! ## Example
//!
//! ```
//! use modeladmin::options::ModelAdmin;
//! use modeladmin_auth::AdminUser;
//!
//! let admin = ModelAdmin::builder("blog", "article").build().unwrap();
//! let editor = AdminUser::new("vi").with_permissions(vec!["blog.change_article"]);
//! assert!(admin.user_can(&editor, "edit", None));
//! assert!(!admin.user_can(&editor, "delete", None));
//! ```

pub mod actions;
pub mod helpers;
pub mod options;
pub mod pages;
pub mod records;
pub mod routes;
pub mod site;
pub mod widgets;

// Re-export the most commonly used types at the crate root.
pub use actions::{ActionRegistry, ModelAdminAction};
pub use helpers::{ButtonHelper, ButtonKwargsProvider, PermissionHelper, PermissionRule, UrlHelper};
pub use options::{ModelAdmin, ModelAdminBuilder, ModelKind};
pub use records::AdminRecord;
pub use routes::{ActionView, ActionViewContext, UrlRegistration};
pub use site::AdminSite;
pub use widgets::{Button, ButtonKwargs, ButtonSpec};
