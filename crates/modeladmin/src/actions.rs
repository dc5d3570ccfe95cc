//! Admin actions and the per-model action registry.
//!
//! Every operation a model admin offers (create, edit, delete, publish, ...)
//! is described by a [`ModelAdminAction`]: its codename, display text
//! templates, permission requirement, URL behavior, and bound view. Actions
//! are declared once per model, merged with a default table at registration,
//! and immutable afterwards.
//!
//! Misdeclared actions (invalid or duplicate codenames) are configuration
//! errors surfaced at registration time, never deferred to request time.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use modeladmin_core::{AdminError, AdminResult};

use crate::routes::ActionView;

fn codename_regex() -> &'static Regex {
    static CODENAME: OnceLock<Regex> = OnceLock::new();
    CODENAME.get_or_init(|| Regex::new(r"^[a-z_]+$").expect("valid regex"))
}

/// Returns whether `codename` is a valid action codename: one or more
/// lower-case ascii letters and underscores.
pub fn is_valid_codename(codename: &str) -> bool {
    codename_regex().is_match(codename)
}

/// The values available to action text templates.
///
/// Templates may interpolate `{action_name}`, `{model_name_singular}`,
/// `{model_name_plural}`, and `{object_repr}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    /// The action's verbose name.
    pub action_name: String,
    /// The model's singular verbose name.
    pub model_name_singular: String,
    /// The model's plural verbose name.
    pub model_name_plural: String,
    /// The display representation of the object, or empty when no object
    /// is in play.
    pub object_repr: String,
}

/// Interpolates the template placeholders against `ctx`.
pub fn interpolate(template: &str, ctx: &TemplateContext) -> String {
    template
        .replace("{action_name}", &ctx.action_name)
        .replace("{model_name_singular}", &ctx.model_name_singular)
        .replace("{model_name_plural}", &ctx.model_name_plural)
        .replace("{object_repr}", &ctx.object_repr)
}

/// One operation offered for a model or its instances.
///
/// Constructed with builder-style methods and registered through a
/// [`ModelAdminBuilder`](crate::options::ModelAdminBuilder); validation
/// happens at registration.
///
/// # Examples
///
/// ```
/// use modeladmin::actions::ModelAdminAction;
///
/// let publish = ModelAdminAction::new("publish")
///     .permission_required("publish")
///     .button_title("Publish {model_name_singular} '{object_repr}'");
/// assert_eq!(publish.codename, "publish");
/// assert_eq!(publish.verbose_name, "publish");
/// ```
#[derive(Clone)]
pub struct ModelAdminAction {
    /// The action identifier, unique per model.
    pub codename: String,
    /// The human-readable action name. Defaults to the codename with
    /// underscores replaced by spaces.
    pub verbose_name: String,
    /// Whether the action applies to a specific object instance.
    pub instance_specific: bool,
    /// Optional description template.
    pub description: Option<String>,
    /// Optional button label template.
    pub button_label: Option<String>,
    /// Optional button title template.
    pub button_title: Option<String>,
    /// Optional button URL template overriding the URL helper.
    pub button_url: Option<String>,
    /// CSS classes added on top of the admin's defaults for this action.
    pub button_extra_css_classes: Vec<String>,
    /// Whether a URL route must be registered for this action. Actions that
    /// reuse an existing host route do not need one.
    pub url_registration_required: bool,
    /// Optional explicit route pattern overriding the URL helper's scheme.
    pub url_pattern: Option<String>,
    /// The permission codename gating this action, if any.
    pub permission_required: Option<String>,
    /// Optional explicit template name for the action's view.
    pub template_name: Option<String>,
    /// The view bound to this action's route.
    pub view: Option<Arc<dyn ActionView>>,
}

impl ModelAdminAction {
    /// Creates an action with the given codename and default settings:
    /// instance-specific, route registration required, no permission gate.
    pub fn new(codename: impl Into<String>) -> Self {
        let codename = codename.into();
        let verbose_name = codename.replace('_', " ");
        Self {
            codename,
            verbose_name,
            instance_specific: true,
            description: None,
            button_label: None,
            button_title: None,
            button_url: None,
            button_extra_css_classes: Vec::new(),
            url_registration_required: true,
            url_pattern: None,
            permission_required: None,
            template_name: None,
            view: None,
        }
    }

    /// Sets the verbose name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Sets whether the action applies to a specific object instance.
    #[must_use]
    pub const fn instance_specific(mut self, value: bool) -> Self {
        self.instance_specific = value;
        self
    }

    /// Sets the description template.
    #[must_use]
    pub fn description(mut self, template: impl Into<String>) -> Self {
        self.description = Some(template.into());
        self
    }

    /// Sets the button label template.
    #[must_use]
    pub fn button_label(mut self, template: impl Into<String>) -> Self {
        self.button_label = Some(template.into());
        self
    }

    /// Sets the button title template.
    #[must_use]
    pub fn button_title(mut self, template: impl Into<String>) -> Self {
        self.button_title = Some(template.into());
        self
    }

    /// Sets the button URL template.
    #[must_use]
    pub fn button_url(mut self, template: impl Into<String>) -> Self {
        self.button_url = Some(template.into());
        self
    }

    /// Sets extra CSS classes for this action's buttons.
    #[must_use]
    pub fn button_extra_css_classes(mut self, classes: Vec<&str>) -> Self {
        self.button_extra_css_classes = classes.into_iter().map(String::from).collect();
        self
    }

    /// Sets whether a URL route must be registered.
    #[must_use]
    pub const fn url_registration_required(mut self, value: bool) -> Self {
        self.url_registration_required = value;
        self
    }

    /// Sets an explicit route pattern.
    #[must_use]
    pub fn url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = Some(pattern.into());
        self
    }

    /// Sets the permission codename gating this action.
    #[must_use]
    pub fn permission_required(mut self, codename: impl Into<String>) -> Self {
        self.permission_required = Some(codename.into());
        self
    }

    /// Sets an explicit template name.
    #[must_use]
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    /// Binds a view to this action's route.
    #[must_use]
    pub fn view(mut self, view: Arc<dyn ActionView>) -> Self {
        self.view = Some(view);
        self
    }

    /// Returns the interpolated button label, if a template is set.
    pub fn button_label_for(&self, ctx: &TemplateContext) -> Option<String> {
        self.button_label.as_deref().map(|t| interpolate(t, ctx))
    }

    /// Returns the interpolated button title, if a template is set.
    pub fn button_title_for(&self, ctx: &TemplateContext) -> Option<String> {
        self.button_title.as_deref().map(|t| interpolate(t, ctx))
    }

    /// Returns the interpolated button URL, if a template is set.
    pub fn button_url_for(&self, ctx: &TemplateContext) -> Option<String> {
        self.button_url.as_deref().map(|t| interpolate(t, ctx))
    }

    /// Returns the interpolated description, if a template is set.
    pub fn description_for(&self, ctx: &TemplateContext) -> Option<String> {
        self.description.as_deref().map(|t| interpolate(t, ctx))
    }

    fn validate(&self, owner: &str) -> AdminResult<()> {
        if is_valid_codename(&self.codename) {
            Ok(())
        } else {
            Err(AdminError::ImproperlyConfigured(format!(
                "Cannot register an action with codename '{}' on '{owner}': action \
                 codenames must contain only lower case ascii letters and underscores",
                self.codename
            )))
        }
    }
}

impl fmt::Debug for ModelAdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdminAction")
            .field("codename", &self.codename)
            .field("verbose_name", &self.verbose_name)
            .field("instance_specific", &self.instance_specific)
            .field("url_registration_required", &self.url_registration_required)
            .field("permission_required", &self.permission_required)
            .field("has_view", &self.view.is_some())
            .finish_non_exhaustive()
    }
}

/// The default action table for a flat (non-hierarchical) model.
///
/// A fresh table is constructed on every call so that one registration can
/// never mutate the defaults seen by another.
pub fn default_model_actions() -> Vec<ModelAdminAction> {
    vec![
        ModelAdminAction::new("index").instance_specific(false),
        ModelAdminAction::new("create")
            .instance_specific(false)
            .permission_required("create"),
        ModelAdminAction::new("edit").permission_required("edit"),
        ModelAdminAction::new("delete").permission_required("delete"),
        ModelAdminAction::new("inspect").permission_required("inspect"),
    ]
}

/// The default action table for a tree-structured (page) model.
///
/// Instance actions handled by the host's tree-management UI reuse its
/// routes, so they carry `url_registration_required = false`; `view_live`
/// points at the live site and needs no admin route either.
pub fn default_page_model_actions() -> Vec<ModelAdminAction> {
    vec![
        ModelAdminAction::new("index").instance_specific(false),
        ModelAdminAction::new("create")
            .instance_specific(false)
            .permission_required("create"),
        ModelAdminAction::new("edit")
            .permission_required("edit")
            .url_registration_required(false),
        ModelAdminAction::new("delete")
            .permission_required("delete")
            .url_registration_required(false),
        ModelAdminAction::new("inspect").permission_required("inspect"),
        ModelAdminAction::new("copy")
            .permission_required("copy")
            .url_registration_required(false),
        ModelAdminAction::new("move")
            .permission_required("move")
            .url_registration_required(false),
        ModelAdminAction::new("unpublish")
            .permission_required("unpublish")
            .url_registration_required(false),
        ModelAdminAction::new("view_draft").url_registration_required(false),
        ModelAdminAction::new("view_live").url_registration_required(false),
        ModelAdminAction::new("revisions_index")
            .verbose_name("revision history")
            .permission_required("edit")
            .url_registration_required(false),
        ModelAdminAction::new("add_subpage")
            .verbose_name("add child page")
            .permission_required("add_subpage")
            .url_registration_required(false),
    ]
}

/// The ordered codename -> action mapping for one model admin.
///
/// Built once at registration by merging the default table with the
/// model-declared actions, then shared read-only.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<ModelAdminAction>,
}

impl ActionRegistry {
    /// Builds a registry from a full declared table, replacing the defaults
    /// entirely. Invalid or duplicate codenames are configuration errors.
    pub fn from_table(actions: Vec<ModelAdminAction>, owner: &str) -> AdminResult<Self> {
        let mut registry = Self {
            actions: Vec::with_capacity(actions.len()),
        };
        for action in actions {
            registry.insert_new(action, owner)?;
        }
        Ok(registry)
    }

    /// Builds a registry by merging `extras` into `defaults`.
    ///
    /// An extra whose codename matches a default replaces that default in
    /// place (explicit override wins); new codenames are appended in
    /// declaration order. Duplicates within `extras` are configuration
    /// errors.
    pub fn merged(
        defaults: Vec<ModelAdminAction>,
        extras: Vec<ModelAdminAction>,
        owner: &str,
    ) -> AdminResult<Self> {
        let mut registry = Self::from_table(defaults, owner)?;
        let mut seen_extras: Vec<String> = Vec::with_capacity(extras.len());
        for action in extras {
            action.validate(owner)?;
            if seen_extras.contains(&action.codename) {
                return Err(duplicate_codename_error(&action.codename, owner));
            }
            seen_extras.push(action.codename.clone());
            if let Some(existing) = registry.get_mut(&action.codename) {
                *existing = action;
            } else {
                registry.actions.push(action);
            }
        }
        Ok(registry)
    }

    fn insert_new(&mut self, action: ModelAdminAction, owner: &str) -> AdminResult<()> {
        action.validate(owner)?;
        if self.contains(&action.codename) {
            return Err(duplicate_codename_error(&action.codename, owner));
        }
        self.actions.push(action);
        Ok(())
    }

    /// Returns the action registered under `codename`, if any.
    pub fn get(&self, codename: &str) -> Option<&ModelAdminAction> {
        self.actions.iter().find(|a| a.codename == codename)
    }

    pub(crate) fn get_mut(&mut self, codename: &str) -> Option<&mut ModelAdminAction> {
        self.actions.iter_mut().find(|a| a.codename == codename)
    }

    /// Returns whether an action is registered under `codename`.
    pub fn contains(&self, codename: &str) -> bool {
        self.get(codename).is_some()
    }

    /// Iterates the registered actions in order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelAdminAction> {
        self.actions.iter()
    }

    /// Returns the registered codenames in order.
    pub fn codenames(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.codename.as_str()).collect()
    }

    /// Iterates the actions that need a URL route registered.
    pub fn for_url_registration(&self) -> impl Iterator<Item = &ModelAdminAction> {
        self.actions.iter().filter(|a| a.url_registration_required)
    }

    /// Returns the number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("action_count", &self.actions.len())
            .field("actions", &self.codenames())
            .finish()
    }
}

fn duplicate_codename_error(codename: &str, owner: &str) -> AdminError {
    AdminError::ImproperlyConfigured(format!(
        "An action with codename '{codename}' is already registered on '{owner}'"
    ))
}
