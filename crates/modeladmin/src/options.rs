//! Model administration configuration — the registrar.
//!
//! A [`ModelAdmin`] wires the action registry, permission helper, URL
//! helper, and button helper together for one registered model. It is built
//! once through [`ModelAdminBuilder`], which surfaces every configuration
//! mistake (bad codenames, overrides naming unknown actions, a page model
//! without a tree) as [`AdminError::ImproperlyConfigured`] before any
//! traffic is served. After `build()` the admin is immutable and shared
//! read-only across requests.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use modeladmin_auth::{AdminUser, PermissionRegistry};
use modeladmin_core::{AdminError, AdminResult};

use crate::actions::{
    default_model_actions, default_page_model_actions, ActionRegistry, ModelAdminAction,
    TemplateContext,
};
use crate::helpers::button::{ButtonHelper, ButtonKwargsProvider};
use crate::helpers::permission::{perm_codename_for, PermissionHelper, PermissionRule};
use crate::helpers::url::UrlHelper;
use crate::pages::PageTree;
use crate::records::AdminRecord;
use crate::routes::{ActionView, UrlRegistration};
use crate::widgets::ButtonSpec;

/// How permissions and URLs are resolved for a model: model-wide (flat) or
/// per-subtree (page). Selected once at build time and held as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// A record with model-wide permissions.
    Flat,
    /// Tree-structured content with per-subtree authority.
    Page,
}

/// The admin registrar for one model.
///
/// # Examples
///
/// ```
/// use modeladmin::options::ModelAdmin;
///
/// let admin = ModelAdmin::builder("blog", "article")
///     .inspect_view_enabled(true)
///     .build()
///     .unwrap();
/// assert_eq!(admin.model_key(), "blog.article");
/// assert_eq!(admin.verbose_name(), "article");
/// ```
pub struct ModelAdmin {
    app_label: String,
    model_name: String,
    verbose_name: String,
    verbose_name_plural: String,
    kind: ModelKind,
    inspect_view_enabled: bool,
    base_url_path: Option<String>,
    default_button_css_classes: Vec<String>,
    create_button_css_classes: Vec<String>,
    delete_button_css_classes: Vec<String>,
    index_view_button_names: Option<Vec<ButtonSpec>>,
    inspect_view_button_names: Option<Vec<String>>,
    allowed_parent_page_types: Vec<String>,
    actions: ActionRegistry,
    permission_rules: HashMap<String, PermissionRule>,
    button_kwargs_overrides: HashMap<String, ButtonKwargsProvider>,
    permission_registry: Arc<PermissionRegistry>,
    page_tree: Option<Arc<dyn PageTree>>,
    inspect_permission_cache: OnceLock<bool>,
}

impl ModelAdmin {
    /// Starts building an admin for `app_label.model_name`.
    pub fn builder(
        app_label: impl Into<String>,
        model_name: impl Into<String>,
    ) -> ModelAdminBuilder {
        ModelAdminBuilder::new(app_label, model_name)
    }

    /// Returns the application label.
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the singular verbose name.
    pub fn verbose_name(&self) -> &str {
        &self.verbose_name
    }

    /// Returns the plural verbose name.
    pub fn verbose_name_plural(&self) -> &str {
        &self.verbose_name_plural
    }

    /// Returns the model key in `"app_label.model_name"` format.
    pub fn model_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Returns the model kind.
    pub const fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Returns whether this admin manages tree-structured content.
    pub fn is_page_model(&self) -> bool {
        self.kind == ModelKind::Page
    }

    /// Returns whether the inspect view is enabled for this model.
    pub const fn inspect_view_enabled(&self) -> bool {
        self.inspect_view_enabled
    }

    /// Returns the configured base URL path override, if any.
    pub fn base_url_path_override(&self) -> Option<&str> {
        self.base_url_path.as_deref()
    }

    /// Returns the action registry.
    pub const fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Returns the action registered under `codename`, if any.
    pub fn get_action(&self, codename: &str) -> Option<&ModelAdminAction> {
        self.actions.get(codename)
    }

    /// Returns the content types allowed as parent locations for this page
    /// model.
    pub fn allowed_parent_page_types(&self) -> &[String] {
        &self.allowed_parent_page_types
    }

    /// Returns the permission registry this admin checks against.
    pub fn permission_registry(&self) -> &PermissionRegistry {
        &self.permission_registry
    }

    /// Returns the configured page tree, if any.
    pub fn page_tree(&self) -> Option<&dyn PageTree> {
        self.page_tree.as_deref()
    }

    pub(crate) fn permission_rule(&self, codename: &str) -> Option<&PermissionRule> {
        self.permission_rules.get(codename)
    }

    pub(crate) fn button_kwargs_override(&self, codename: &str) -> Option<&ButtonKwargsProvider> {
        self.button_kwargs_overrides.get(codename)
    }

    /// Whether a custom inspect permission record exists for this model.
    /// Computed once per admin; the registry is immutable after build.
    pub(crate) fn inspect_permission_exists(&self) -> bool {
        *self.inspect_permission_cache.get_or_init(|| {
            self.permission_registry.exists(
                &self.app_label,
                &self.model_name,
                &perm_codename_for("inspect", &self.model_name),
            )
        })
    }

    /// The ordered button entries for the index view, with the configured
    /// list taking precedence over the per-kind default.
    pub fn index_view_button_names(&self) -> Vec<ButtonSpec> {
        if let Some(names) = &self.index_view_button_names {
            return names.clone();
        }
        match self.kind {
            ModelKind::Flat => vec![
                ButtonSpec::action("inspect"),
                ButtonSpec::action("edit"),
                ButtonSpec::action("delete"),
            ],
            ModelKind::Page => vec![
                ButtonSpec::action("inspect"),
                ButtonSpec::action("edit"),
                ButtonSpec::action("view_live"),
                ButtonSpec::dropdown(
                    "More",
                    vec![
                        ButtonSpec::action("copy"),
                        ButtonSpec::action("delete"),
                        ButtonSpec::action("unpublish"),
                    ],
                ),
            ],
        }
    }

    /// The ordered button codenames for the inspect view. Only a flat list
    /// is supported here.
    pub fn inspect_view_button_names(&self) -> Vec<String> {
        if let Some(names) = &self.inspect_view_button_names {
            return names.clone();
        }
        let names: &[&str] = match self.kind {
            ModelKind::Flat => &["edit", "delete"],
            ModelKind::Page => &["edit", "copy", "delete", "unpublish"],
        };
        names.iter().map(ToString::to_string).collect()
    }

    fn template_context(
        &self,
        action: &ModelAdminAction,
        obj: Option<&dyn AdminRecord>,
    ) -> TemplateContext {
        TemplateContext {
            action_name: action.verbose_name.clone(),
            model_name_singular: self.verbose_name.clone(),
            model_name_plural: self.verbose_name_plural.clone(),
            object_repr: obj.map(|o| o.repr()).unwrap_or_default(),
        }
    }

    /// The label text for buttons with action `codename`, or `None` when no
    /// such action is registered.
    pub fn button_label_for_action(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> Option<String> {
        let action = self.get_action(codename)?;
        let ctx = self.template_context(action, obj);
        if let Some(label) = action.button_label_for(&ctx) {
            return Some(label);
        }
        if codename == "create" {
            return Some(format!("Add {}", self.verbose_name));
        }
        Some(capitalize_first(&action.verbose_name))
    }

    /// The title text for buttons with action `codename`, or `None` when no
    /// such action is registered.
    pub fn button_title_for_action(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> Option<String> {
        let action = self.get_action(codename)?;
        let ctx = self.template_context(action, obj);
        if let Some(title) = action.button_title_for(&ctx) {
            return Some(title);
        }
        let repr = &ctx.object_repr;
        let title = match codename {
            "create" => format!("Create a new {}", self.verbose_name),
            "view_draft" => format!("Preview draft version of '{repr}'"),
            "view_live" => format!("View live version of '{repr}'"),
            "revisions_index" => format!("View revision history for '{repr}'"),
            "add_subpage" => format!("Add child page to '{repr}'"),
            _ => format!(
                "{} {} '{repr}'",
                capitalize_first(&action.verbose_name),
                self.verbose_name
            ),
        };
        Some(title)
    }

    /// The URL for buttons with action `codename`, or `None` when no such
    /// action is registered.
    pub fn button_url_for_action(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> Option<String> {
        let action = self.get_action(codename)?;
        let ctx = self.template_context(action, obj);
        if let Some(url) = action.button_url_for(&ctx) {
            return Some(url);
        }
        Some(self.url_helper().action_url(codename, obj, &[]))
    }

    /// The CSS classes for buttons with action `codename`: the admin-wide
    /// defaults, the create/delete specials, and the action's extras.
    pub fn button_css_classes_for_action(&self, codename: &str) -> BTreeSet<String> {
        let mut classes: BTreeSet<String> =
            self.default_button_css_classes.iter().cloned().collect();
        match codename {
            "create" => classes.extend(self.create_button_css_classes.iter().cloned()),
            "delete" => classes.extend(self.delete_button_css_classes.iter().cloned()),
            _ => {}
        }
        if let Some(action) = self.get_action(codename) {
            classes.extend(action.button_extra_css_classes.iter().cloned());
        }
        classes
    }

    /// The permission codename gating action `codename`, if any.
    pub fn permission_required_for_action(&self, codename: &str) -> Option<&str> {
        self.get_action(codename)?.permission_required.as_deref()
    }

    /// Candidate template names for rendering action `codename`, most
    /// specific first.
    pub fn get_templates(&self, codename: &str) -> Vec<String> {
        if let Some(name) = self
            .get_action(codename)
            .and_then(|action| action.template_name.clone())
        {
            return vec![name];
        }
        vec![
            format!(
                "modeladmin/{}/{}/{codename}.html",
                self.app_label, self.model_name
            ),
            format!("modeladmin/{}/{codename}.html", self.app_label),
            format!("modeladmin/{codename}.html"),
        ]
    }

    /// Creates the permission helper for this admin.
    pub const fn permission_helper(&self) -> PermissionHelper<'_> {
        PermissionHelper::new(self)
    }

    /// Creates the URL helper for this admin.
    pub const fn url_helper(&self) -> UrlHelper<'_> {
        UrlHelper::new(self)
    }

    /// Creates a button helper for one request's user.
    pub const fn button_helper<'a>(&'a self, user: &'a AdminUser) -> ButtonHelper<'a> {
        ButtonHelper::new(self, user)
    }

    /// Convenience for `permission_helper().user_can(...)`.
    pub fn user_can(
        &self,
        user: &AdminUser,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> bool {
        self.permission_helper().user_can(user, codename, obj)
    }

    /// The route registrations this admin hands to the host router, one per
    /// action requiring a distinct route.
    pub fn url_registrations(&self) -> Vec<UrlRegistration> {
        let url_helper = self.url_helper();
        self.actions
            .for_url_registration()
            .map(|action| UrlRegistration {
                pattern: url_helper.action_url_pattern(action),
                name: url_helper.action_url_name(&action.codename),
                codename: action.codename.clone(),
            })
            .collect()
    }
}

impl fmt::Debug for ModelAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdmin")
            .field("model_key", &self.model_key())
            .field("kind", &self.kind)
            .field("inspect_view_enabled", &self.inspect_view_enabled)
            .field("actions", &self.actions.codenames())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ModelAdmin`]. All configuration mistakes surface from
/// [`ModelAdminBuilder::build`] as `ImproperlyConfigured`.
pub struct ModelAdminBuilder {
    app_label: String,
    model_name: String,
    verbose_name: Option<String>,
    verbose_name_plural: Option<String>,
    kind: ModelKind,
    inspect_view_enabled: bool,
    base_url_path: Option<String>,
    default_button_css_classes: Vec<String>,
    create_button_css_classes: Vec<String>,
    delete_button_css_classes: Vec<String>,
    index_view_button_names: Option<Vec<ButtonSpec>>,
    inspect_view_button_names: Option<Vec<String>>,
    allowed_parent_page_types: Vec<String>,
    model_actions: Option<Vec<ModelAdminAction>>,
    extra_model_actions: Vec<ModelAdminAction>,
    button_label_overrides: Vec<(String, String)>,
    button_title_overrides: Vec<(String, String)>,
    button_url_overrides: Vec<(String, String)>,
    view_overrides: Vec<(String, Arc<dyn ActionView>)>,
    permission_rules: HashMap<String, PermissionRule>,
    button_kwargs_overrides: HashMap<String, ButtonKwargsProvider>,
    permission_registry: Option<Arc<PermissionRegistry>>,
    page_tree: Option<Arc<dyn PageTree>>,
}

impl ModelAdminBuilder {
    fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
            verbose_name: None,
            verbose_name_plural: None,
            kind: ModelKind::Flat,
            inspect_view_enabled: false,
            base_url_path: None,
            default_button_css_classes: vec!["button".to_string()],
            create_button_css_classes: vec![
                "bicolor".to_string(),
                "icon".to_string(),
                "icon-plus".to_string(),
            ],
            delete_button_css_classes: vec!["no".to_string()],
            index_view_button_names: None,
            inspect_view_button_names: None,
            allowed_parent_page_types: Vec::new(),
            model_actions: None,
            extra_model_actions: Vec::new(),
            button_label_overrides: Vec::new(),
            button_title_overrides: Vec::new(),
            button_url_overrides: Vec::new(),
            view_overrides: Vec::new(),
            permission_rules: HashMap::new(),
            button_kwargs_overrides: HashMap::new(),
            permission_registry: None,
            page_tree: None,
        }
    }

    /// Sets the singular verbose name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = Some(name.into());
        self
    }

    /// Sets the plural verbose name.
    #[must_use]
    pub fn verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = Some(name.into());
        self
    }

    /// Marks the model as tree-structured content. Requires a page tree to
    /// be configured before `build()`.
    #[must_use]
    pub const fn page_model(mut self) -> Self {
        self.kind = ModelKind::Page;
        self
    }

    /// Enables or disables the inspect view.
    #[must_use]
    pub const fn inspect_view_enabled(mut self, enabled: bool) -> Self {
        self.inspect_view_enabled = enabled;
        self
    }

    /// Overrides the base URL path (default `/admin/<app>/<model>/`).
    #[must_use]
    pub fn base_url_path(mut self, path: impl Into<String>) -> Self {
        self.base_url_path = Some(path.into());
        self
    }

    /// Sets the CSS classes every button starts from.
    #[must_use]
    pub fn default_button_css_classes(mut self, classes: Vec<&str>) -> Self {
        self.default_button_css_classes = classes.into_iter().map(String::from).collect();
        self
    }

    /// Sets the extra CSS classes for the create button.
    #[must_use]
    pub fn create_button_css_classes(mut self, classes: Vec<&str>) -> Self {
        self.create_button_css_classes = classes.into_iter().map(String::from).collect();
        self
    }

    /// Sets the extra CSS classes for the delete button.
    #[must_use]
    pub fn delete_button_css_classes(mut self, classes: Vec<&str>) -> Self {
        self.delete_button_css_classes = classes.into_iter().map(String::from).collect();
        self
    }

    /// Sets the ordered button entries for the index view.
    #[must_use]
    pub fn index_view_button_names(mut self, names: Vec<ButtonSpec>) -> Self {
        self.index_view_button_names = Some(names);
        self
    }

    /// Sets the ordered button codenames for the inspect view.
    #[must_use]
    pub fn inspect_view_button_names(mut self, names: Vec<&str>) -> Self {
        self.inspect_view_button_names =
            Some(names.into_iter().map(String::from).collect());
        self
    }

    /// Sets the content types allowed as parent locations (page models).
    #[must_use]
    pub fn allowed_parent_page_types(mut self, types: Vec<&str>) -> Self {
        self.allowed_parent_page_types = types.into_iter().map(String::from).collect();
        self
    }

    /// Replaces the default action table entirely.
    #[must_use]
    pub fn model_actions(mut self, actions: Vec<ModelAdminAction>) -> Self {
        self.model_actions = Some(actions);
        self
    }

    /// Adds actions on top of the default table. An extra whose codename
    /// matches a default replaces that default.
    #[must_use]
    pub fn extra_model_actions(mut self, actions: Vec<ModelAdminAction>) -> Self {
        self.extra_model_actions.extend(actions);
        self
    }

    /// Adds a single action on top of the default table.
    #[must_use]
    pub fn custom_model_action(mut self, action: ModelAdminAction) -> Self {
        self.extra_model_actions.push(action);
        self
    }

    /// Overrides the button label template for one action.
    #[must_use]
    pub fn button_label(
        mut self,
        codename: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.button_label_overrides
            .push((codename.into(), template.into()));
        self
    }

    /// Overrides the button title template for one action.
    #[must_use]
    pub fn button_title(
        mut self,
        codename: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.button_title_overrides
            .push((codename.into(), template.into()));
        self
    }

    /// Overrides the button URL template for one action.
    #[must_use]
    pub fn button_url(
        mut self,
        codename: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.button_url_overrides
            .push((codename.into(), template.into()));
        self
    }

    /// Binds a view to one action's route.
    #[must_use]
    pub fn view(mut self, codename: impl Into<String>, view: Arc<dyn ActionView>) -> Self {
        self.view_overrides.push((codename.into(), view));
        self
    }

    /// Registers a permission rule consulted before the generic check for
    /// one action.
    #[must_use]
    pub fn permission_rule(mut self, codename: impl Into<String>, rule: PermissionRule) -> Self {
        self.permission_rules.insert(codename.into(), rule);
        self
    }

    /// Registers a button kwargs provider overriding synthesis for one
    /// action.
    #[must_use]
    pub fn button_kwargs(
        mut self,
        codename: impl Into<String>,
        provider: ButtonKwargsProvider,
    ) -> Self {
        self.button_kwargs_overrides
            .insert(codename.into(), provider);
        self
    }

    /// Sets the permission registry. Defaults to the model's generated
    /// add/change/delete/view records.
    #[must_use]
    pub fn permission_registry(mut self, registry: Arc<PermissionRegistry>) -> Self {
        self.permission_registry = Some(registry);
        self
    }

    /// Sets the page tree backing tree-structured permission checks.
    #[must_use]
    pub fn page_tree(mut self, tree: Arc<dyn PageTree>) -> Self {
        self.page_tree = Some(tree);
        self
    }

    /// Builds the admin, surfacing every configuration error.
    pub fn build(self) -> AdminResult<ModelAdmin> {
        let model_key = format!("{}.{}", self.app_label, self.model_name);
        let verbose_name = self
            .verbose_name
            .unwrap_or_else(|| self.model_name.replace('_', " "));
        let verbose_name_plural = self
            .verbose_name_plural
            .unwrap_or_else(|| format!("{verbose_name}s"));

        let mut actions = if let Some(table) = self.model_actions {
            ActionRegistry::from_table(table, &model_key)?
        } else {
            let defaults = match self.kind {
                ModelKind::Flat => default_model_actions(),
                ModelKind::Page => default_page_model_actions(),
            };
            ActionRegistry::merged(defaults, self.extra_model_actions, &model_key)?
        };

        for (codename, template) in self.button_label_overrides {
            let action = actions
                .get_mut(&codename)
                .ok_or_else(|| unknown_override_error(&codename, "button label", &model_key))?;
            action.button_label = Some(template);
        }
        for (codename, template) in self.button_title_overrides {
            let action = actions
                .get_mut(&codename)
                .ok_or_else(|| unknown_override_error(&codename, "button title", &model_key))?;
            action.button_title = Some(template);
        }
        for (codename, template) in self.button_url_overrides {
            let action = actions
                .get_mut(&codename)
                .ok_or_else(|| unknown_override_error(&codename, "button url", &model_key))?;
            action.button_url = Some(template);
        }
        for (codename, view) in self.view_overrides {
            let action = actions
                .get_mut(&codename)
                .ok_or_else(|| unknown_override_error(&codename, "view", &model_key))?;
            action.view = Some(view);
        }
        for codename in self.permission_rules.keys() {
            if !actions.contains(codename) {
                return Err(unknown_override_error(codename, "permission rule", &model_key));
            }
        }
        for codename in self.button_kwargs_overrides.keys() {
            if !actions.contains(codename) {
                return Err(unknown_override_error(codename, "button kwargs", &model_key));
            }
        }
        if let Some(specs) = &self.index_view_button_names {
            validate_button_specs(specs, &actions, &model_key)?;
        }
        if let Some(names) = &self.inspect_view_button_names {
            for codename in names {
                if !actions.contains(codename) {
                    return Err(unknown_button_name_error(codename, &model_key));
                }
            }
        }
        if self.kind == ModelKind::Page && self.page_tree.is_none() {
            return Err(AdminError::ImproperlyConfigured(format!(
                "'{model_key}' is registered as a page model but no page tree is configured"
            )));
        }

        let permission_registry = self.permission_registry.unwrap_or_else(|| {
            Arc::new(PermissionRegistry::with_default_model_permissions(
                &self.app_label,
                &self.model_name,
            ))
        });

        Ok(ModelAdmin {
            app_label: self.app_label,
            model_name: self.model_name,
            verbose_name,
            verbose_name_plural,
            kind: self.kind,
            inspect_view_enabled: self.inspect_view_enabled,
            base_url_path: self.base_url_path,
            default_button_css_classes: self.default_button_css_classes,
            create_button_css_classes: self.create_button_css_classes,
            delete_button_css_classes: self.delete_button_css_classes,
            index_view_button_names: self.index_view_button_names,
            inspect_view_button_names: self.inspect_view_button_names,
            allowed_parent_page_types: self.allowed_parent_page_types,
            actions,
            permission_rules: self.permission_rules,
            button_kwargs_overrides: self.button_kwargs_overrides,
            permission_registry,
            page_tree: self.page_tree,
            inspect_permission_cache: OnceLock::new(),
        })
    }
}

fn validate_button_specs(
    specs: &[ButtonSpec],
    actions: &ActionRegistry,
    model_key: &str,
) -> AdminResult<()> {
    for spec in specs {
        match spec {
            ButtonSpec::Action(codename) => {
                if !actions.contains(codename) {
                    return Err(unknown_button_name_error(codename, model_key));
                }
            }
            ButtonSpec::Dropdown { items, .. } => {
                validate_button_specs(items, actions, model_key)?;
            }
        }
    }
    Ok(())
}

fn unknown_override_error(codename: &str, what: &str, owner: &str) -> AdminError {
    AdminError::ImproperlyConfigured(format!(
        "A {what} override names the codename '{codename}' but no such action is \
         registered on '{owner}'"
    ))
}

fn unknown_button_name_error(codename: &str, owner: &str) -> AdminError {
    AdminError::ImproperlyConfigured(format!(
        "The button name list for '{owner}' includes '{codename}' but no such action \
         is registered"
    ))
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
