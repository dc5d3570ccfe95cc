//! Button construction.
//!
//! [`ButtonHelper`] turns an action (plus an optional object) into a
//! renderable [`Button`], or nothing. Per codename the helper resolves, in
//! order: a registered [`ButtonKwargsProvider`] override, the built-in
//! suppression rules for the inspect/publishing buttons, and finally
//! synthesis from the action's own label/title/url/permission/classes.
//! Every resolved parameter set then passes the permission gate — a denied
//! permission suppresses the button entirely rather than rendering it
//! disabled.

use std::fmt;

use modeladmin_auth::AdminUser;

use crate::options::ModelAdmin;
use crate::records::AdminRecord;
use crate::widgets::{Button, ButtonKwargs, ButtonSpec};

/// The title text for dropdown buttons with no object in play.
pub const DROPDOWN_BUTTON_TITLE: &str = "View more options";

/// A declared override for one action's button parameters.
///
/// The callback shape is chosen by configuration from this closed set —
/// never discovered by trial invocation — so an arity mismatch between the
/// helper and a developer-supplied override cannot arise. Returning `None`
/// from a callback suppresses the button.
pub enum ButtonKwargsProvider {
    /// A literal parameter set.
    Value(ButtonKwargs),
    /// A callback needing no request data.
    Plain(Box<dyn Fn() -> Option<ButtonKwargs> + Send + Sync>),
    /// A callback consulting the current user.
    ForUser(Box<dyn Fn(&AdminUser) -> Option<ButtonKwargs> + Send + Sync>),
    /// A callback consulting the current user and the object, if any.
    #[allow(clippy::type_complexity)]
    ForUserAndObject(
        Box<dyn Fn(&AdminUser, Option<&dyn AdminRecord>) -> Option<ButtonKwargs> + Send + Sync>,
    ),
}

impl ButtonKwargsProvider {
    /// Creates a literal override.
    pub const fn value(kwargs: ButtonKwargs) -> Self {
        Self::Value(kwargs)
    }

    /// Creates an override from a no-argument callback.
    pub fn plain(callback: impl Fn() -> Option<ButtonKwargs> + Send + Sync + 'static) -> Self {
        Self::Plain(Box::new(callback))
    }

    /// Creates an override from a user-consulting callback.
    pub fn for_user(
        callback: impl Fn(&AdminUser) -> Option<ButtonKwargs> + Send + Sync + 'static,
    ) -> Self {
        Self::ForUser(Box::new(callback))
    }

    /// Creates an override from a callback consulting user and object.
    pub fn for_user_and_object(
        callback: impl Fn(&AdminUser, Option<&dyn AdminRecord>) -> Option<ButtonKwargs>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::ForUserAndObject(Box::new(callback))
    }

    fn resolve(&self, user: &AdminUser, obj: Option<&dyn AdminRecord>) -> Option<ButtonKwargs> {
        match self {
            Self::Value(kwargs) => Some(kwargs.clone()),
            Self::Plain(callback) => callback(),
            Self::ForUser(callback) => callback(user),
            Self::ForUserAndObject(callback) => callback(user, obj),
        }
    }
}

impl fmt::Debug for ButtonKwargsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Self::Value(_) => "Value",
            Self::Plain(_) => "Plain",
            Self::ForUser(_) => "ForUser",
            Self::ForUserAndObject(_) => "ForUserAndObject",
        };
        write!(f, "ButtonKwargsProvider::{shape}")
    }
}

/// Builds buttons for one request's user against one model admin.
pub struct ButtonHelper<'a> {
    admin: &'a ModelAdmin,
    user: &'a AdminUser,
}

impl<'a> ButtonHelper<'a> {
    pub(crate) const fn new(admin: &'a ModelAdmin, user: &'a AdminUser) -> Self {
        Self { admin, user }
    }

    /// Returns a button for action `codename`, potentially for a specific
    /// object, or `None` when the button should not be rendered.
    pub fn button_for(&self, codename: &str, obj: Option<&dyn AdminRecord>) -> Option<Button> {
        self.button_for_with_classes(codename, obj, &[], &[])
    }

    /// Like [`ButtonHelper::button_for`], with extra CSS classes added or
    /// removed atop the button's base classes.
    pub fn button_for_with_classes(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
        classes_add: &[&str],
        classes_remove: &[&str],
    ) -> Option<Button> {
        let kwargs = self.kwargs_for_action(codename, obj)?;
        self.gate_and_build(kwargs, obj, classes_add, classes_remove)
    }

    /// Resolves the parameter set for action `codename`, or `None` when
    /// the button should be suppressed before the permission gate.
    fn kwargs_for_action(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> Option<ButtonKwargs> {
        if let Some(provider) = self.admin.button_kwargs_override(codename) {
            return provider.resolve(self.user, obj);
        }
        match codename {
            "inspect" if !self.admin.inspect_view_enabled() => return None,
            "unpublish" | "view_live" if !obj.is_some_and(|o| o.is_live()) => return None,
            "view_draft" if !obj.is_some_and(|o| o.has_unpublished_changes()) => return None,
            _ => {}
        }
        if codename == "view_live" {
            return self.view_live_kwargs(obj);
        }
        self.build_kwargs(codename, obj)
    }

    /// Synthesizes the parameter set from the action's resolved values.
    fn build_kwargs(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> Option<ButtonKwargs> {
        let Some(action) = self.admin.get_action(codename) else {
            tracing::warn!(
                "No action with codename '{codename}' is registered on '{}'; \
                 no button will be rendered",
                self.admin.model_key()
            );
            return None;
        };
        let mut kwargs = ButtonKwargs::new(
            self.admin.button_url_for_action(codename, obj)?,
            self.admin.button_label_for_action(codename, obj)?,
        );
        kwargs.title = self.admin.button_title_for_action(codename, obj);
        kwargs.classes = self.admin.button_css_classes_for_action(codename);
        kwargs.permission_required = action.permission_required.clone();
        Some(kwargs)
    }

    /// The live-view button links straight to the published URL in a new
    /// tab and carries no permission gate.
    fn view_live_kwargs(&self, obj: Option<&dyn AdminRecord>) -> Option<ButtonKwargs> {
        let obj = obj?;
        let url = obj.live_url()?;
        let mut kwargs = ButtonKwargs::new(
            url,
            self.admin.button_label_for_action("view_live", Some(obj))?,
        )
        .attr("target", "_blank");
        kwargs.title = self.admin.button_title_for_action("view_live", Some(obj));
        kwargs.classes = self.admin.button_css_classes_for_action("view_live");
        Some(kwargs)
    }

    /// Applies the permission gate, then builds the button.
    fn gate_and_build(
        &self,
        mut kwargs: ButtonKwargs,
        obj: Option<&dyn AdminRecord>,
        classes_add: &[&str],
        classes_remove: &[&str],
    ) -> Option<Button> {
        if let Some(required) = kwargs.permission_required.take() {
            if !self
                .admin
                .permission_helper()
                .user_can(self.user, &required, obj)
            {
                return None;
            }
        }
        let mut button = kwargs.into_button();
        button.modify_classes(classes_add, classes_remove);
        Some(button)
    }

    fn dropdown_button(
        &self,
        label: &str,
        obj: Option<&dyn AdminRecord>,
        items: &[ButtonSpec],
    ) -> Option<Button> {
        let children: Vec<Button> = self.button_set_for(obj, items).collect();
        if children.is_empty() {
            return None;
        }
        let title = obj.map_or_else(
            || DROPDOWN_BUTTON_TITLE.to_string(),
            |o| format!("View more options for '{}'", o.repr()),
        );
        Some(Button::dropdown(label, title, children))
    }

    /// Resolves an ordered button list lazily.
    ///
    /// The returned iterator is finite and not restartable: each yielded
    /// element is a fresh render decision, and suppressed buttons (failed
    /// permission gates, empty dropdowns, `None` overrides) are skipped.
    pub fn button_set_for<'h>(
        &'h self,
        obj: Option<&'h dyn AdminRecord>,
        specs: &'h [ButtonSpec],
    ) -> ButtonSet<'h> {
        self.button_set_with_classes(obj, specs, &[], &[])
    }

    /// Like [`ButtonHelper::button_set_for`], with CSS class modifications
    /// applied to every resolved action button.
    pub fn button_set_with_classes<'h>(
        &'h self,
        obj: Option<&'h dyn AdminRecord>,
        specs: &'h [ButtonSpec],
        classes_add: &'h [&'h str],
        classes_remove: &'h [&'h str],
    ) -> ButtonSet<'h> {
        ButtonSet {
            helper: self,
            obj,
            specs: specs.iter(),
            classes_add,
            classes_remove,
        }
    }
}

/// A lazy, finite, non-restartable sequence of resolved buttons.
pub struct ButtonSet<'h> {
    helper: &'h ButtonHelper<'h>,
    obj: Option<&'h dyn AdminRecord>,
    specs: std::slice::Iter<'h, ButtonSpec>,
    classes_add: &'h [&'h str],
    classes_remove: &'h [&'h str],
}

impl Iterator for ButtonSet<'_> {
    type Item = Button;

    fn next(&mut self) -> Option<Button> {
        loop {
            let spec = self.specs.next()?;
            let resolved = match spec {
                ButtonSpec::Action(codename) => self.helper.button_for_with_classes(
                    codename,
                    self.obj,
                    self.classes_add,
                    self.classes_remove,
                ),
                ButtonSpec::Dropdown { label, items } => {
                    self.helper.dropdown_button(label, self.obj, items)
                }
            };
            if let Some(button) = resolved {
                return Some(button);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use modeladmin_auth::{ObjectPermissionTester, StaticPermissionTester};

    use crate::actions::ModelAdminAction;
    use crate::pages::InMemoryPageTree;

    struct Article {
        id: u64,
        title: String,
    }

    impl AdminRecord for Article {
        fn pk(&self) -> String {
            self.id.to_string()
        }

        fn repr(&self) -> String {
            self.title.clone()
        }
    }

    struct EventPage {
        id: String,
        live: bool,
        draft_changes: bool,
        allowed: Vec<&'static str>,
    }

    impl AdminRecord for EventPage {
        fn pk(&self) -> String {
            self.id.clone()
        }

        fn repr(&self) -> String {
            self.id.clone()
        }

        fn is_live(&self) -> bool {
            self.live
        }

        fn has_unpublished_changes(&self) -> bool {
            self.draft_changes
        }

        fn live_url(&self) -> Option<String> {
            self.live.then(|| format!("/events/{}/", self.id))
        }

        fn permission_tester(
            &self,
            _user: &AdminUser,
        ) -> Option<Box<dyn ObjectPermissionTester>> {
            let mut tester = StaticPermissionTester::new();
            for codename in &self.allowed {
                tester = tester.allow(*codename);
            }
            Some(Box::new(tester))
        }
    }

    fn article() -> Article {
        Article {
            id: 1,
            title: "First Post".to_string(),
        }
    }

    fn article_admin() -> ModelAdmin {
        ModelAdmin::builder("blog", "article").build().unwrap()
    }

    fn page_admin() -> ModelAdmin {
        ModelAdmin::builder("events", "event_page")
            .page_model()
            .page_tree(Arc::new(InMemoryPageTree::new()))
            .build()
            .unwrap()
    }

    fn editor() -> AdminUser {
        AdminUser::new("vi").with_permissions(vec![
            "blog.change_article",
            "blog.delete_article",
            "blog.add_article",
        ])
    }

    // ── Synthesis and gating ────────────────────────────────────────

    #[test]
    fn test_button_for_synthesizes_from_action() {
        let admin = article_admin();
        let user = editor();
        let obj = article();
        let button = admin
            .button_helper(&user)
            .button_for("edit", Some(&obj))
            .unwrap();
        assert_eq!(button.url, "/admin/blog/article/edit/1/");
        assert_eq!(button.label, "Edit");
        assert_eq!(button.title(), Some("Edit article 'First Post'"));
        assert!(button.classes.contains("button"));
    }

    #[test]
    fn test_button_for_denied_permission_suppresses() {
        let admin = article_admin();
        let user = AdminUser::new("kim").with_permissions(vec!["blog.view_article"]);
        let obj = article();
        assert!(admin.button_helper(&user).button_for("edit", Some(&obj)).is_none());
    }

    #[test]
    fn test_button_for_unknown_codename_warns_and_skips() {
        let admin = article_admin();
        let user = editor();
        assert!(admin.button_helper(&user).button_for("publish", None).is_none());
    }

    #[test]
    fn test_class_modification() {
        let admin = article_admin();
        let user = editor();
        let obj = article();
        let button = admin
            .button_helper(&user)
            .button_for_with_classes("delete", Some(&obj), &["serious"], &["no"])
            .unwrap();
        assert!(button.classes.contains("serious"));
        assert!(!button.classes.contains("no"));
        assert!(button.classes.contains("button"));
    }

    // ── Built-in suppression rules ──────────────────────────────────

    #[test]
    fn test_inspect_suppressed_when_disabled() {
        let admin = article_admin();
        let superuser = AdminUser::superuser("root");
        let obj = article();
        assert!(admin
            .button_helper(&superuser)
            .button_for("inspect", Some(&obj))
            .is_none());
    }

    #[test]
    fn test_inspect_rendered_when_enabled() {
        let admin = ModelAdmin::builder("blog", "article")
            .inspect_view_enabled(true)
            .build()
            .unwrap();
        let user = editor();
        let obj = article();
        let button = admin
            .button_helper(&user)
            .button_for("inspect", Some(&obj))
            .unwrap();
        assert_eq!(button.url, "/admin/blog/article/inspect/1/");
    }

    #[test]
    fn test_unpublish_suppressed_for_unpublished_page() {
        let admin = page_admin();
        let superuser = AdminUser::superuser("root");
        let page = EventPage {
            id: "launch".to_string(),
            live: false,
            draft_changes: true,
            allowed: vec!["unpublish"],
        };
        assert!(admin
            .button_helper(&superuser)
            .button_for("unpublish", Some(&page))
            .is_none());
    }

    #[test]
    fn test_unpublish_rendered_for_live_page_with_permission() {
        let admin = page_admin();
        let user = AdminUser::new("sam");
        let page = EventPage {
            id: "launch".to_string(),
            live: true,
            draft_changes: false,
            allowed: vec!["unpublish"],
        };
        let button = admin
            .button_helper(&user)
            .button_for("unpublish", Some(&page))
            .unwrap();
        assert!(button.url.starts_with("/admin/pages/launch/unpublish/"));
    }

    #[test]
    fn test_unpublish_suppressed_without_permission() {
        let admin = page_admin();
        let user = AdminUser::new("sam");
        let page = EventPage {
            id: "launch".to_string(),
            live: true,
            draft_changes: false,
            allowed: vec!["edit"],
        };
        assert!(admin
            .button_helper(&user)
            .button_for("unpublish", Some(&page))
            .is_none());
    }

    #[test]
    fn test_view_draft_gated_by_draft_changes() {
        let admin = page_admin();
        let user = AdminUser::new("sam");
        let with_draft = EventPage {
            id: "launch".to_string(),
            live: true,
            draft_changes: true,
            allowed: vec![],
        };
        let without_draft = EventPage {
            id: "launch".to_string(),
            live: true,
            draft_changes: false,
            allowed: vec![],
        };
        let helper = admin.button_helper(&user);
        assert!(helper.button_for("view_draft", Some(&with_draft)).is_some());
        assert!(helper.button_for("view_draft", Some(&without_draft)).is_none());
    }

    #[test]
    fn test_view_live_links_to_live_url_in_new_tab() {
        let admin = page_admin();
        let user = AdminUser::new("sam");
        let page = EventPage {
            id: "launch".to_string(),
            live: true,
            draft_changes: false,
            allowed: vec![],
        };
        let button = admin
            .button_helper(&user)
            .button_for("view_live", Some(&page))
            .unwrap();
        assert_eq!(button.url, "/events/launch/");
        assert_eq!(button.attrs.get("target").map(String::as_str), Some("_blank"));
        assert_eq!(button.title(), Some("View live version of 'launch'"));
    }

    // ── Overrides ───────────────────────────────────────────────────

    #[test]
    fn test_value_override_replaces_synthesis() {
        let admin = ModelAdmin::builder("blog", "article")
            .button_kwargs(
                "edit",
                ButtonKwargsProvider::value(ButtonKwargs::new("/elsewhere/", "Go")),
            )
            .build()
            .unwrap();
        let user = AdminUser::new("anyone");
        let button = admin.button_helper(&user).button_for("edit", None).unwrap();
        assert_eq!(button.url, "/elsewhere/");
        assert_eq!(button.label, "Go");
    }

    #[test]
    fn test_callback_override_can_suppress() {
        let admin = ModelAdmin::builder("blog", "article")
            .button_kwargs(
                "delete",
                ButtonKwargsProvider::for_user_and_object(|_, obj| {
                    obj.filter(|o| o.pk() != "1")
                        .map(|o| ButtonKwargs::new(format!("/bin/{}/", o.pk()), "Bin"))
                }),
            )
            .build()
            .unwrap();
        let user = editor();
        let helper = admin.button_helper(&user);
        let protected = article();
        let other = Article {
            id: 2,
            title: "Second".to_string(),
        };
        assert!(helper.button_for("delete", Some(&protected)).is_none());
        let button = helper.button_for("delete", Some(&other)).unwrap();
        assert_eq!(button.url, "/bin/2/");
    }

    #[test]
    fn test_override_result_still_permission_gated() {
        let admin = ModelAdmin::builder("blog", "article")
            .button_kwargs(
                "delete",
                ButtonKwargsProvider::value(
                    ButtonKwargs::new("/bin/", "Bin").permission_required("delete"),
                ),
            )
            .build()
            .unwrap();
        let holder = editor();
        let stranger = AdminUser::new("kim");
        assert!(admin.button_helper(&holder).button_for("delete", None).is_some());
        assert!(admin.button_helper(&stranger).button_for("delete", None).is_none());
    }

    // ── Button sets ─────────────────────────────────────────────────

    #[test]
    fn test_button_set_preserves_order_and_skips_denied() {
        let admin = article_admin();
        let obj = article();
        let specs = vec![ButtonSpec::action("edit"), ButtonSpec::action("delete")];

        let full = editor();
        let helper = admin.button_helper(&full);
        let labels: Vec<String> = helper
            .button_set_for(Some(&obj), &specs)
            .map(|b| b.label)
            .collect();
        assert_eq!(labels, vec!["Edit", "Delete"]);

        let partial = AdminUser::new("kim").with_permissions(vec!["blog.change_article"]);
        let helper = admin.button_helper(&partial);
        let labels: Vec<String> = helper
            .button_set_for(Some(&obj), &specs)
            .map(|b| b.label)
            .collect();
        assert_eq!(labels, vec!["Edit"]);
    }

    #[test]
    fn test_button_set_is_lazy() {
        let admin = article_admin();
        let user = editor();
        let obj = article();
        let specs = vec![ButtonSpec::action("edit"), ButtonSpec::action("delete")];
        let helper = admin.button_helper(&user);
        let mut set = helper.button_set_for(Some(&obj), &specs);
        assert_eq!(set.next().map(|b| b.label), Some("Edit".to_string()));
        assert_eq!(set.next().map(|b| b.label), Some("Delete".to_string()));
        assert!(set.next().is_none());
    }

    #[test]
    fn test_dropdown_resolves_children() {
        let admin = article_admin();
        let user = editor();
        let obj = article();
        let specs = vec![
            ButtonSpec::action("edit"),
            ButtonSpec::dropdown("More", vec![ButtonSpec::action("delete")]),
        ];
        let helper = admin.button_helper(&user);
        let buttons: Vec<Button> = helper.button_set_for(Some(&obj), &specs).collect();
        assert_eq!(buttons.len(), 2);
        let dropdown = &buttons[1];
        assert!(dropdown.is_dropdown());
        assert_eq!(dropdown.label, "More");
        assert_eq!(dropdown.title(), Some("View more options for 'First Post'"));
        assert_eq!(dropdown.items[0].label, "Delete");
    }

    #[test]
    fn test_empty_dropdown_is_suppressed() {
        let admin = article_admin();
        let user = AdminUser::new("kim");
        let obj = article();
        let specs = vec![ButtonSpec::dropdown("More", vec![ButtonSpec::action("delete")])];
        let helper = admin.button_helper(&user);
        assert_eq!(helper.button_set_for(Some(&obj), &specs).count(), 0);
    }

    #[test]
    fn test_nested_dropdowns_resolve_recursively() {
        let admin = article_admin();
        let user = editor();
        let obj = article();
        let specs = vec![ButtonSpec::dropdown(
            "More",
            vec![
                ButtonSpec::action("edit"),
                ButtonSpec::dropdown("Danger", vec![ButtonSpec::action("delete")]),
            ],
        )];
        let helper = admin.button_helper(&user);
        let buttons: Vec<Button> = helper.button_set_for(Some(&obj), &specs).collect();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].items.len(), 2);
        assert!(buttons[0].items[1].is_dropdown());
    }

    #[test]
    fn test_create_button_round_trip_with_action_values() {
        let admin = article_admin();
        let user = editor();
        let helper = admin.button_helper(&user);
        let button = helper.button_for("create", None).unwrap();
        assert_eq!(
            Some(button.label.clone()),
            admin.button_label_for_action("create", None)
        );
        assert_eq!(
            button.title().map(ToString::to_string),
            admin.button_title_for_action("create", None)
        );
        assert_eq!(
            Some(button.url.clone()),
            admin.button_url_for_action("create", None)
        );
        assert!(button.classes.contains("bicolor"));
    }
}
