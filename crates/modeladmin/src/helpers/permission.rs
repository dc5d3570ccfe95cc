//! Permission resolution.
//!
//! [`PermissionHelper::user_can`] decides whether a user may perform an
//! action, optionally against a specific object. Resolution order:
//!
//! 1. an object-specific [`PermissionRule`] registered for the action, when
//!    an object is given;
//! 2. a model-wide rule;
//! 3. the generic check for the model's kind — model-wide permission lookup
//!    for flat models, per-object tester delegation for page models.
//!
//! Missing permission records and missing tester capabilities are
//! configuration problems: they are logged as warnings and treated as
//! denials, never raised, so the page always renders.

use std::fmt;

use modeladmin_auth::{permissions, AdminUser};

use crate::options::{ModelAdmin, ModelKind};
use crate::records::AdminRecord;

/// An explicit permission override for one action, registered at build time
/// in place of the generic check.
pub enum PermissionRule {
    /// A rule consulted for model-wide checks (and for object checks when
    /// no object-specific rule exists).
    ModelWide(Box<dyn Fn(&AdminUser) -> bool + Send + Sync>),
    /// A rule consulted only when an object is given.
    ObjectSpecific(Box<dyn Fn(&AdminUser, &dyn AdminRecord) -> bool + Send + Sync>),
}

impl PermissionRule {
    /// Creates a model-wide rule.
    pub fn model_wide(check: impl Fn(&AdminUser) -> bool + Send + Sync + 'static) -> Self {
        Self::ModelWide(Box::new(check))
    }

    /// Creates an object-specific rule.
    pub fn object_specific(
        check: impl Fn(&AdminUser, &dyn AdminRecord) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::ObjectSpecific(Box::new(check))
    }
}

impl fmt::Debug for PermissionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelWide(_) => f.write_str("PermissionRule::ModelWide"),
            Self::ObjectSpecific(_) => f.write_str("PermissionRule::ObjectSpecific"),
        }
    }
}

/// Maps an action codename to the underlying permission codename for a
/// model, following the host framework's verbs: `edit` -> `change`,
/// `create` -> `add`, everything else verbatim.
pub fn perm_codename_for(codename: &str, model_name: &str) -> String {
    let term = match codename {
        "edit" => "change",
        "create" => "add",
        other => other,
    };
    format!("{term}_{model_name}")
}

/// Resolves permission decisions for one model admin.
pub struct PermissionHelper<'a> {
    admin: &'a ModelAdmin,
}

impl<'a> PermissionHelper<'a> {
    pub(crate) const fn new(admin: &'a ModelAdmin) -> Self {
        Self { admin }
    }

    /// Returns whether `user` may perform the action `codename`, optionally
    /// against `obj`.
    pub fn user_can(
        &self,
        user: &AdminUser,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> bool {
        match (self.admin.permission_rule(codename), obj) {
            (Some(PermissionRule::ObjectSpecific(check)), Some(obj)) => check(user, obj),
            (Some(PermissionRule::ModelWide(check)), _) => check(user),
            _ => self.builtin_check(user, codename, obj),
        }
    }

    fn builtin_check(
        &self,
        user: &AdminUser,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> bool {
        match codename {
            "list" => self.user_can_list(user),
            "create" => self.user_can_create(user),
            "inspect" => self.user_can_inspect(user, obj),
            "copy" if self.admin.is_page_model() => self.page_can_copy(user, obj),
            _ => self.generic_check(user, codename, obj),
        }
    }

    /// Returns whether `user` may access the list view at all.
    ///
    /// Flat models require any permission on the model; page models always
    /// allow the list view and filter affordances per object instead.
    pub fn user_can_list(&self, user: &AdminUser) -> bool {
        match self.admin.kind() {
            ModelKind::Flat => self.user_has_any_permission(user),
            ModelKind::Page => true,
        }
    }

    /// Returns whether `user` may create a new instance.
    ///
    /// For page models this requires at least one valid parent location:
    /// a page whose content type is an allowed parent type, where the user
    /// holds add authority. Superusers skip the authority restriction.
    pub fn user_can_create(&self, user: &AdminUser) -> bool {
        match self.admin.kind() {
            ModelKind::Flat => self.generic_check(user, "create", None),
            ModelKind::Page => self.has_valid_parent_location(user),
        }
    }

    /// Returns whether `user` may inspect an instance.
    ///
    /// Disabled inspect views deny outright. For flat models a custom
    /// `inspect_<model>` permission record is respected when one exists;
    /// otherwise inspecting falls back to list access.
    pub fn user_can_inspect(&self, user: &AdminUser, obj: Option<&dyn AdminRecord>) -> bool {
        if !self.admin.inspect_view_enabled() {
            return false;
        }
        match self.admin.kind() {
            ModelKind::Page => self.user_can_list(user),
            ModelKind::Flat => {
                if self.admin.inspect_permission_exists() {
                    self.generic_check(user, "inspect", obj)
                } else {
                    self.user_can_list(user)
                }
            }
        }
    }

    fn user_has_any_permission(&self, user: &AdminUser) -> bool {
        let registry = self.admin.permission_registry();
        registry
            .model_permissions(self.admin.app_label(), self.admin.model_name())
            .iter()
            .any(|perm| {
                permissions::has_perm_with_groups(user, &perm.perm_string(), registry.groups())
            })
    }

    fn has_valid_parent_location(&self, user: &AdminUser) -> bool {
        let Some(tree) = self.admin.page_tree() else {
            return false;
        };
        let allowed = tree.pages_of_types(self.admin.allowed_parent_page_types());
        if allowed.is_empty() {
            return false;
        }
        if user.is_superuser {
            return true;
        }
        let addable = tree.pages_where_user_can_add(user);
        allowed.intersection(&addable).next().is_some()
    }

    fn page_can_copy(&self, user: &AdminUser, obj: Option<&dyn AdminRecord>) -> bool {
        let Some(obj) = obj else {
            return false;
        };
        let Some(tree) = self.admin.page_tree() else {
            return false;
        };
        let Some(parent_id) = obj.parent_id() else {
            return false;
        };
        tree.tester_for(user, &parent_id).map_or_else(
            || {
                tracing::warn!(
                    "No permission tester is available for parent location '{parent_id}' \
                     of '{}'; denying 'copy'",
                    obj.repr()
                );
                false
            },
            |tester| {
                tester.can("publish_subpage").unwrap_or_else(|| {
                    tracing::warn!(
                        "The permission tester for parent location '{parent_id}' has no \
                         'publish_subpage' capability; denying 'copy'"
                    );
                    false
                })
            },
        )
    }

    fn generic_check(
        &self,
        user: &AdminUser,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> bool {
        match self.admin.kind() {
            ModelKind::Flat => self.flat_generic_check(user, codename),
            ModelKind::Page => self.page_generic_check(user, codename, obj),
        }
    }

    /// Model-wide permission lookup. A codename with no matching permission
    /// record is a configuration problem: warn and deny.
    fn flat_generic_check(&self, user: &AdminUser, codename: &str) -> bool {
        let registry = self.admin.permission_registry();
        let perm_codename = perm_codename_for(codename, self.admin.model_name());
        if !registry.exists(
            self.admin.app_label(),
            self.admin.model_name(),
            &perm_codename,
        ) {
            tracing::warn!(
                "No permission record matches action codename '{codename}' for model '{}'",
                self.admin.model_key()
            );
            return false;
        }
        let perm = format!("{}.{perm_codename}", self.admin.app_label());
        permissions::has_perm_with_groups(user, &perm, registry.groups())
    }

    /// Per-object tester delegation. Model-wide checks for page models are
    /// categorically false; authority is always object-relative in a tree.
    fn page_generic_check(
        &self,
        user: &AdminUser,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
    ) -> bool {
        let Some(obj) = obj else {
            return false;
        };
        obj.permission_tester(user).map_or_else(
            || {
                tracing::warn!(
                    "'{}' provides no permission tester; denying '{codename}'",
                    obj.repr()
                );
                false
            },
            |tester| {
                tester.can(codename).unwrap_or_else(|| {
                    tracing::warn!(
                        "The permission tester for '{}' has no capability entry for \
                         '{codename}'; denying",
                        obj.repr()
                    );
                    false
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use modeladmin_auth::{
        Group, ObjectPermissionTester, Permission, PermissionRegistry, StaticPermissionTester,
    };

    use crate::pages::InMemoryPageTree;

    struct Article {
        id: u64,
    }

    impl AdminRecord for Article {
        fn pk(&self) -> String {
            self.id.to_string()
        }

        fn repr(&self) -> String {
            format!("Article {}", self.id)
        }
    }

    struct EventPage {
        id: String,
        parent: Option<String>,
        tester: Option<StaticPermissionTester>,
    }

    impl AdminRecord for EventPage {
        fn pk(&self) -> String {
            self.id.clone()
        }

        fn repr(&self) -> String {
            self.id.clone()
        }

        fn parent_id(&self) -> Option<String> {
            self.parent.clone()
        }

        fn permission_tester(
            &self,
            _user: &AdminUser,
        ) -> Option<Box<dyn ObjectPermissionTester>> {
            self.tester
                .clone()
                .map(|t| Box::new(t) as Box<dyn ObjectPermissionTester>)
        }
    }

    fn article_admin() -> ModelAdmin {
        ModelAdmin::builder("blog", "article").build().unwrap()
    }

    fn page_admin_with(tree: InMemoryPageTree) -> ModelAdmin {
        ModelAdmin::builder("events", "event_page")
            .page_model()
            .allowed_parent_page_types(vec!["event_index"])
            .page_tree(Arc::new(tree))
            .build()
            .unwrap()
    }

    fn event_tree() -> InMemoryPageTree {
        InMemoryPageTree::new()
            .with_page("root", None, "root")
            .with_page("events", Some("root"), "event_index")
            .with_page("launch", Some("events"), "event_page")
    }

    // ── Flat generic checks ─────────────────────────────────────────

    #[test]
    fn test_flat_edit_maps_to_change_permission() {
        let admin = article_admin();
        let editor = AdminUser::new("vi").with_permissions(vec!["blog.change_article"]);
        let reader = AdminUser::new("kim").with_permissions(vec!["blog.view_article"]);
        let obj = Article { id: 1 };
        assert!(admin.user_can(&editor, "edit", Some(&obj)));
        assert!(!admin.user_can(&reader, "edit", Some(&obj)));
    }

    #[test]
    fn test_flat_create_maps_to_add_permission() {
        let admin = article_admin();
        let author = AdminUser::new("vi").with_permissions(vec!["blog.add_article"]);
        assert!(admin.user_can(&author, "create", None));
        assert!(!admin.user_can(&AdminUser::new("kim"), "create", None));
    }

    #[test]
    fn test_flat_missing_permission_record_denies_without_panic() {
        // An empty registry holds no records at all, so even 'edit' has
        // nothing to match against.
        let admin = ModelAdmin::builder("blog", "article")
            .permission_registry(Arc::new(PermissionRegistry::new()))
            .build()
            .unwrap();
        let superuser = AdminUser::superuser("root");
        let obj = Article { id: 1 };
        assert!(!admin.user_can(&superuser, "edit", Some(&obj)));
    }

    #[test]
    fn test_flat_group_permissions_apply() {
        let mut registry = PermissionRegistry::with_default_model_permissions("blog", "article");
        let mut editors = Group::new("editors");
        editors.add_permission(Permission::new(
            "change_article",
            "Can change article",
            "blog.article",
        ));
        registry.register_group(editors);
        let admin = ModelAdmin::builder("blog", "article")
            .permission_registry(Arc::new(registry))
            .build()
            .unwrap();
        let member = AdminUser::new("sam").in_group("editors");
        assert!(admin.user_can(&member, "edit", None));
    }

    #[test]
    fn test_flat_superuser_passes_existing_checks() {
        let admin = article_admin();
        let superuser = AdminUser::superuser("root");
        assert!(admin.user_can(&superuser, "edit", None));
        assert!(admin.user_can(&superuser, "delete", None));
    }

    // ── Listing ─────────────────────────────────────────────────────

    #[test]
    fn test_flat_list_requires_any_permission() {
        let admin = article_admin();
        let helper = admin.permission_helper();
        let viewer = AdminUser::new("kim").with_permissions(vec!["blog.view_article"]);
        assert!(helper.user_can_list(&viewer));
        assert!(!helper.user_can_list(&AdminUser::new("stranger")));
    }

    #[test]
    fn test_page_list_is_unconditional() {
        let admin = page_admin_with(event_tree());
        assert!(admin.permission_helper().user_can_list(&AdminUser::new("stranger")));
    }

    // ── Inspect ─────────────────────────────────────────────────────

    #[test]
    fn test_inspect_disabled_denies() {
        let admin = article_admin();
        let superuser = AdminUser::superuser("root");
        assert!(!admin.user_can(&superuser, "inspect", None));
    }

    #[test]
    fn test_inspect_falls_back_to_list_access() {
        let admin = ModelAdmin::builder("blog", "article")
            .inspect_view_enabled(true)
            .build()
            .unwrap();
        let viewer = AdminUser::new("kim").with_permissions(vec!["blog.view_article"]);
        assert!(admin.user_can(&viewer, "inspect", None));
        assert!(!admin.user_can(&AdminUser::new("stranger"), "inspect", None));
    }

    #[test]
    fn test_custom_inspect_permission_is_respected() {
        let mut registry = PermissionRegistry::with_default_model_permissions("blog", "article");
        registry.register(Permission::new(
            "inspect_article",
            "Can inspect article",
            "blog.article",
        ));
        let admin = ModelAdmin::builder("blog", "article")
            .inspect_view_enabled(true)
            .permission_registry(Arc::new(registry))
            .build()
            .unwrap();
        let inspector = AdminUser::new("vi").with_permissions(vec!["blog.inspect_article"]);
        let viewer = AdminUser::new("kim").with_permissions(vec!["blog.view_article"]);
        assert!(admin.user_can(&inspector, "inspect", None));
        // With a custom record defined, list access alone is not enough.
        assert!(!admin.user_can(&viewer, "inspect", None));
    }

    // ── Override rules ──────────────────────────────────────────────

    #[test]
    fn test_model_wide_rule_overrides_generic() {
        let admin = ModelAdmin::builder("blog", "article")
            .permission_rule("delete", PermissionRule::model_wide(|user| user.is_staff))
            .build()
            .unwrap();
        let staff = AdminUser::new("vi").staff();
        let holder = AdminUser::new("kim").with_permissions(vec!["blog.delete_article"]);
        assert!(admin.user_can(&staff, "delete", None));
        assert!(!admin.user_can(&holder, "delete", None));
    }

    #[test]
    fn test_object_specific_rule_used_only_with_object() {
        let admin = ModelAdmin::builder("blog", "article")
            .permission_rule(
                "edit",
                PermissionRule::object_specific(|_, obj| obj.pk() == "1"),
            )
            .build()
            .unwrap();
        let user = AdminUser::new("vi").with_permissions(vec!["blog.change_article"]);
        assert!(admin.user_can(&user, "edit", Some(&Article { id: 1 })));
        assert!(!admin.user_can(&user, "edit", Some(&Article { id: 2 })));
        // Without an object the rule is skipped and the generic check runs.
        assert!(admin.user_can(&user, "edit", None));
    }

    // ── Page generic checks ─────────────────────────────────────────

    #[test]
    fn test_page_model_wide_check_is_false() {
        let admin = page_admin_with(event_tree());
        let superuser = AdminUser::superuser("root");
        assert!(!admin.user_can(&superuser, "edit", None));
    }

    #[test]
    fn test_page_tester_delegation() {
        let admin = page_admin_with(event_tree());
        let user = AdminUser::new("sam");
        let editable = EventPage {
            id: "launch".to_string(),
            parent: Some("events".to_string()),
            tester: Some(StaticPermissionTester::new().allow("edit").deny("delete")),
        };
        assert!(admin.user_can(&user, "edit", Some(&editable)));
        assert!(!admin.user_can(&user, "delete", Some(&editable)));
    }

    #[test]
    fn test_page_missing_capability_denies() {
        let admin = page_admin_with(event_tree());
        let user = AdminUser::new("sam");
        let page = EventPage {
            id: "launch".to_string(),
            parent: Some("events".to_string()),
            tester: Some(StaticPermissionTester::new()),
        };
        assert!(!admin.user_can(&user, "unpublish", Some(&page)));
    }

    #[test]
    fn test_page_missing_tester_denies() {
        let admin = page_admin_with(event_tree());
        let user = AdminUser::new("sam");
        let page = EventPage {
            id: "launch".to_string(),
            parent: Some("events".to_string()),
            tester: None,
        };
        assert!(!admin.user_can(&user, "edit", Some(&page)));
    }

    // ── Page create ─────────────────────────────────────────────────

    #[test]
    fn test_page_create_requires_valid_parent() {
        let admin = page_admin_with(event_tree().with_add_grant("sam", "events"));
        assert!(admin.user_can(&AdminUser::new("sam"), "create", None));
        assert!(!admin.user_can(&AdminUser::new("kim"), "create", None));
    }

    #[test]
    fn test_page_create_grant_elsewhere_does_not_count() {
        // A grant on a subtree without any allowed-type location is useless.
        let tree = event_tree()
            .with_page("news", Some("root"), "news_index")
            .with_add_grant("sam", "news");
        let admin = page_admin_with(tree);
        assert!(!admin.user_can(&AdminUser::new("sam"), "create", None));
    }

    #[test]
    fn test_page_create_superuser_bypasses_authority() {
        let admin = page_admin_with(event_tree());
        assert!(admin.user_can(&AdminUser::superuser("root"), "create", None));
    }

    #[test]
    fn test_page_create_superuser_still_needs_a_location() {
        // No page of an allowed parent type exists at all.
        let tree = InMemoryPageTree::new().with_page("root", None, "root");
        let admin = page_admin_with(tree);
        assert!(!admin.user_can(&AdminUser::superuser("root"), "create", None));
    }

    // ── Page copy ───────────────────────────────────────────────────

    #[test]
    fn test_page_copy_asks_parent_for_publish_subpage() {
        let tree = event_tree()
            .with_tester(
                "sam",
                "events",
                StaticPermissionTester::new().allow("publish_subpage"),
            )
            .with_tester("kim", "events", StaticPermissionTester::new().deny("publish_subpage"));
        let admin = page_admin_with(tree);
        let page = EventPage {
            id: "launch".to_string(),
            parent: Some("events".to_string()),
            tester: None,
        };
        assert!(admin.user_can(&AdminUser::new("sam"), "copy", Some(&page)));
        assert!(!admin.user_can(&AdminUser::new("kim"), "copy", Some(&page)));
    }

    #[test]
    fn test_page_copy_without_parent_denies() {
        let admin = page_admin_with(event_tree());
        let orphan = EventPage {
            id: "root".to_string(),
            parent: None,
            tester: None,
        };
        assert!(!admin.user_can(&AdminUser::new("sam"), "copy", Some(&orphan)));
    }

    // ── Codename mapping ────────────────────────────────────────────

    #[test]
    fn test_perm_codename_mapping() {
        assert_eq!(perm_codename_for("edit", "article"), "change_article");
        assert_eq!(perm_codename_for("create", "article"), "add_article");
        assert_eq!(perm_codename_for("delete", "article"), "delete_article");
        assert_eq!(perm_codename_for("unpublish", "article"), "unpublish_article");
    }
}
