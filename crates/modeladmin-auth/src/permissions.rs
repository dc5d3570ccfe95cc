//! Permission and group system.
//!
//! Mirrors a conventional CMS permission model. Users can have:
//!
//! - **Direct permissions** assigned to their account
//! - **Group permissions** inherited from groups they belong to
//! - **Superuser access** which grants all permissions unconditionally
//!
//! Permission strings use the format `"app_label.codename"`
//! (e.g. `"blog.add_article"`). The [`PermissionRegistry`] additionally
//! tracks which permission *records* exist in the system at all — the admin
//! layer treats a check against a nonexistent record as a configuration
//! warning and a denial, never an error.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::user::AdminUser;

/// A single permission record, identified by a codename and associated with
/// a content type.
///
/// Permissions are typically auto-generated for each model (add, change,
/// delete, view) but can also be created manually — e.g. a custom
/// `inspect_article` permission for granular inspect control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// The machine-readable identifier (e.g. "`add_article`").
    pub codename: String,
    /// The human-readable name (e.g. "Can add article").
    pub name: String,
    /// The content type this permission applies to (e.g. "blog.article").
    pub content_type: String,
}

impl Permission {
    /// Creates a new permission record.
    pub fn new(
        codename: impl Into<String>,
        name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            codename: codename.into(),
            name: name.into(),
            content_type: content_type.into(),
        }
    }

    /// Returns the app label portion of the content type.
    pub fn app_label(&self) -> &str {
        self.content_type
            .split_once('.')
            .map_or(self.content_type.as_str(), |(app, _)| app)
    }

    /// Returns the permission string used for user assignment, in
    /// `"app_label.codename"` format.
    pub fn perm_string(&self) -> String {
        format!("{}.{}", self.app_label(), self.codename)
    }
}

/// A group of users with shared permissions.
///
/// Users inherit all permissions from the groups they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// The group name.
    pub name: String,
    /// Permissions assigned to this group.
    pub permissions: Vec<Permission>,
}

impl Group {
    /// Creates a new group with the given name and no permissions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    /// Adds a permission to this group.
    pub fn add_permission(&mut self, permission: Permission) {
        if !self.permissions.contains(&permission) {
            self.permissions.push(permission);
        }
    }

    /// Removes a permission from this group by codename.
    pub fn remove_permission(&mut self, codename: &str) {
        self.permissions.retain(|p| p.codename != codename);
    }

    /// Returns all permission strings held by this group.
    pub fn get_permissions(&self) -> HashSet<String> {
        self.permissions.iter().map(Permission::perm_string).collect()
    }
}

/// Checks if a user has a specific permission.
///
/// The permission string should be in `"app_label.codename"` format.
/// Superusers automatically have all permissions. Inactive users have none.
pub fn has_perm(user: &AdminUser, perm: &str) -> bool {
    if !user.is_active {
        return false;
    }
    if user.is_superuser {
        return true;
    }
    get_all_permissions(user).contains(perm)
}

/// Checks if a user has all of the given permissions.
pub fn has_perms(user: &AdminUser, perms: &[&str]) -> bool {
    if !user.is_active {
        return false;
    }
    if user.is_superuser {
        return true;
    }
    let all_perms = get_all_permissions(user);
    perms.iter().all(|p| all_perms.contains(*p))
}

/// Checks if a user has any permissions for the given app label.
pub fn has_module_perms(user: &AdminUser, app_label: &str) -> bool {
    if !user.is_active {
        return false;
    }
    if user.is_superuser {
        return true;
    }
    let prefix = format!("{app_label}.");
    get_all_permissions(user)
        .iter()
        .any(|p| p.starts_with(&prefix))
}

/// Returns all permissions directly assigned to a user.
pub fn get_all_permissions(user: &AdminUser) -> HashSet<String> {
    user.user_permissions.iter().cloned().collect()
}

/// Returns all permissions for a user including permissions from the given
/// groups, resolved by membership name.
pub fn get_all_permissions_with_groups(user: &AdminUser, groups: &[Group]) -> HashSet<String> {
    let mut perms = get_all_permissions(user);
    for group in groups {
        if user.groups.contains(&group.name) {
            perms.extend(group.get_permissions());
        }
    }
    perms
}

/// Checks if a user has a specific permission, considering group memberships.
pub fn has_perm_with_groups(user: &AdminUser, perm: &str, groups: &[Group]) -> bool {
    if !user.is_active {
        return false;
    }
    if user.is_superuser {
        return true;
    }
    get_all_permissions_with_groups(user, groups).contains(perm)
}

/// Generates the default permission records for a model
/// (add, change, delete, view).
pub fn generate_default_permissions(app_label: &str, model_name: &str) -> Vec<Permission> {
    ["add", "change", "delete", "view"]
        .iter()
        .map(|verb| {
            Permission::new(
                format!("{verb}_{model_name}"),
                format!("Can {verb} {model_name}"),
                format!("{app_label}.{model_name}"),
            )
        })
        .collect()
}

/// The set of permission records that exist in the system, plus group
/// definitions.
///
/// The admin layer consults this registry to distinguish "the user lacks a
/// permission" from "no such permission record was ever defined" — the
/// latter is a configuration warning and must never crash a page. Once
/// handed to a model admin the registry is shared read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionRegistry {
    permissions: Vec<Permission>,
    groups: Vec<Group>,
}

impl PermissionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the default add/change/delete/view
    /// records for one model.
    pub fn with_default_model_permissions(app_label: &str, model_name: &str) -> Self {
        Self {
            permissions: generate_default_permissions(app_label, model_name),
            groups: Vec::new(),
        }
    }

    /// Registers a permission record.
    pub fn register(&mut self, permission: Permission) {
        if !self.permissions.contains(&permission) {
            self.permissions.push(permission);
        }
    }

    /// Registers a group definition.
    pub fn register_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Returns all permission records pertaining to one model.
    pub fn model_permissions(&self, app_label: &str, model_name: &str) -> Vec<&Permission> {
        let content_type = format!("{app_label}.{model_name}");
        self.permissions
            .iter()
            .filter(|p| p.content_type == content_type)
            .collect()
    }

    /// Returns whether a permission record with the given codename exists
    /// for the given model.
    pub fn exists(&self, app_label: &str, model_name: &str, codename: &str) -> bool {
        let content_type = format!("{app_label}.{model_name}");
        self.permissions
            .iter()
            .any(|p| p.content_type == content_type && p.codename == codename)
    }

    /// Returns the registered group definitions.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }
}
