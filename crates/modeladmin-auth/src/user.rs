//! The per-request user value object.
//!
//! [`AdminUser`] carries the authorization data the admin layer consults:
//! active/staff/superuser flags, group memberships, and directly assigned
//! permission strings. It deliberately carries no credentials — password
//! handling and login flows belong to the host.

use serde::{Deserialize, Serialize};

use crate::permissions;

/// A user as seen by the admin layer for one request.
///
/// Permission strings use the `"app_label.codename"` format
/// (e.g. `"blog.change_article"`).
///
/// # Examples
///
/// ```
/// use modeladmin_auth::AdminUser;
///
/// let editor = AdminUser::new("vi")
///     .with_permissions(vec!["blog.change_article", "blog.delete_article"]);
/// assert!(editor.has_perm("blog.change_article"));
/// assert!(!editor.has_perm("blog.add_article"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    /// The user's unique username.
    pub username: String,
    /// Whether this user account is active. Inactive accounts hold no permissions.
    pub is_active: bool,
    /// Whether this user can access the admin site.
    pub is_staff: bool,
    /// Whether this user has all permissions (superuser).
    pub is_superuser: bool,
    /// Group names this user belongs to.
    pub groups: Vec<String>,
    /// Permission strings directly assigned to this user.
    pub user_permissions: Vec<String>,
}

impl AdminUser {
    /// Creates a new active, non-staff user with no permissions.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            groups: Vec::new(),
            user_permissions: Vec::new(),
        }
    }

    /// Creates an active staff superuser.
    pub fn superuser(username: impl Into<String>) -> Self {
        let mut user = Self::new(username);
        user.is_staff = true;
        user.is_superuser = true;
        user
    }

    /// Marks this user as staff.
    #[must_use]
    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Marks this user account as inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Assigns permission strings directly to this user.
    #[must_use]
    pub fn with_permissions(mut self, perms: Vec<&str>) -> Self {
        self.user_permissions = perms.into_iter().map(String::from).collect();
        self
    }

    /// Adds this user to a group.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Checks whether this user holds a permission, from direct assignments.
    ///
    /// Superusers hold every permission; inactive users hold none. Group
    /// permissions require a group source — see
    /// [`permissions::has_perm_with_groups`].
    pub fn has_perm(&self, perm: &str) -> bool {
        permissions::has_perm(self, perm)
    }
}
