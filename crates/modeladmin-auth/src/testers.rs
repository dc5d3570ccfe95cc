//! Per-object permission testers for tree-structured content.
//!
//! Authority over hierarchical content is granted per subtree rather than
//! model-wide, so permission checks against such objects delegate to a
//! tester obtained from the object itself. A tester exposes an explicit
//! capability table: [`ObjectPermissionTester::can`] returns `None` when it
//! has no entry matching the asked codename, and the caller is expected to
//! log a configuration warning and deny.

use std::collections::HashMap;

/// A capability table answering "may the current user perform this action
/// on this particular object".
pub trait ObjectPermissionTester {
    /// Returns `Some(decision)` when the tester has a capability entry for
    /// `codename`, or `None` when no matching entry exists.
    fn can(&self, codename: &str) -> Option<bool>;
}

/// A map-backed [`ObjectPermissionTester`].
///
/// Hosts build one per (object, user) pair; tests build them directly.
///
/// # Examples
///
/// ```
/// use modeladmin_auth::{ObjectPermissionTester, StaticPermissionTester};
///
/// let tester = StaticPermissionTester::new().allow("edit").deny("delete");
/// assert_eq!(tester.can("edit"), Some(true));
/// assert_eq!(tester.can("delete"), Some(false));
/// assert_eq!(tester.can("unpublish"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionTester {
    capabilities: HashMap<String, bool>,
}

impl StaticPermissionTester {
    /// Creates a tester with no capability entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the action is permitted.
    #[must_use]
    pub fn allow(mut self, codename: impl Into<String>) -> Self {
        self.capabilities.insert(codename.into(), true);
        self
    }

    /// Records that the action is denied.
    #[must_use]
    pub fn deny(mut self, codename: impl Into<String>) -> Self {
        self.capabilities.insert(codename.into(), false);
        self
    }
}

impl ObjectPermissionTester for StaticPermissionTester {
    fn can(&self, codename: &str) -> Option<bool> {
        self.capabilities.get(codename).copied()
    }
}
