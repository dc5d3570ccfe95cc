//! The content-tree abstraction consumed by page-model admins.
//!
//! Authority over tree-structured content is granted per subtree, so the
//! permission helper needs to ask the tree two questions: which locations
//! accept a given content type, and where a user may add children
//! (transitively, including every descendant of an authorized location).
//! Hosts back [`PageTree`] with their real tree; [`InMemoryPageTree`] backs
//! it with a plain node store for hosts without a database and for tests.

use std::collections::{HashMap, HashSet};

use modeladmin_auth::{AdminUser, ObjectPermissionTester, StaticPermissionTester};

/// The tree-query interface consumed by page-model permission checks.
pub trait PageTree: Send + Sync {
    /// Ids of pages whose content type is one of `content_types`.
    fn pages_of_types(&self, content_types: &[String]) -> HashSet<String>;

    /// Ids of pages where `user` holds add authority. An authorization on a
    /// location extends to all of its descendants; superusers are authorized
    /// everywhere.
    fn pages_where_user_can_add(&self, user: &AdminUser) -> HashSet<String>;

    /// The capability tester for `user` at one location, if the location
    /// exists.
    fn tester_for(&self, user: &AdminUser, page_id: &str)
        -> Option<Box<dyn ObjectPermissionTester>>;
}

struct PageNode {
    parent_id: Option<String>,
    content_type: String,
}

struct SuperuserTester;

impl ObjectPermissionTester for SuperuserTester {
    fn can(&self, _codename: &str) -> Option<bool> {
        Some(true)
    }
}

/// A [`PageTree`] backed by an in-memory node store.
///
/// # Examples
///
/// ```
/// use modeladmin::pages::{InMemoryPageTree, PageTree};
/// use modeladmin_auth::AdminUser;
///
/// let tree = InMemoryPageTree::new()
///     .with_page("root", None, "root")
///     .with_page("events", Some("root"), "event_index")
///     .with_add_grant("sam", "events");
///
/// let sam = AdminUser::new("sam");
/// assert!(tree.pages_where_user_can_add(&sam).contains("events"));
/// ```
#[derive(Default)]
pub struct InMemoryPageTree {
    nodes: HashMap<String, PageNode>,
    children: HashMap<String, Vec<String>>,
    add_grants: HashMap<String, HashSet<String>>,
    testers: HashMap<(String, String), StaticPermissionTester>,
}

impl InMemoryPageTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page node. The parent, if given, should already exist.
    #[must_use]
    pub fn with_page(
        mut self,
        id: impl Into<String>,
        parent_id: Option<&str>,
        content_type: impl Into<String>,
    ) -> Self {
        let id = id.into();
        if let Some(parent) = parent_id {
            self.children
                .entry(parent.to_string())
                .or_default()
                .push(id.clone());
        }
        self.nodes.insert(
            id,
            PageNode {
                parent_id: parent_id.map(String::from),
                content_type: content_type.into(),
            },
        );
        self
    }

    /// Grants `username` add authority at `page_id` (and, transitively, at
    /// every descendant).
    #[must_use]
    pub fn with_add_grant(mut self, username: impl Into<String>, page_id: impl Into<String>) -> Self {
        self.add_grants
            .entry(username.into())
            .or_default()
            .insert(page_id.into());
        self
    }

    /// Sets the capability tester `username` gets at `page_id`.
    #[must_use]
    pub fn with_tester(
        mut self,
        username: impl Into<String>,
        page_id: impl Into<String>,
        tester: StaticPermissionTester,
    ) -> Self {
        self.testers
            .insert((username.into(), page_id.into()), tester);
        self
    }

    /// The parent id of a page, if the page exists and is not a root.
    pub fn parent_of(&self, page_id: &str) -> Option<String> {
        self.nodes.get(page_id)?.parent_id.clone()
    }

    /// Ids of `page_id` and/or its descendants, walking child links.
    pub fn descendants_of(&self, page_id: &str, inclusive: bool) -> HashSet<String> {
        let mut result = HashSet::new();
        if !self.nodes.contains_key(page_id) {
            return result;
        }
        let mut queue = vec![page_id.to_string()];
        while let Some(current) = queue.pop() {
            if let Some(children) = self.children.get(&current) {
                queue.extend(children.iter().cloned());
            }
            result.insert(current);
        }
        if !inclusive {
            result.remove(page_id);
        }
        result
    }
}

impl PageTree for InMemoryPageTree {
    fn pages_of_types(&self, content_types: &[String]) -> HashSet<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| content_types.contains(&node.content_type))
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn pages_where_user_can_add(&self, user: &AdminUser) -> HashSet<String> {
        if user.is_superuser {
            return self.nodes.keys().cloned().collect();
        }
        let Some(roots) = self.add_grants.get(&user.username) else {
            return HashSet::new();
        };
        let mut result = HashSet::new();
        for root in roots {
            result.extend(self.descendants_of(root, true));
        }
        result
    }

    fn tester_for(
        &self,
        user: &AdminUser,
        page_id: &str,
    ) -> Option<Box<dyn ObjectPermissionTester>> {
        if !self.nodes.contains_key(page_id) {
            return None;
        }
        if user.is_superuser {
            return Some(Box::new(SuperuserTester));
        }
        self.testers
            .get(&(user.username.clone(), page_id.to_string()))
            .map(|tester| Box::new(tester.clone()) as Box<dyn ObjectPermissionTester>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> InMemoryPageTree {
        InMemoryPageTree::new()
            .with_page("root", None, "root")
            .with_page("events", Some("root"), "event_index")
            .with_page("launch", Some("events"), "event_page")
            .with_page("news", Some("root"), "news_index")
    }

    #[test]
    fn test_pages_of_types() {
        let tree = sample_tree();
        let ids = tree.pages_of_types(&["event_index".to_string(), "news_index".to_string()]);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("events"));
        assert!(ids.contains("news"));
    }

    #[test]
    fn test_parent_of() {
        let tree = sample_tree();
        assert_eq!(tree.parent_of("launch").as_deref(), Some("events"));
        assert!(tree.parent_of("root").is_none());
        assert!(tree.parent_of("missing").is_none());
    }

    #[test]
    fn test_descendants_of() {
        let tree = sample_tree();
        let inclusive = tree.descendants_of("events", true);
        assert_eq!(inclusive.len(), 2);
        assert!(inclusive.contains("events"));
        assert!(inclusive.contains("launch"));
        let exclusive = tree.descendants_of("events", false);
        assert_eq!(exclusive.len(), 1);
        assert!(tree.descendants_of("missing", true).is_empty());
    }

    #[test]
    fn test_add_grant_extends_to_descendants() {
        let tree = sample_tree().with_add_grant("sam", "events");
        let addable = tree.pages_where_user_can_add(&AdminUser::new("sam"));
        assert!(addable.contains("events"));
        assert!(addable.contains("launch"));
        assert!(!addable.contains("news"));
    }

    #[test]
    fn test_superuser_can_add_everywhere() {
        let tree = sample_tree();
        let addable = tree.pages_where_user_can_add(&AdminUser::superuser("root"));
        assert_eq!(addable.len(), 4);
    }

    #[test]
    fn test_no_grants_means_nowhere() {
        let tree = sample_tree();
        assert!(tree
            .pages_where_user_can_add(&AdminUser::new("stranger"))
            .is_empty());
    }

    #[test]
    fn test_tester_for() {
        let tree = sample_tree().with_tester(
            "sam",
            "launch",
            StaticPermissionTester::new().allow("edit"),
        );
        let sam = AdminUser::new("sam");
        let tester = tree.tester_for(&sam, "launch").unwrap();
        assert_eq!(tester.can("edit"), Some(true));
        assert!(tree.tester_for(&sam, "news").is_none());
        assert!(tree.tester_for(&sam, "missing").is_none());
    }

    #[test]
    fn test_tester_for_superuser_allows_everything() {
        let tree = sample_tree();
        let tester = tree
            .tester_for(&AdminUser::superuser("root"), "launch")
            .unwrap();
        assert_eq!(tester.can("anything"), Some(true));
    }
}
