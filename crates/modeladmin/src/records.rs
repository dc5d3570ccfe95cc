//! The administered-object abstraction.
//!
//! The admin layer is generic over any registered model, so it works against
//! the [`AdminRecord`] trait rather than concrete model types. Flat records
//! only need a primary key and a display representation; tree-structured
//! content additionally exposes its publishing state and a per-object
//! permission tester.

use modeladmin_auth::{AdminUser, ObjectPermissionTester};

/// An object instance as seen by the admin layer.
///
/// The defaulted methods cover the publishing surface of tree-structured
/// content. Flat records can ignore them: an unpublished, tester-less record
/// simply never grows the live/draft buttons and always fails tree-style
/// object checks.
pub trait AdminRecord {
    /// The primary key, stringified for URL embedding.
    fn pk(&self) -> String;

    /// The human-readable representation used in button titles.
    fn repr(&self) -> String;

    /// Whether a live (published) version of this record exists.
    fn is_live(&self) -> bool {
        false
    }

    /// Whether this record has changes not yet published.
    fn has_unpublished_changes(&self) -> bool {
        false
    }

    /// The public URL of the live version, if one exists.
    fn live_url(&self) -> Option<String> {
        None
    }

    /// The id of this record's parent location in the content tree.
    fn parent_id(&self) -> Option<String> {
        None
    }

    /// The capability tester answering object-specific permission checks
    /// for `user`, if this record supports them.
    fn permission_tester(&self, _user: &AdminUser) -> Option<Box<dyn ObjectPermissionTester>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeladmin_auth::StaticPermissionTester;

    struct PlainRecord;

    impl AdminRecord for PlainRecord {
        fn pk(&self) -> String {
            "7".to_string()
        }

        fn repr(&self) -> String {
            "plain record".to_string()
        }
    }

    struct PublishedRecord;

    impl AdminRecord for PublishedRecord {
        fn pk(&self) -> String {
            "3".to_string()
        }

        fn repr(&self) -> String {
            "published record".to_string()
        }

        fn is_live(&self) -> bool {
            true
        }

        fn live_url(&self) -> Option<String> {
            Some("/news/published-record/".to_string())
        }

        fn permission_tester(
            &self,
            _user: &AdminUser,
        ) -> Option<Box<dyn ObjectPermissionTester>> {
            Some(Box::new(StaticPermissionTester::new().allow("edit")))
        }
    }

    #[test]
    fn test_defaults_for_plain_record() {
        let record = PlainRecord;
        assert_eq!(record.pk(), "7");
        assert!(!record.is_live());
        assert!(!record.has_unpublished_changes());
        assert!(record.live_url().is_none());
        assert!(record.parent_id().is_none());
        assert!(record
            .permission_tester(&AdminUser::new("sam"))
            .is_none());
    }

    #[test]
    fn test_overridden_publishing_surface() {
        let record = PublishedRecord;
        assert!(record.is_live());
        assert_eq!(record.live_url().as_deref(), Some("/news/published-record/"));
        let tester = record.permission_tester(&AdminUser::new("sam")).unwrap();
        assert_eq!(tester.can("edit"), Some(true));
        assert_eq!(tester.can("delete"), None);
    }
}
