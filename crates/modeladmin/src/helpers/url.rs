//! URL composition for admin actions.
//!
//! Flat models get `<base>/<codename>/<quoted_pk>/` paths under the model's
//! own base path. Page models redirect the tree-management codenames to the
//! host's page routes, suffixed with a `next=` parameter pointing back at
//! this model's index so the tree UI returns control to the calling list
//! view. Primary keys are percent-encoded for safe path embedding.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::actions::ModelAdminAction;
use crate::options::ModelAdmin;
use crate::records::AdminRecord;

/// The action codenames served by the host's tree-management UI rather than
/// model-specific routes.
pub const PAGE_TREE_ACTIONS: [&str; 10] = [
    "add",
    "edit",
    "delete",
    "copy",
    "move",
    "preview",
    "view_draft",
    "unpublish",
    "revisions_index",
    "add_subpage",
];

const PAGE_TREE_BASE: &str = "/admin/pages/";

/// Characters escaped inside a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a query-string value. Slashes stay readable,
/// matching the host admin's own `next=` links.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?');

fn quote(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn quote_query(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Builds action URLs, route patterns, and route names for one model admin.
pub struct UrlHelper<'a> {
    admin: &'a ModelAdmin,
}

impl<'a> UrlHelper<'a> {
    pub(crate) const fn new(admin: &'a ModelAdmin) -> Self {
        Self { admin }
    }

    /// The base path all of this model's own routes live under. Defaults to
    /// `/admin/<app_label>/<model_name>/`.
    pub fn base_url_path(&self) -> String {
        self.admin.base_url_path_override().map_or_else(
            || {
                format!(
                    "/admin/{}/{}/",
                    self.admin.app_label(),
                    self.admin.model_name()
                )
            },
            normalize_base_path,
        )
    }

    /// The list view URL.
    pub fn index_url(&self) -> String {
        self.base_url_path()
    }

    /// The create view URL.
    pub fn create_url(&self) -> String {
        format!("{}create/", self.base_url_path())
    }

    /// The URL for action `codename`, optionally for a specific object,
    /// with any extra path arguments appended.
    pub fn action_url(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
        extra_args: &[&str],
    ) -> String {
        if self.admin.is_page_model() && PAGE_TREE_ACTIONS.contains(&codename) {
            return self.page_tree_url(codename, obj, extra_args);
        }
        match codename {
            "index" => self.index_url(),
            "create" => self.create_url(),
            _ => {
                let mut segments = vec![codename.to_string()];
                if let Some(obj) = obj {
                    segments.push(quote(&obj.pk()));
                }
                segments.extend(extra_args.iter().map(|arg| quote(arg)));
                format!("{}{}/", self.base_url_path(), segments.join("/"))
            }
        }
    }

    /// A tree-management URL, suffixed with `next=` so the host UI returns
    /// to this model's index afterwards.
    fn page_tree_url(
        &self,
        codename: &str,
        obj: Option<&dyn AdminRecord>,
        extra_args: &[&str],
    ) -> String {
        let mut segments = Vec::new();
        if let Some(obj) = obj {
            segments.push(quote(&obj.pk()));
        }
        segments.push(codename.to_string());
        segments.extend(extra_args.iter().map(|arg| quote(arg)));
        format!(
            "{PAGE_TREE_BASE}{}/?next={}",
            segments.join("/"),
            quote_query(&self.index_url())
        )
    }

    /// The route pattern registered for `action`, axum-style. Instance
    /// actions capture the primary key as `{pk}`.
    pub fn action_url_pattern(&self, action: &ModelAdminAction) -> String {
        if let Some(pattern) = &action.url_pattern {
            return pattern.clone();
        }
        let base = self.base_url_path();
        match action.codename.as_str() {
            "index" => base,
            "create" => format!("{base}create/"),
            codename if action.instance_specific => format!("{base}{codename}/{{pk}}/"),
            codename => format!("{base}{codename}/"),
        }
    }

    /// The reversible route name for action `codename`.
    pub fn action_url_name(&self, codename: &str) -> String {
        format!(
            "{}_{}_modeladmin_{codename}",
            self.admin.app_label(),
            self.admin.model_name()
        )
    }
}

fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}/")
}
