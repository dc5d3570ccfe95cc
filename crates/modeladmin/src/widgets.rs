//! Renderable button value objects.
//!
//! A [`Button`] is the affordance handed to the template layer: a URL, a
//! label, CSS classes, HTML attributes, and (for dropdown groups) nested
//! items. Buttons are constructed fresh per render and discarded with the
//! response.
//!
//! [`ButtonKwargs`] is the pre-permission-gate parameter set: it still
//! carries the `permission_required` codename, which the button helper
//! consumes when deciding whether the button may be yielded at all.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A renderable button bound to an action and optional object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// The `href` target.
    pub url: String,
    /// The visible label text.
    pub label: String,
    /// CSS classes, kept as an ordered set for stable rendering.
    pub classes: BTreeSet<String>,
    /// Extra HTML attributes (`title`, `target`, ...).
    pub attrs: BTreeMap<String, String>,
    /// Nested buttons, for dropdown groups.
    pub items: Vec<Button>,
}

impl Button {
    /// Creates a plain link button.
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            classes: BTreeSet::new(),
            attrs: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    /// Creates a dropdown group button containing `items`.
    pub fn dropdown(
        label: impl Into<String>,
        title: impl Into<String>,
        items: Vec<Self>,
    ) -> Self {
        let mut button = Self::new("", label);
        button.attrs.insert("title".to_string(), title.into());
        button.items = items;
        button
    }

    /// Returns whether this button is a dropdown group.
    pub fn is_dropdown(&self) -> bool {
        !self.items.is_empty()
    }

    /// Returns the `title` attribute, if set.
    pub fn title(&self) -> Option<&str> {
        self.attrs.get("title").map(String::as_str)
    }

    /// Removes then adds CSS classes. Removal runs first so a class listed
    /// in both ends up present.
    pub fn modify_classes(&mut self, add: &[&str], remove: &[&str]) {
        for class in remove {
            self.classes.remove(*class);
        }
        for class in add {
            self.classes.insert((*class).to_string());
        }
    }
}

/// The parameter set a button is created from, before the permission gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonKwargs {
    /// The `href` target.
    pub url: String,
    /// The visible label text.
    pub label: String,
    /// The `title` attribute, folded into `attrs` on build.
    pub title: Option<String>,
    /// CSS classes.
    pub classes: BTreeSet<String>,
    /// The permission codename that must hold for the button to render.
    pub permission_required: Option<String>,
    /// Extra HTML attributes.
    pub attrs: BTreeMap<String, String>,
}

impl ButtonKwargs {
    /// Creates a parameter set with a URL and label.
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    /// Sets the title text.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the CSS classes.
    #[must_use]
    pub fn classes(mut self, classes: Vec<&str>) -> Self {
        self.classes = classes.into_iter().map(String::from).collect();
        self
    }

    /// Sets the permission codename gating this button.
    #[must_use]
    pub fn permission_required(mut self, codename: impl Into<String>) -> Self {
        self.permission_required = Some(codename.into());
        self
    }

    /// Sets one HTML attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Builds the button, folding the title into the attribute map.
    pub fn into_button(self) -> Button {
        let mut attrs = self.attrs;
        if let Some(title) = self.title {
            attrs.insert("title".to_string(), title);
        }
        Button {
            url: self.url,
            label: self.label,
            classes: self.classes,
            attrs,
            items: Vec::new(),
        }
    }
}

/// One entry in an ordered button list: a single action button, or a
/// dropdown group of further entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonSpec {
    /// A button for the action registered under this codename.
    Action(String),
    /// A dropdown group resolving its entries recursively.
    Dropdown {
        /// The dropdown's visible label.
        label: String,
        /// The entries inside the dropdown.
        items: Vec<ButtonSpec>,
    },
}

impl ButtonSpec {
    /// Creates an action entry.
    pub fn action(codename: impl Into<String>) -> Self {
        Self::Action(codename.into())
    }

    /// Creates a dropdown entry.
    pub fn dropdown(label: impl Into<String>, items: Vec<Self>) -> Self {
        Self::Dropdown {
            label: label.into(),
            items,
        }
    }
}

impl From<&str> for ButtonSpec {
    fn from(codename: &str) -> Self {
        Self::action(codename)
    }
}
