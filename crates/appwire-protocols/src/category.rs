//! Registry categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three kinds of registry entries.
///
/// Registration is partitioned by category, but realized instances share one
/// identity space across all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Action,
    Store,
    Widget,
}

impl Category {
    /// Singular lower-case name, as used in collision messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Action => "action",
            Category::Store => "store",
            Category::Widget => "widget",
        }
    }

    /// Plural name, as used by the provider facade.
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Action => "actions",
            Category::Store => "stores",
            Category::Widget => "widgets",
        }
    }

    /// Parse a facade category name. This is the only place a category
    /// string crosses the boundary; everything past it is the closed enum.
    pub fn from_plural(name: &str) -> Option<Self> {
        match name {
            "actions" => Some(Category::Action),
            "stores" => Some(Category::Store),
            "widgets" => Some(Category::Widget),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
