//! Engine Settings
//!
//! The recognized configuration surface. There is no global settings
//! singleton; callers load a `Settings` value once at startup and pass it
//! explicitly into every operation that consults it.

use serde::{Deserialize, Serialize};

/// Ordering applied to discovered notebooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotebookSort {
    /// Keep the order the store returns (document tree order)
    DocTree,
    /// Sort by each notebook's custom sort key
    CustomSort,
}

/// Policy for relocating a list-item block into a daily note.
///
/// List items cannot stand alone at a document root, so a direct move
/// produces a dangling item unless it is wrapped in a fresh list first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListItemPolicy {
    /// Reject the relocation before any mutation
    Disabled,
    /// Move the item directly into the document
    Direct,
    /// Create a new list at the document top and move the item into it
    WrapInList,
}

/// Recognized engine options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Notebook ordering for discovery
    pub notebook_sort: NotebookSort,

    /// List-item relocation policy
    pub move_list_item: ListItemPolicy,

    /// Whether the caller should open today's diary on startup
    pub open_on_start: bool,

    /// Preferred notebook ID, if any
    pub default_notebook: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notebook_sort: NotebookSort::CustomSort,
            move_list_item: ListItemPolicy::WrapInList,
            open_on_start: true,
            default_notebook: None,
        }
    }
}
