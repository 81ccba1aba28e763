//! Notebook Structures
//!
//! A notebook is a top-level container of documents in the store. The store
//! returns its static fields; the discovery service fills in the daily note
//! sprig and the resolved path for the current day.

use serde::{Deserialize, Serialize};

/// Emoji code used when a notebook has no icon configured.
pub const DEFAULT_ICON: &str = "1f5c3";

/// A top-level container of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Notebook ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Emoji icon code; defaulted by discovery when empty
    #[serde(default)]
    pub icon: String,

    /// Custom sort key, honored under `NotebookSort::CustomSort`
    #[serde(default)]
    pub sort: i64,

    /// Closed notebooks are excluded from discovery
    #[serde(default)]
    pub closed: bool,

    /// Daily note path template; populated during discovery
    #[serde(skip)]
    pub dailynote_sprig: String,

    /// Resolved daily note path for today; populated during discovery
    #[serde(skip)]
    pub dailynote_path: String,
}

impl Notebook {
    /// Create a notebook with only identity fields set, for seeding stores.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            sort: 0,
            closed: false,
            dailynote_sprig: String::new(),
            dailynote_path: String::new(),
        }
    }
}

/// Per-notebook configuration, as returned by the store.
///
/// Only the daily note save path is read; the store carries many more
/// settings per notebook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookConf {
    /// Daily note path template ("sprig"); may be empty
    #[serde(rename = "dailyNoteSavePath", default)]
    pub daily_note_save_path: String,
}
