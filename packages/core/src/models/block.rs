//! Content Block Structures
//!
//! This module defines the `ContentBlock` struct mirroring the rows the
//! document store returns from its block table, plus the `Reservation` row
//! shape produced by the attribute-join query.
//!
//! The store addresses every node in a document tree as a block. Documents
//! themselves are blocks (`kind = Document`), and so are headings, lists and
//! list items. Headings are NOT containers in the store's model: the content
//! nested under a heading is stored as separate sibling blocks, which is why
//! relocation has to fetch and re-thread them explicitly.

use serde::{Deserialize, Serialize};

/// Block kind, serialized as the store's single-letter type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Document root (`d`)
    #[serde(rename = "d")]
    Document,
    /// Heading (`h`) - not a container; children are stored as siblings
    #[serde(rename = "h")]
    Heading,
    /// List container (`l`)
    #[serde(rename = "l")]
    List,
    /// List item (`i`) - relocation is subject to the list-item policy
    #[serde(rename = "i")]
    ListItem,
    /// Paragraph (`p`)
    #[serde(rename = "p")]
    Paragraph,
    /// Any other block type the store knows about
    #[serde(other)]
    Other,
}

/// A row from the store's block table.
///
/// Only the columns the engine actually reads are modeled; unknown columns in
/// store responses are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block ID (store format: `YYYYMMDDHHMMSS-xxxxxxx`)
    pub id: String,

    /// Block kind (store column `type`)
    #[serde(rename = "type")]
    pub kind: BlockKind,

    /// Plain-text content of the block
    #[serde(default)]
    pub content: String,

    /// Named attribute of the block; the sync engine's canonical marker
    /// ("Reservation") lives here
    #[serde(default)]
    pub name: String,

    /// Owning notebook ID (store column `box`)
    #[serde(rename = "box", default)]
    pub notebook_id: String,

    /// Human-readable hierarchical path, only meaningful for documents
    #[serde(default)]
    pub hpath: String,

    /// ID of the document this block lives in (equals `id` for documents)
    #[serde(default)]
    pub root_id: String,
}

impl ContentBlock {
    /// Create a block with the given identity and kind, all other columns
    /// empty. Mostly useful for seeding stores in tests.
    pub fn new(id: impl Into<String>, kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            name: String::new(),
            notebook_id: String::new(),
            hpath: String::new(),
            root_id: String::new(),
        }
    }

    /// Whether this block is a document root.
    pub fn is_document(&self) -> bool {
        self.kind == BlockKind::Document
    }
}

/// A block carrying a due-date attribute, as returned by the reservation
/// query. The selector never mutates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Source block ID
    pub id: String,
    /// Block text content (untruncated; renderers clip it)
    #[serde(default)]
    pub content: String,
    /// Due date attribute value in `YYYYMMDD` form
    pub date: String,
}
