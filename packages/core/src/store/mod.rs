//! Document Store Boundary
//!
//! This module defines the `DocStore` trait that abstracts the external,
//! shared document store behind the engine. The trait enables multiple
//! implementations (HTTP kernel client, in-process memory store) without
//! changing the service layer.
//!
//! # Concurrency model
//!
//! All methods are async request/response calls. The engine issues them
//! sequentially within a single logical task per public operation; there is
//! no internal fan-out, no batching, and no mid-flight cancellation. A call,
//! once issued, runs to completion or failure. Ordering guarantees are
//! call-order guarantees only.
//!
//! # Relocation primitive
//!
//! The store has exactly one relocation primitive, `move_block`, anchored
//! either after a previous sibling or under a parent document. There is no
//! subtree move; multi-block relocations are built on top of this in the
//! service layer by previous-ID threading, and are therefore not atomic.

pub mod error;
pub mod kernel;
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::models::{ContentBlock, Notebook, NotebookConf, Reservation};

pub use error::StoreError;
pub use kernel::KernelClient;
pub use memory::{MemoryStore, StoreCall};

/// Attribute name carried by reservation blocks in the store.
pub const RESERVATION_ATTR: &str = "custom-reservation";

/// Structured read filter over the store's block table.
///
/// This is the abstracted form of the store-side query language; each
/// implementation lowers it to whatever the backend understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockFilter {
    /// Documents whose hierarchical path equals `hpath`, optionally scoped
    /// to one notebook. Results come back in store-defined creation order.
    DocsByHpath {
        hpath: String,
        notebook_id: Option<String>,
    },
    /// The logical child blocks of a block, in document order. For heading
    /// blocks this surfaces the sibling-stored nested content.
    ChildBlocks { parent_id: String },
    /// Blocks inside one document carrying the given name attribute. Scoped
    /// lookup used to find the canonical rendered reservation block.
    MarkedInDoc { doc_id: String, name: String },
}

/// Due-date comparison for the reservation query, against resolved
/// `YYYYMMDD` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDateFilter {
    /// Due exactly on the given date
    Equals(String),
    /// Due on or after the given date
    AtLeast(String),
}

/// Insertion position for new blocks in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Prepend as the first block of the document
    Top,
    /// Append as the last block of the document
    Bottom,
}

/// Abstraction layer for the external document store.
///
/// Implementations must be `Send + Sync`; the engine consumes them as
/// `Arc<dyn DocStore>` or plain `&dyn DocStore` references.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// List every notebook the store knows, in document tree order.
    async fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError>;

    /// Fetch a notebook's configuration.
    async fn notebook_conf(&self, notebook_id: &str) -> Result<NotebookConf, StoreError>;

    /// Expand a path template through the store's templating facility.
    ///
    /// May return an empty string; callers are expected to handle the
    /// fallback themselves.
    async fn render_sprig(&self, template: &str) -> Result<String, StoreError>;

    /// Run a structured block query. Result order is defined per filter.
    async fn query_blocks(&self, filter: &BlockFilter) -> Result<Vec<ContentBlock>, StoreError>;

    /// Query blocks carrying the reservation due-date attribute, ordered
    /// ascending by due date. Re-invocation re-executes the filter; there
    /// is no cursor.
    async fn query_reservations(
        &self,
        filter: &DueDateFilter,
    ) -> Result<Vec<Reservation>, StoreError>;

    /// Create a new document at `hpath` under a notebook and return its ID.
    async fn create_doc(
        &self,
        notebook_id: &str,
        hpath: &str,
        markdown: &str,
    ) -> Result<String, StoreError>;

    /// Move a block. Exactly one of `previous_id` (place after that
    /// sibling) or `parent_id` (place into that document, at the store's
    /// default position) must be set.
    async fn move_block(
        &self,
        block_id: &str,
        previous_id: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Insert a new block rendered from markdown at the top or bottom of a
    /// document; returns the new block's ID.
    async fn insert_block(
        &self,
        doc_id: &str,
        markdown: &str,
        position: InsertPosition,
    ) -> Result<String, StoreError>;

    /// Replace a block's content with new markdown.
    async fn update_block(&self, block_id: &str, markdown: &str) -> Result<(), StoreError>;

    /// Set (merge) named attributes on a block.
    async fn set_block_attrs(
        &self,
        block_id: &str,
        attrs: &BTreeMap<String, String>,
    ) -> Result<(), StoreError>;

    /// Fetch a single block by ID. `Ok(None)` when the block does not
    /// exist; that is not an error at this layer.
    async fn get_block(&self, block_id: &str) -> Result<Option<ContentBlock>, StoreError>;
}
