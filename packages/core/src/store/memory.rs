//! In-Process Memory Store
//!
//! A `DocStore` implementation backed by in-memory tables. It models the
//! parts of the real store the engine depends on - ordered sibling lists
//! per container, the `move_block` anchor semantics, name attributes and
//! the reservation attribute join - so service behavior can be exercised
//! without a running kernel.
//!
//! The store also keeps a log of every mutating call it receives, which is
//! what the idempotence and zero-mutation tests assert against, and
//! supports failing `move_block` after N successful calls to reproduce the
//! engine's non-atomic partial-move states.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use chrono::Local;
use regex::Regex;
use uuid::Uuid;

use crate::models::{BlockKind, ContentBlock, Notebook, NotebookConf, Reservation};
use crate::store::{
    BlockFilter, DocStore, DueDateFilter, InsertPosition, StoreError, RESERVATION_ATTR,
};

/// One mutating call received by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateDoc {
        notebook_id: String,
        hpath: String,
    },
    MoveBlock {
        block_id: String,
        previous_id: Option<String>,
        parent_id: Option<String>,
    },
    InsertBlock {
        doc_id: String,
    },
    UpdateBlock {
        block_id: String,
    },
    SetBlockAttrs {
        block_id: String,
    },
}

struct BlockEntry {
    block: ContentBlock,
    attrs: BTreeMap<String, String>,
}

#[derive(Default)]
struct Inner {
    notebooks: Vec<Notebook>,
    confs: HashMap<String, NotebookConf>,
    sprig_overrides: HashMap<String, String>,
    blocks: HashMap<String, BlockEntry>,
    /// Ordered child IDs per container (documents, lists, and the logical
    /// child scope of headings)
    children: HashMap<String, Vec<String>>,
    /// Document creation order, the store-defined tie-break for path queries
    doc_order: Vec<String>,
    calls: Vec<StoreCall>,
    /// When set, allow this many further `move_block` calls, then fail
    moves_before_failure: Option<usize>,
}

/// In-memory document store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }

    /// Mint a block ID in the store's `YYYYMMDDHHMMSS-xxxxxxx` format.
    fn mint_id() -> String {
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let entropy = Uuid::new_v4().simple().to_string();
        format!("{stamp}-{}", &entropy[..7])
    }

    //
    // Seeding helpers (used by tests and embedders)
    //

    /// Register a notebook.
    pub fn add_notebook(&self, notebook: Notebook) {
        self.lock().notebooks.push(notebook);
    }

    /// Set a notebook's daily note path template.
    pub fn set_notebook_sprig(&self, notebook_id: &str, sprig: &str) {
        self.lock().confs.insert(
            notebook_id.to_string(),
            NotebookConf {
                daily_note_save_path: sprig.to_string(),
            },
        );
    }

    /// Force `render_sprig` to return `rendered` for `template`, bypassing
    /// the built-in expansion.
    pub fn set_sprig_result(&self, template: &str, rendered: &str) {
        self.lock()
            .sprig_overrides
            .insert(template.to_string(), rendered.to_string());
    }

    /// Create a document directly (without going through `create_doc`, so
    /// no call is logged). Returns the document ID.
    pub fn seed_doc(&self, notebook_id: &str, hpath: &str) -> String {
        let mut inner = self.lock();
        create_doc_locked(&mut inner, notebook_id, hpath)
    }

    /// Append a block at the bottom of a document. Returns the block ID.
    pub fn seed_block(&self, doc_id: &str, kind: BlockKind, content: &str) -> String {
        let id = Self::mint_id();
        let mut inner = self.lock();
        let notebook_id = inner
            .blocks
            .get(doc_id)
            .map(|e| e.block.notebook_id.clone())
            .unwrap_or_default();
        let mut block = ContentBlock::new(id.clone(), kind, content);
        block.root_id = doc_id.to_string();
        block.notebook_id = notebook_id;
        inner.blocks.insert(
            id.clone(),
            BlockEntry {
                block,
                attrs: BTreeMap::new(),
            },
        );
        inner.children.entry(id.clone()).or_default();
        inner
            .children
            .entry(doc_id.to_string())
            .or_default()
            .push(id.clone());
        id
    }

    /// Declare the logical child scope of a heading block, in order.
    pub fn seed_heading_children(&self, heading_id: &str, child_ids: &[String]) {
        self.lock()
            .children
            .insert(heading_id.to_string(), child_ids.to_vec());
    }

    /// Attach a reservation due-date attribute to a block.
    pub fn seed_reservation(&self, block_id: &str, date: &str) {
        let mut inner = self.lock();
        if let Some(entry) = inner.blocks.get_mut(block_id) {
            entry
                .attrs
                .insert(RESERVATION_ATTR.to_string(), date.to_string());
        }
    }

    /// Fail every `move_block` call after the next `allowed` successful ones.
    pub fn fail_moves_after(&self, allowed: usize) {
        self.lock().moves_before_failure = Some(allowed);
    }

    //
    // Inspection helpers
    //

    /// Snapshot of the mutating calls received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of mutating calls received so far.
    pub fn mutation_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Ordered top-level block IDs of a container.
    pub fn child_ids(&self, container_id: &str) -> Vec<String> {
        self.lock()
            .children
            .get(container_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn create_doc_locked(inner: &mut Inner, notebook_id: &str, hpath: &str) -> String {
    let id = MemoryStore::mint_id();
    let mut block = ContentBlock::new(id.clone(), BlockKind::Document, "");
    block.hpath = hpath.to_string();
    block.notebook_id = notebook_id.to_string();
    block.root_id = id.clone();
    inner.blocks.insert(
        id.clone(),
        BlockEntry {
            block,
            attrs: BTreeMap::new(),
        },
    );
    inner.children.entry(id.clone()).or_default();
    inner.doc_order.push(id.clone());
    id
}

/// Remove a block ID from every child list it appears in.
fn detach(inner: &mut Inner, block_id: &str) {
    for list in inner.children.values_mut() {
        list.retain(|id| id != block_id);
    }
}

/// Find the container whose child list currently holds `block_id`.
fn container_of(inner: &Inner, block_id: &str) -> Option<String> {
    inner
        .children
        .iter()
        .find(|(_, ids)| ids.iter().any(|id| id == block_id))
        .map(|(container, _)| container.clone())
}

/// Resolve the document a container belongs to (documents resolve to
/// themselves).
fn root_of(inner: &Inner, container_id: &str) -> String {
    match inner.blocks.get(container_id) {
        Some(entry) if entry.block.is_document() => entry.block.id.clone(),
        Some(entry) => entry.block.root_id.clone(),
        None => container_id.to_string(),
    }
}

/// Expand the store's Go-layout date pipes (`{{now | date "2006-01-02"}}`)
/// against the current local time.
fn expand_sprig(template: &str) -> String {
    static DATE_PIPE: OnceLock<Regex> = OnceLock::new();
    let pipe = DATE_PIPE
        .get_or_init(|| Regex::new(r#"\{\{\s*now\s*\|\s*date\s+"([^"]+)"\s*\}\}"#).unwrap());

    let now = Local::now();
    pipe.replace_all(template, |caps: &regex::Captures<'_>| {
        let layout = caps[1]
            .replace("2006", "%Y")
            .replace("01", "%m")
            .replace("02", "%d");
        now.format(&layout).to_string()
    })
    .into_owned()
}

#[async_trait]
impl DocStore for MemoryStore {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError> {
        Ok(self.lock().notebooks.clone())
    }

    async fn notebook_conf(&self, notebook_id: &str) -> Result<NotebookConf, StoreError> {
        Ok(self
            .lock()
            .confs
            .get(notebook_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn render_sprig(&self, template: &str) -> Result<String, StoreError> {
        let inner = self.lock();
        if let Some(rendered) = inner.sprig_overrides.get(template) {
            return Ok(rendered.clone());
        }
        if template.is_empty() {
            return Ok(String::new());
        }
        Ok(expand_sprig(template))
    }

    async fn query_blocks(&self, filter: &BlockFilter) -> Result<Vec<ContentBlock>, StoreError> {
        let inner = self.lock();
        match filter {
            BlockFilter::DocsByHpath { hpath, notebook_id } => Ok(inner
                .doc_order
                .iter()
                .filter_map(|id| inner.blocks.get(id))
                .filter(|entry| {
                    entry.block.hpath == *hpath
                        && notebook_id
                            .as_ref()
                            .map_or(true, |nb| entry.block.notebook_id == *nb)
                })
                .map(|entry| entry.block.clone())
                .collect()),
            BlockFilter::ChildBlocks { parent_id } => Ok(inner
                .children
                .get(parent_id)
                .into_iter()
                .flatten()
                .filter_map(|id| inner.blocks.get(id))
                .map(|entry| entry.block.clone())
                .collect()),
            BlockFilter::MarkedInDoc { doc_id, name } => Ok(inner
                .blocks
                .values()
                .filter(|entry| {
                    entry.block.root_id == *doc_id
                        && entry.block.id != *doc_id
                        && entry.block.name == *name
                })
                .map(|entry| entry.block.clone())
                .collect()),
        }
    }

    async fn query_reservations(
        &self,
        filter: &DueDateFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.lock();
        let mut rows: Vec<Reservation> = inner
            .blocks
            .values()
            .filter_map(|entry| {
                let date = entry.attrs.get(RESERVATION_ATTR)?;
                let keep = match filter {
                    DueDateFilter::Equals(wanted) => date == wanted,
                    DueDateFilter::AtLeast(wanted) => date.as_str() >= wanted.as_str(),
                };
                keep.then(|| Reservation {
                    id: entry.block.id.clone(),
                    content: entry.block.content.clone(),
                    date: date.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }

    async fn create_doc(
        &self,
        notebook_id: &str,
        hpath: &str,
        _markdown: &str,
    ) -> Result<String, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::CreateDoc {
            notebook_id: notebook_id.to_string(),
            hpath: hpath.to_string(),
        });
        Ok(create_doc_locked(&mut inner, notebook_id, hpath))
    }

    async fn move_block(
        &self,
        block_id: &str,
        previous_id: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::MoveBlock {
            block_id: block_id.to_string(),
            previous_id: previous_id.map(str::to_string),
            parent_id: parent_id.map(str::to_string),
        });

        if let Some(remaining) = inner.moves_before_failure {
            if remaining == 0 {
                return Err(StoreError::unavailable("injected move failure"));
            }
            inner.moves_before_failure = Some(remaining - 1);
        }

        if !inner.blocks.contains_key(block_id) {
            return Err(StoreError::MissingBlock(block_id.to_string()));
        }

        let (container, index) = match (previous_id, parent_id) {
            (Some(previous), None) => {
                let container = container_of(&inner, previous)
                    .ok_or_else(|| StoreError::MissingBlock(previous.to_string()))?;
                detach(&mut inner, block_id);
                let position = inner.children[&container]
                    .iter()
                    .position(|id| id == previous)
                    .ok_or_else(|| StoreError::MissingBlock(previous.to_string()))?;
                (container, position + 1)
            }
            (None, Some(parent)) => {
                if !inner.blocks.contains_key(parent) {
                    return Err(StoreError::MissingBlock(parent.to_string()));
                }
                detach(&mut inner, block_id);
                // Default position: first child of the container.
                (parent.to_string(), 0)
            }
            _ => {
                return Err(StoreError::api(
                    -1,
                    "move_block requires exactly one of previous_id / parent_id",
                ))
            }
        };

        let root = root_of(&inner, &container);
        inner
            .children
            .entry(container)
            .or_default()
            .insert(index, block_id.to_string());
        if let Some(entry) = inner.blocks.get_mut(block_id) {
            entry.block.root_id = root;
        }
        Ok(())
    }

    async fn insert_block(
        &self,
        doc_id: &str,
        markdown: &str,
        position: InsertPosition,
    ) -> Result<String, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::InsertBlock {
            doc_id: doc_id.to_string(),
        });
        if !inner.blocks.contains_key(doc_id) {
            return Err(StoreError::MissingBlock(doc_id.to_string()));
        }

        let id = Self::mint_id();
        let kind = if markdown.trim_start().starts_with("* ") {
            BlockKind::List
        } else {
            BlockKind::Paragraph
        };
        let notebook_id = inner
            .blocks
            .get(doc_id)
            .map(|e| e.block.notebook_id.clone())
            .unwrap_or_default();
        let mut block = ContentBlock::new(id.clone(), kind, markdown);
        block.root_id = root_of(&inner, doc_id);
        block.notebook_id = notebook_id;
        inner.blocks.insert(
            id.clone(),
            BlockEntry {
                block,
                attrs: BTreeMap::new(),
            },
        );
        inner.children.entry(id.clone()).or_default();
        let list = inner.children.entry(doc_id.to_string()).or_default();
        match position {
            InsertPosition::Top => list.insert(0, id.clone()),
            InsertPosition::Bottom => list.push(id.clone()),
        }
        Ok(id)
    }

    async fn update_block(&self, block_id: &str, markdown: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::UpdateBlock {
            block_id: block_id.to_string(),
        });
        let entry = inner
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| StoreError::MissingBlock(block_id.to_string()))?;
        entry.block.content = markdown.to_string();
        Ok(())
    }

    async fn set_block_attrs(
        &self,
        block_id: &str,
        attrs: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::SetBlockAttrs {
            block_id: block_id.to_string(),
        });
        let entry = inner
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| StoreError::MissingBlock(block_id.to_string()))?;
        for (key, value) in attrs {
            if key == "name" {
                entry.block.name = value.clone();
            }
            entry.attrs.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn get_block(&self, block_id: &str) -> Result<Option<ContentBlock>, StoreError> {
        Ok(self
            .lock()
            .blocks
            .get(block_id)
            .map(|entry| entry.block.clone()))
    }
}
