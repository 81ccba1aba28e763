//! Diary Location and Subtree Relocation
//!
//! Get-or-create resolution of a notebook's daily note document, plus the
//! machinery for moving an existing content subtree into it.
//!
//! # The relocation problem
//!
//! The store's only relocation primitive moves a single block, anchored
//! either after an existing sibling or into a document. There is no
//! subtree move. Heading blocks make this worse: they are not containers,
//! so the content nested under a heading is addressed as separate sibling
//! blocks that must be fetched up front and re-threaded one link at a
//! time behind the relocated root. The explicit "most recently placed
//! block" accumulator below is the correct translation of that store
//! capability, not an artifact to simplify away.
//!
//! A failure partway through the threading loop leaves the root relocated
//! and the remaining children behind. The engine surfaces that error and
//! performs no compensation.

use tracing::{debug, info};

use crate::models::{BlockKind, ContentBlock, ListItemPolicy, Notebook, Settings};
use crate::services::error::ServiceError;
use crate::store::{BlockFilter, DocStore, InsertPosition};

/// Markdown stub for the wrapper list created under the wrap-in-list
/// policy: a single item holding a zero-width space.
const LIST_STUB: &str = "* \u{200b}";

/// Resolve the daily note document for a notebook, creating it if absent.
///
/// Queries documents at the notebook's resolved daily path, scoped to the
/// notebook; the first match wins (store creation order). When nothing
/// matches, an empty document is created at that path.
///
/// Two sequential resolutions for the same notebook and day return the
/// same document ID, and only the first one creates anything. The
/// check-then-create window is racy under concurrent callers: both can
/// observe "absent" and create two documents for the same date. The store
/// offers no uniqueness guarantee over paths, so this is a documented
/// limitation rather than something the engine hides.
pub async fn resolve_diary(
    store: &dyn DocStore,
    notebook: &Notebook,
) -> Result<String, ServiceError> {
    let docs = store
        .query_blocks(&BlockFilter::DocsByHpath {
            hpath: notebook.dailynote_path.clone(),
            notebook_id: Some(notebook.id.clone()),
        })
        .await?;

    if let Some(doc) = docs.first() {
        debug!(notebook = %notebook.name, doc_id = %doc.id, "daily note already exists");
        return Ok(doc.id.clone());
    }

    info!(notebook = %notebook.name, path = %notebook.dailynote_path, "creating daily note");
    let doc_id = store
        .create_doc(&notebook.id, &notebook.dailynote_path, "")
        .await?;
    Ok(doc_id)
}

/// Move a block and its logical children into a target document,
/// preserving the children's original relative order.
///
/// For heading blocks the child scope is fetched before any mutation.
/// The root moves first (parent anchor, store default position), then
/// each child is placed immediately after the previously placed block.
/// Returns the root block's ID in its new location.
///
/// Not atomic: a failing child move leaves earlier moves in place.
pub async fn move_subtree(
    store: &dyn DocStore,
    block: &ContentBlock,
    target_id: &str,
) -> Result<String, ServiceError> {
    let children = if block.kind == BlockKind::Heading {
        store
            .query_blocks(&BlockFilter::ChildBlocks {
                parent_id: block.id.clone(),
            })
            .await?
    } else {
        Vec::new()
    };

    debug!(
        block_id = %block.id,
        target_id,
        children = children.len(),
        "moving block subtree"
    );
    store.move_block(&block.id, None, Some(target_id)).await?;

    let mut previous_id = block.id.clone();
    for child in &children {
        store.move_block(&child.id, Some(&previous_id), None).await?;
        previous_id = child.id.clone();
    }

    Ok(block.id.clone())
}

/// Relocate a block into a notebook's daily note, resolving (and if
/// needed creating) the daily note first.
///
/// List items are subject to the configured policy:
///
/// - `Disabled` rejects the relocation before any mutation
/// - `WrapInList` first creates a fresh list at the top of the daily note
///   and moves the item into that list
/// - `Direct` moves the item straight into the document
///
/// Returns the relocated root block's ID.
pub async fn relocate_into_diary(
    store: &dyn DocStore,
    settings: &Settings,
    block_id: &str,
    notebook: &Notebook,
) -> Result<String, ServiceError> {
    let block = store
        .get_block(block_id)
        .await?
        .ok_or_else(|| ServiceError::block_not_found(block_id))?;

    let is_list_item = block.kind == BlockKind::ListItem;
    if is_list_item && settings.move_list_item == ListItemPolicy::Disabled {
        return Err(ServiceError::policy_violation(block_id));
    }

    let doc_id = resolve_diary(store, notebook).await?;

    if is_list_item && settings.move_list_item == ListItemPolicy::WrapInList {
        let list_id = store
            .insert_block(&doc_id, LIST_STUB, InsertPosition::Top)
            .await?;
        debug!(list_id = %list_id, "wrapping list item in a fresh list");
        return move_subtree(store, &block, &list_id).await;
    }

    move_subtree(store, &block, &doc_id).await
}
