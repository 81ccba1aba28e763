//! Reservation Sync Engine
//!
//! Keeps a single canonical rendered reservation block per target
//! document in sync with a selection of reservation items. The block is
//! located through its marker name attribute with a lookup scoped to the
//! target document: found means overwrite in place, absent means insert
//! at the configured position and tag. After a successful sync exactly
//! one marked block exists and its content matches the current selection
//! and variant.

use std::collections::BTreeMap;

use tracing::debug;

use crate::services::error::ServiceError;
use crate::services::reserve::render::{render_content, RenderVariant};
use crate::services::reserve::selector::{select_reservations, TimeWindow};
use crate::store::{BlockFilter, DocStore, InsertPosition};

/// Marker attribute name identifying the canonical reservation block.
pub const MARKER_NAME: &str = "Reservation";

/// One sync invocation: what to render, where, and from which items.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Rendering strategy
    pub variant: RenderVariant,
    /// Where a newly inserted block goes
    pub position: InsertPosition,
    /// Reservation block IDs to render
    pub block_ids: Vec<String>,
    /// Target document
    pub doc_id: String,
}

/// Attributes asserted on the canonical block on every write. The name
/// attribute is not assumed to survive content edits, so updates re-apply
/// it rather than trusting the earlier tag.
fn marker_attrs() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("name".to_string(), MARKER_NAME.to_string()),
        ("breadcrumb".to_string(), "true".to_string()),
    ])
}

/// Upsert the canonical reservation block described by `request`.
///
/// Idempotent over unchanged selections: the first call inserts the
/// block, subsequent calls update the same block in place.
pub async fn sync_reservations(
    store: &dyn DocStore,
    request: &SyncRequest,
) -> Result<(), ServiceError> {
    let marked = store
        .query_blocks(&BlockFilter::MarkedInDoc {
            doc_id: request.doc_id.clone(),
            name: MARKER_NAME.to_string(),
        })
        .await?;

    let content = render_content(store, request.variant, &request.block_ids).await?;

    match marked.first() {
        Some(existing) => {
            debug!(block_id = %existing.id, doc_id = %request.doc_id, "updating reservation block");
            store.update_block(&existing.id, &content).await?;
            store.set_block_attrs(&existing.id, &marker_attrs()).await?;
        }
        None => {
            let new_id = store
                .insert_block(&request.doc_id, &content, request.position)
                .await?;
            debug!(block_id = %new_id, doc_id = %request.doc_id, "inserted reservation block");
            store.set_block_attrs(&new_id, &marker_attrs()).await?;
        }
    }
    Ok(())
}

/// Select reservations in `window` and sync them into `doc_id`.
///
/// This is the caller-facing composition of selector and sync engine.
pub async fn sync_window(
    store: &dyn DocStore,
    variant: RenderVariant,
    position: InsertPosition,
    window: TimeWindow,
    doc_id: &str,
) -> Result<(), ServiceError> {
    let items = select_reservations(store, window).await?;
    let request = SyncRequest {
        variant,
        position,
        block_ids: items.into_iter().map(|item| item.id).collect(),
        doc_id: doc_id.to_string(),
    };
    sync_reservations(store, &request).await
}
