//! Integration tests for reservation selection, rendering and sync.

use chrono::{Duration, Local};
use daynote_core::models::BlockKind;
use daynote_core::services::reserve::{
    render_content, select_reservations, sync_reservations, sync_window, RenderVariant,
    SyncRequest, TimeWindow, MARKER_NAME,
};
use daynote_core::store::{BlockFilter, DocStore, InsertPosition, MemoryStore, StoreCall};

async fn marked_blocks(
    store: &MemoryStore,
    doc_id: &str,
) -> Vec<daynote_core::models::ContentBlock> {
    store
        .query_blocks(&BlockFilter::MarkedInDoc {
            doc_id: doc_id.to_string(),
            name: MARKER_NAME.to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn sync_inserts_then_updates_a_single_marked_block() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/daily note/2025/08/2025-08-31");
    let request = SyncRequest {
        variant: RenderVariant::Embed,
        position: InsertPosition::Bottom,
        block_ids: vec!["resv-a".to_string(), "resv-b".to_string()],
        doc_id: doc.clone(),
    };

    sync_reservations(&store, &request).await.unwrap();
    let after_first = marked_blocks(&store, &doc).await;
    assert_eq!(after_first.len(), 1);

    sync_reservations(&store, &request).await.unwrap();
    let after_second = marked_blocks(&store, &doc).await;
    assert_eq!(after_second.len(), 1);
    assert_eq!(after_first[0].id, after_second[0].id);

    let calls = store.calls();
    let inserts = calls
        .iter()
        .filter(|call| matches!(call, StoreCall::InsertBlock { .. }))
        .count();
    let updates = calls
        .iter()
        .filter(|call| matches!(call, StoreCall::UpdateBlock { .. }))
        .count();
    assert_eq!(inserts, 1);
    assert_eq!(updates, 1);
}

#[tokio::test]
async fn sync_positions_new_block_at_top_when_requested() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/daily note/2025/08/2025-08-31");
    let existing = store.seed_block(&doc, BlockKind::Paragraph, "journal entry");

    let request = SyncRequest {
        variant: RenderVariant::Embed,
        position: InsertPosition::Top,
        block_ids: vec!["resv-a".to_string()],
        doc_id: doc.clone(),
    };
    sync_reservations(&store, &request).await.unwrap();

    let children = store.child_ids(&doc);
    assert_eq!(children.len(), 2);
    assert_eq!(children[1], existing);
}

#[tokio::test]
async fn sync_reasserts_marker_attributes_on_update() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/daily note/2025/08/2025-08-31");
    let request = SyncRequest {
        variant: RenderVariant::Embed,
        position: InsertPosition::Bottom,
        block_ids: vec!["resv-a".to_string()],
        doc_id: doc.clone(),
    };

    sync_reservations(&store, &request).await.unwrap();
    sync_reservations(&store, &request).await.unwrap();

    let marked = marked_blocks(&store, &doc).await;
    assert_eq!(marked[0].name, MARKER_NAME);
    assert_eq!(
        marked[0].content,
        r#"{{select * from blocks where id in ("resv-a")}}"#
    );
}

#[tokio::test]
async fn link_render_covers_found_and_missing_blocks() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/inbox");
    let found = store.seed_block(&doc, BlockKind::Paragraph, "Buy milk");

    let ids = vec![found.clone(), "missing-id".to_string()];
    let rendered = render_content(&store, RenderVariant::Link, &ids)
        .await
        .unwrap();

    assert_eq!(
        rendered,
        format!("* [ ] [Buy milk](siyuan://blocks/{found})\n* [x] `missing-id` not found")
    );
}

#[tokio::test]
async fn link_render_truncates_long_snippets() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/inbox");
    let long_text = "a".repeat(80);
    let block = store.seed_block(&doc, BlockKind::Paragraph, &long_text);

    let rendered = render_content(&store, RenderVariant::Link, &[block.clone()])
        .await
        .unwrap();

    let expected_snippet = format!("{}...", "a".repeat(50));
    assert_eq!(
        rendered,
        format!("* [ ] [{expected_snippet}](siyuan://blocks/{block})")
    );
}

#[tokio::test]
async fn ref_render_uses_inline_references() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/inbox");
    let found = store.seed_block(&doc, BlockKind::Paragraph, "Call dentist");

    let rendered = render_content(&store, RenderVariant::Ref, &[found.clone()])
        .await
        .unwrap();

    assert_eq!(rendered, format!("* [ ] (({found} \"Call dentist\"))"));
}

#[tokio::test]
async fn today_window_selects_only_exact_matches_in_order() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/inbox");
    let today = Local::now().date_naive();
    let stamp = |offset: i64| (today + Duration::days(offset)).format("%Y%m%d").to_string();

    let due_today_late = store.seed_block(&doc, BlockKind::Paragraph, "later today");
    let due_today = store.seed_block(&doc, BlockKind::Paragraph, "today");
    let due_tomorrow = store.seed_block(&doc, BlockKind::Paragraph, "tomorrow");
    store.seed_reservation(&due_today_late, &stamp(0));
    store.seed_reservation(&due_today, &stamp(0));
    store.seed_reservation(&due_tomorrow, &stamp(1));

    let selected = select_reservations(&store, TimeWindow::Today).await.unwrap();

    assert_eq!(selected.len(), 2);
    assert!(selected.iter().all(|item| item.date == stamp(0)));
}

#[tokio::test]
async fn future_window_includes_later_dates_ascending() {
    let store = MemoryStore::new();
    let doc = store.seed_doc("nb-1", "/inbox");
    let today = Local::now().date_naive();
    let stamp = |offset: i64| (today + Duration::days(offset)).format("%Y%m%d").to_string();

    let next_week = store.seed_block(&doc, BlockKind::Paragraph, "next week");
    let tomorrow = store.seed_block(&doc, BlockKind::Paragraph, "tomorrow");
    let yesterday = store.seed_block(&doc, BlockKind::Paragraph, "yesterday");
    store.seed_reservation(&next_week, &stamp(7));
    store.seed_reservation(&tomorrow, &stamp(1));
    store.seed_reservation(&yesterday, &stamp(-1));

    let selected = select_reservations(&store, TimeWindow::Future).await.unwrap();

    let ids: Vec<&str> = selected.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec![tomorrow.as_str(), next_week.as_str()]);
}

#[tokio::test]
async fn sync_window_renders_current_selection() {
    let store = MemoryStore::new();
    let inbox = store.seed_doc("nb-1", "/inbox");
    let diary = store.seed_doc("nb-1", "/daily note/2025/08/2025-08-31");
    let today = Local::now().date_naive().format("%Y%m%d").to_string();
    let resv = store.seed_block(&inbox, BlockKind::Paragraph, "Buy milk");
    store.seed_reservation(&resv, &today);

    sync_window(
        &store,
        RenderVariant::Link,
        InsertPosition::Bottom,
        TimeWindow::Today,
        &diary,
    )
    .await
    .unwrap();

    let marked = marked_blocks(&store, &diary).await;
    assert_eq!(marked.len(), 1);
    assert_eq!(
        marked[0].content,
        format!("* [ ] [Buy milk](siyuan://blocks/{resv})")
    );
}

#[tokio::test]
async fn unknown_variant_fails_before_any_store_call() {
    let store = MemoryStore::new();
    let parsed = "banner".parse::<RenderVariant>();
    assert!(parsed.is_err());
    assert_eq!(store.mutation_count(), 0);
}
