//! Notebook Discovery and Path Resolution
//!
//! Discovery lists the store's notebooks, drops hidden and closed ones,
//! applies the configured sort, and resolves each notebook's daily note
//! path for today. Path resolution delegates template expansion to the
//! store and falls back to a fixed default template when the configured
//! one renders empty - it never yields an empty path and never fails the
//! caller over a bad template.
//!
//! Discovery may run before the store is ready to serve requests, so the
//! startup entry point polls with a fixed attempt count and a fixed delay,
//! then gives up and reports empty state rather than blocking forever.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::models::{Notebook, NotebookSort, Settings, DEFAULT_ICON};
use crate::services::error::ServiceError;
use crate::store::{BlockFilter, DocStore};

/// Default daily note path template, applied when a notebook has none
/// configured or when its configured template renders empty.
pub const DEFAULT_SPRIG: &str =
    r#"/daily note/{{now | date "2006/01"}}/{{now | date "2006-01-02"}}"#;

/// Built-in user guide notebooks, excluded from discovery.
const HIDDEN_NOTEBOOKS: [&str; 2] = ["思源笔记用户指南", "SiYuan User Guide"];

/// Bounded startup poll: attempts and fixed delay between them.
pub const DISCOVERY_ATTEMPTS: usize = 5;
const DISCOVERY_DELAY: Duration = Duration::from_secs(1);

/// Resolve a daily note path template into a concrete, non-empty path.
///
/// Expansion is delegated to the store. An empty expansion falls back to
/// [`DEFAULT_SPRIG`]; if even that renders empty the path is produced
/// locally, so the returned path is never empty.
pub async fn resolve_daily_path(
    store: &dyn DocStore,
    sprig: &str,
) -> Result<String, ServiceError> {
    let rendered = store.render_sprig(sprig).await?;
    if !rendered.is_empty() {
        return Ok(rendered);
    }

    warn!(sprig, "daily note template rendered empty, using default");
    let fallback = store.render_sprig(DEFAULT_SPRIG).await?;
    if !fallback.is_empty() {
        return Ok(fallback);
    }
    Ok(Local::now().format("/daily note/%Y/%m/%Y-%m-%d").to_string())
}

/// Discover notebooks and resolve their daily note paths.
///
/// Hidden and closed notebooks are dropped. Under
/// `NotebookSort::CustomSort` notebooks are ordered by their sort key;
/// otherwise the store's document tree order is kept.
pub async fn load_notebooks(
    store: &dyn DocStore,
    settings: &Settings,
) -> Result<Vec<Notebook>, ServiceError> {
    let mut notebooks = store.list_notebooks().await?;
    notebooks.retain(|nb| !nb.closed && !HIDDEN_NOTEBOOKS.contains(&nb.name.as_str()));

    if settings.notebook_sort == NotebookSort::CustomSort {
        notebooks.sort_by_key(|nb| nb.sort);
    }

    for notebook in &mut notebooks {
        let conf = store.notebook_conf(&notebook.id).await?;
        notebook.dailynote_sprig = if conf.daily_note_save_path.is_empty() {
            DEFAULT_SPRIG.to_string()
        } else {
            conf.daily_note_save_path
        };
        notebook.dailynote_path = resolve_daily_path(store, &notebook.dailynote_sprig).await?;
        if notebook.icon.is_empty() {
            notebook.icon = DEFAULT_ICON.to_string();
        }
        debug!(
            notebook = %notebook.name,
            path = %notebook.dailynote_path,
            "resolved daily note path"
        );
    }

    info!("discovered {} notebooks", notebooks.len());
    Ok(notebooks)
}

/// Startup discovery with a bounded poll.
///
/// Retries [`load_notebooks`] up to [`DISCOVERY_ATTEMPTS`] times with a
/// fixed one-second delay while the store is unavailable or reports no
/// notebooks, then gives up and returns empty state. No backoff, no
/// jitter.
pub async fn load_notebooks_with_retry(store: &dyn DocStore, settings: &Settings) -> Vec<Notebook> {
    for attempt in 1..=DISCOVERY_ATTEMPTS {
        match load_notebooks(store, settings).await {
            Ok(notebooks) if !notebooks.is_empty() => return notebooks,
            Ok(_) => warn!(attempt, "store reported no notebooks yet"),
            Err(err) => warn!(attempt, %err, "notebook discovery failed"),
        }
        if attempt < DISCOVERY_ATTEMPTS {
            tokio::time::sleep(DISCOVERY_DELAY).await;
        }
    }
    warn!(
        "giving up on notebook discovery after {} attempts",
        DISCOVERY_ATTEMPTS
    );
    Vec::new()
}

/// Report which notebooks already have a daily note for today.
///
/// Queries each distinct resolved path once and marks the notebooks that
/// own a matching document.
pub async fn diary_status(
    store: &dyn DocStore,
    notebooks: &[Notebook],
) -> Result<HashMap<String, bool>, ServiceError> {
    let paths: BTreeSet<&str> = notebooks
        .iter()
        .map(|nb| nb.dailynote_path.as_str())
        .collect();

    let mut status = HashMap::new();
    for hpath in paths {
        let docs = store
            .query_blocks(&BlockFilter::DocsByHpath {
                hpath: hpath.to_string(),
                notebook_id: None,
            })
            .await?;
        for doc in docs {
            status.insert(doc.notebook_id, true);
        }
    }
    debug!("found daily notes in {} notebooks", status.len());
    Ok(status)
}
