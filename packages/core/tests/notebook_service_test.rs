//! Integration tests for notebook discovery and daily path resolution.

use chrono::Local;
use daynote_core::models::{Notebook, NotebookSort, Settings, DEFAULT_ICON};
use daynote_core::services::{
    diary_status, load_notebooks, load_notebooks_with_retry, resolve_daily_path, DEFAULT_SPRIG,
};
use daynote_core::store::MemoryStore;

fn default_path_for_today() -> String {
    Local::now().format("/daily note/%Y/%m/%Y-%m-%d").to_string()
}

#[tokio::test]
async fn empty_template_falls_back_to_default_sprig() {
    let store = MemoryStore::new();
    store.set_sprig_result("{{broken}}", "");

    let path = resolve_daily_path(&store, "{{broken}}").await.unwrap();

    assert!(!path.is_empty());
    assert_eq!(path, default_path_for_today());
}

#[tokio::test]
async fn path_resolution_never_yields_empty() {
    let store = MemoryStore::new();
    store.set_sprig_result("{{broken}}", "");
    store.set_sprig_result(DEFAULT_SPRIG, "");

    let path = resolve_daily_path(&store, "{{broken}}").await.unwrap();

    assert_eq!(path, default_path_for_today());
}

#[tokio::test]
async fn healthy_template_is_used_as_is() {
    let store = MemoryStore::new();
    store.set_sprig_result("/journal/{{now}}", "/journal/2025-08-31");

    let path = resolve_daily_path(&store, "/journal/{{now}}").await.unwrap();

    assert_eq!(path, "/journal/2025-08-31");
}

#[tokio::test]
async fn discovery_filters_closed_and_hidden_notebooks() {
    let store = MemoryStore::new();
    store.add_notebook(Notebook::new("nb-1", "Work"));
    let mut closed = Notebook::new("nb-2", "Archive");
    closed.closed = true;
    store.add_notebook(closed);
    store.add_notebook(Notebook::new("nb-3", "SiYuan User Guide"));

    let notebooks = load_notebooks(&store, &Settings::default()).await.unwrap();

    let names: Vec<&str> = notebooks.iter().map(|nb| nb.name.as_str()).collect();
    assert_eq!(names, vec!["Work"]);
}

#[tokio::test]
async fn custom_sort_orders_by_sort_key() {
    let store = MemoryStore::new();
    let mut second = Notebook::new("nb-b", "Second");
    second.sort = 2;
    let mut first = Notebook::new("nb-a", "First");
    first.sort = 1;
    store.add_notebook(second);
    store.add_notebook(first);

    let settings = Settings {
        notebook_sort: NotebookSort::CustomSort,
        ..Settings::default()
    };
    let notebooks = load_notebooks(&store, &settings).await.unwrap();
    let names: Vec<&str> = notebooks.iter().map(|nb| nb.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);

    let settings = Settings {
        notebook_sort: NotebookSort::DocTree,
        ..Settings::default()
    };
    let notebooks = load_notebooks(&store, &settings).await.unwrap();
    let names: Vec<&str> = notebooks.iter().map(|nb| nb.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn discovery_populates_sprig_path_and_icon() {
    let store = MemoryStore::new();
    store.add_notebook(Notebook::new("nb-1", "Work"));
    store.set_notebook_sprig("nb-1", "/work-journal/{{x}}");
    store.set_sprig_result("/work-journal/{{x}}", "/work-journal/2025-08-31");

    let notebooks = load_notebooks(&store, &Settings::default()).await.unwrap();

    assert_eq!(notebooks[0].dailynote_sprig, "/work-journal/{{x}}");
    assert_eq!(notebooks[0].dailynote_path, "/work-journal/2025-08-31");
    assert_eq!(notebooks[0].icon, DEFAULT_ICON);
}

#[tokio::test]
async fn missing_conf_uses_default_sprig() {
    let store = MemoryStore::new();
    store.add_notebook(Notebook::new("nb-1", "Work"));

    let notebooks = load_notebooks(&store, &Settings::default()).await.unwrap();

    assert_eq!(notebooks[0].dailynote_sprig, DEFAULT_SPRIG);
    assert_eq!(notebooks[0].dailynote_path, default_path_for_today());
}

#[tokio::test(start_paused = true)]
async fn startup_poll_gives_up_with_empty_state() {
    let store = MemoryStore::new();

    let notebooks = load_notebooks_with_retry(&store, &Settings::default()).await;

    assert!(notebooks.is_empty());
}

#[tokio::test]
async fn diary_status_marks_notebooks_with_existing_docs() {
    let store = MemoryStore::new();
    let mut with_diary = Notebook::new("nb-1", "Work");
    with_diary.dailynote_path = "/daily note/2025/08/2025-08-31".to_string();
    let mut without_diary = Notebook::new("nb-2", "Home");
    without_diary.dailynote_path = "/daily note/2025/08/2025-08-31".to_string();
    store.seed_doc("nb-1", "/daily note/2025/08/2025-08-31");

    let status = diary_status(&store, &[with_diary, without_diary])
        .await
        .unwrap();

    assert_eq!(status.get("nb-1"), Some(&true));
    assert_eq!(status.get("nb-2"), None);
}
