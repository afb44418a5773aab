//! Tests for [`DiskStore`] — filesystem-backed cache storage.

use std::path::Path;

use muninn::{CacheLocation, CacheStore, DiskStore, MuninnError, NullStore};
use tempfile::TempDir;

async fn store() -> (TempDir, DiskStore) {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::new(dir.path()).await.unwrap();
    (dir, store)
}

fn location(path: &str) -> CacheLocation {
    CacheLocation::from_path(path)
}

#[tokio::test]
async fn read_miss_returns_none() {
    let (_dir, store) = store().await;
    let result = store.read(&location("nothing/object.json")).await.unwrap();
    assert!(result.is_none());
    let modified = store
        .modified_at(&location("nothing/object.json"))
        .await
        .unwrap();
    assert!(modified.is_none());
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let (_dir, store) = store().await;
    let loc = location("api.example.com/patients/42/object.json");

    store.write(&loc, br#"{"id":42}"#).await.unwrap();

    let bytes = store.read(&loc).await.unwrap().unwrap();
    assert_eq!(bytes, br#"{"id":42}"#);
    assert!(store.modified_at(&loc).await.unwrap().is_some());
}

#[tokio::test]
async fn write_creates_missing_parent_directories() {
    let (dir, store) = store().await;
    let loc = location("a/b/c/d/object.json");

    store.write(&loc, b"deep").await.unwrap();

    assert!(dir.path().join("a/b/c/d/object.json").is_file());
}

#[tokio::test]
async fn repeated_reads_are_idempotent() {
    let (_dir, store) = store().await;
    let loc = location("stable/object.json");
    store.write(&loc, b"payload").await.unwrap();

    let first = store.read(&loc).await.unwrap().unwrap();
    let first_modified = store.modified_at(&loc).await.unwrap().unwrap();
    let second = store.read(&loc).await.unwrap().unwrap();
    let second_modified = store.modified_at(&loc).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first_modified, second_modified);
}

#[tokio::test]
async fn overwrite_is_last_writer_wins() {
    let (_dir, store) = store().await;
    let loc = location("contested/object.json");

    store.write(&loc, b"first").await.unwrap();
    store.write(&loc, b"second").await.unwrap();

    assert_eq!(store.read(&loc).await.unwrap().unwrap(), b"second");
}

#[tokio::test]
async fn traversal_outside_the_root_is_refused() {
    let (_dir, store) = store().await;

    let escape = location("../outside.json");
    assert!(matches!(
        store.write(&escape, b"x").await,
        Err(MuninnError::Location(_))
    ));
    assert!(matches!(
        store.read(&escape).await,
        Err(MuninnError::Location(_))
    ));

    let absolute = location("/etc/passwd");
    assert!(matches!(
        store.read(&absolute).await,
        Err(MuninnError::Location(_))
    ));
}

#[tokio::test]
async fn ensure_dir_creates_nested_directories() {
    let (dir, store) = store().await;
    store.ensure_dir(Path::new("nested/sub")).await.unwrap();
    assert!(dir.path().join("nested/sub").is_dir());
}

#[tokio::test]
async fn wipe_without_filter_removes_everything() {
    let (dir, store) = store().await;
    store.write(&location("a/object.json"), b"a").await.unwrap();
    store.write(&location("b/object.json"), b"b").await.unwrap();
    store.write(&location("top.json"), b"t").await.unwrap();

    let removed = store.wipe(None).await.unwrap();

    // two directories plus one top-level file
    assert_eq!(removed, 3);
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn wipe_with_extension_filter_is_selective() {
    let (dir, store) = store().await;
    store
        .write(&location("a/object.json"), b"json")
        .await
        .unwrap();
    store.write(&location("a/raw.bin"), b"bin").await.unwrap();
    store
        .write(&location("b/object.json"), b"json")
        .await
        .unwrap();

    let removed = store.wipe(Some("json")).await.unwrap();

    assert_eq!(removed, 2);
    assert!(store.read(&location("a/raw.bin")).await.unwrap().is_some());
    assert!(store.read(&location("a/object.json")).await.unwrap().is_none());
    assert!(dir.path().join("a").is_dir());
}

#[tokio::test]
async fn list_returns_visible_files_sorted() {
    let (dir, store) = store().await;
    store.write(&location("sub/b.json"), b"b").await.unwrap();
    store.write(&location("sub/a.json"), b"a").await.unwrap();
    std::fs::write(dir.path().join("sub/.hidden"), b"h").unwrap();
    store.ensure_dir(Path::new("sub/child")).await.unwrap();

    let files = store.list("sub").await.unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.json", "b.json"]);
}

#[tokio::test]
async fn distinct_suffixes_store_independently() {
    let (_dir, store) = store().await;
    let segments = vec!["/patients/".to_string(), "42".to_string()];
    let plain = CacheLocation::for_request("https://api.example.com", &segments, None);
    let summary = CacheLocation::for_request("https://api.example.com", &segments, Some("summary"));

    store.write(&plain, b"full record").await.unwrap();
    store.write(&summary, b"summary only").await.unwrap();

    assert_eq!(store.read(&plain).await.unwrap().unwrap(), b"full record");
    assert_eq!(
        store.read(&summary).await.unwrap().unwrap(),
        b"summary only"
    );
}

#[tokio::test]
async fn null_store_discards_writes_and_always_misses() {
    let loc = location("anything/object.json");
    NullStore.write(&loc, b"bytes").await.unwrap();
    assert!(NullStore.read(&loc).await.unwrap().is_none());
    assert!(NullStore.modified_at(&loc).await.unwrap().is_none());
    NullStore.ensure_dir(Path::new("sub")).await.unwrap();
}
