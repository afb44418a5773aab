//! Tests for [`RetryQueue`] — durable offline request bookkeeping.

use std::sync::Arc;

use muninn::queue::QUEUE_DOCUMENT;
use muninn::{
    CacheLocation, CacheStore, DiskStore, JsonCodec, Method, MuninnError, NullStore,
    RedispatchInterval, RequestDescriptor, RetryQueue,
};
use tempfile::TempDir;

fn descriptor(segment: &str) -> RequestDescriptor {
    RequestDescriptor::new("https://api.example.com", Method::Post)
        .path_segment(segment)
        .body(br#"{"pending":true}"#.to_vec())
}

async fn disk_queue() -> (TempDir, Arc<DiskStore>, RetryQueue) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DiskStore::new(dir.path()).await.unwrap());
    let queue = RetryQueue::new(store.clone(), JsonCodec::new());
    (dir, store, queue)
}

#[tokio::test]
async fn enqueue_persists_the_document_at_the_well_known_location() {
    let (dir, _store, queue) = disk_queue().await;

    let id = queue
        .enqueue(descriptor("/a"), RedispatchInterval::Q5Min)
        .await
        .unwrap();

    let raw = std::fs::read(dir.path().join(QUEUE_DOCUMENT)).unwrap();
    let document: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    let entry = &document[id.to_string()];
    assert_eq!(entry["executionTime"], "q5min");
    assert_eq!(entry["descriptor"]["method"], "POST");
    assert_eq!(entry["descriptor"]["urlRoot"], "https://api.example.com");
}

#[tokio::test]
async fn load_adopts_the_persisted_document_after_a_restart() {
    let (_dir, store, queue) = disk_queue().await;
    let id = queue
        .enqueue(descriptor("/a"), RedispatchInterval::Q1H)
        .await
        .unwrap();
    queue
        .enqueue(descriptor("/b"), RedispatchInterval::AtStart)
        .await
        .unwrap();

    // a fresh queue over the same store is a process restart
    let restarted = RetryQueue::new(store, JsonCodec::new());
    assert!(restarted.is_empty().await);
    let restored = restarted.load().await.unwrap();

    assert_eq!(restored, 2);
    assert!(restarted.contains(id).await);
    let due = restarted.due_entries(RedispatchInterval::Q1H).await;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].0, id);
    assert_eq!(due[0].1.descriptor, descriptor("/a"));
}

#[tokio::test]
async fn load_with_no_document_restores_nothing() {
    let (_dir, _store, queue) = disk_queue().await;
    assert_eq!(queue.load().await.unwrap(), 0);
    assert!(queue.is_empty().await);
}

#[tokio::test]
async fn corrupt_document_is_reported_and_memory_kept() {
    let (_dir, store, queue) = disk_queue().await;
    let id = queue
        .enqueue(descriptor("/a"), RedispatchInterval::Q5Min)
        .await
        .unwrap();

    store
        .write(&CacheLocation::from_path(QUEUE_DOCUMENT), b"{ truncated")
        .await
        .unwrap();

    let result = queue.load().await;
    assert!(matches!(result, Err(MuninnError::QueueCorrupt(_))));
    // in-memory state survives the failed adoption
    assert!(queue.contains(id).await);
}

#[tokio::test]
async fn remove_persists_the_shrunken_queue() {
    let (dir, _store, queue) = disk_queue().await;
    let id = queue
        .enqueue(descriptor("/a"), RedispatchInterval::Q5Min)
        .await
        .unwrap();
    let kept = queue
        .enqueue(descriptor("/b"), RedispatchInterval::Q5Min)
        .await
        .unwrap();

    assert!(queue.remove(id).await.unwrap());
    assert!(!queue.remove(id).await.unwrap());

    let raw = std::fs::read(dir.path().join(QUEUE_DOCUMENT)).unwrap();
    let document: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    let ids: Vec<_> = document.as_object().unwrap().keys().collect();
    assert_eq!(ids, [&kept.to_string()]);
}

#[tokio::test]
async fn due_entries_filters_by_interval() {
    let (_dir, _store, queue) = disk_queue().await;
    queue
        .enqueue(descriptor("/five"), RedispatchInterval::Q5Min)
        .await
        .unwrap();
    queue
        .enqueue(descriptor("/hour"), RedispatchInterval::Q1H)
        .await
        .unwrap();
    queue
        .enqueue(descriptor("/start"), RedispatchInterval::AtStart)
        .await
        .unwrap();

    assert_eq!(queue.due_entries(RedispatchInterval::Q5Min).await.len(), 1);
    assert_eq!(queue.due_entries(RedispatchInterval::Q1H).await.len(), 1);
    assert_eq!(queue.due_entries(RedispatchInterval::AtStart).await.len(), 1);
    assert_eq!(queue.due_entries(RedispatchInterval::Q1Daily).await.len(), 0);
    assert_eq!(queue.len().await, 3);
}

#[tokio::test]
async fn ids_are_unique_per_enqueue() {
    let (_dir, _store, queue) = disk_queue().await;
    let first = queue
        .enqueue(descriptor("/same"), RedispatchInterval::Q5Min)
        .await
        .unwrap();
    let second = queue
        .enqueue(descriptor("/same"), RedispatchInterval::Q5Min)
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(queue.len().await, 2);
}

#[tokio::test]
async fn discarding_store_keeps_entries_in_memory() {
    // NullStore accepts writes and reads back nothing: degraded mode.
    let queue = RetryQueue::new(Arc::new(NullStore), JsonCodec::new());

    let id = queue
        .enqueue(descriptor("/a"), RedispatchInterval::Q5Min)
        .await
        .unwrap();

    assert!(queue.contains(id).await);
    assert_eq!(queue.len().await, 1);
}
