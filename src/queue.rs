//! Durable retry queue for offline requests.
//!
//! Requests that could not be dispatched for lack of connectivity are
//! parked here, tagged with a redispatch interval, and persisted through
//! the cache store so they survive process restarts. Entries leave the
//! queue only when a redispatch attempt is confirmed with an HTTP 2xx;
//! every failure leaves them in place for the next pass.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cache::CacheLocation;
use crate::codec::{EncodeProfile, JsonCodec};
use crate::error::{MuninnError, Result};
use crate::telemetry;
use crate::traits::CacheStore;
use crate::types::{RedispatchInterval, RequestDescriptor};

/// File name of the persisted queue document at the store root.
pub const QUEUE_DOCUMENT: &str = "requests.json";

/// One parked request with its redispatch interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedRequest {
    pub descriptor: RequestDescriptor,
    pub execution_time: RedispatchInterval,
}

/// Durable, id-keyed collection of not-yet-confirmed requests.
///
/// The in-memory map is the single piece of shared mutable state in the
/// crate; every mutation takes the one lock, so a removal racing a new
/// enqueue can never lose an update. Persistence is always a
/// full-snapshot write of the map as one JSON document, followed by a
/// read-back that adopts what the store actually holds rather than
/// trusting the write blindly.
pub struct RetryQueue {
    store: Arc<dyn CacheStore>,
    codec: JsonCodec,
    entries: Mutex<BTreeMap<Uuid, QueuedRequest>>,
}

impl RetryQueue {
    pub fn new(store: Arc<dyn CacheStore>, codec: JsonCodec) -> Self {
        Self {
            store,
            codec,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn location() -> CacheLocation {
        CacheLocation::from_path(QUEUE_DOCUMENT)
    }

    /// Adopt the persisted document, replacing the in-memory state.
    ///
    /// Returns the number of restored entries; `Ok(0)` when no document
    /// has been persisted yet. A document that exists but does not
    /// decode is reported as [`MuninnError::QueueCorrupt`] and leaves
    /// the in-memory state untouched.
    pub async fn load(&self) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let Some(raw) = self.store.read(&Self::location()).await? else {
            return Ok(0);
        };
        let adopted: BTreeMap<Uuid, QueuedRequest> = self
            .codec
            .decode(&raw)
            .map_err(|e| MuninnError::QueueCorrupt(e.to_string()))?;
        *entries = adopted;
        record_depth(entries.len());
        Ok(entries.len())
    }

    /// Park a request under a freshly generated id and persist the queue.
    ///
    /// On persistence failure the entry stays in memory and the error is
    /// returned; the queue keeps serving it for the life of the process.
    pub async fn enqueue(
        &self,
        descriptor: RequestDescriptor,
        interval: RedispatchInterval,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let mut entries = self.entries.lock().await;
        entries.insert(
            id,
            QueuedRequest {
                descriptor,
                execution_time: interval,
            },
        );
        metrics::counter!(telemetry::QUEUE_ENQUEUED_TOTAL, "interval" => interval.as_str())
            .increment(1);
        let persisted = self.persist_and_adopt(&mut entries).await;
        record_depth(entries.len());
        persisted.map(|()| id)
    }

    /// Remove a confirmed entry and persist the queue.
    ///
    /// Returns whether the id was present.
    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        if entries.remove(&id).is_none() {
            return Ok(false);
        }
        let persisted = self.persist_and_adopt(&mut entries).await;
        record_depth(entries.len());
        persisted.map(|()| true)
    }

    /// Snapshot of the entries tagged with the given interval.
    pub async fn due_entries(&self, interval: RedispatchInterval) -> Vec<(Uuid, QueuedRequest)> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|(_, queued)| queued.execution_time == interval)
            .map(|(id, queued)| (*id, queued.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.entries.lock().await.contains_key(&id)
    }

    /// Write the whole map as one document, read it back, and adopt what
    /// the store returns.
    ///
    /// A store that discards writes (degraded mode) reads back `None`;
    /// the in-memory state is kept in that case and on any read-back
    /// failure, since memory is then the best copy available.
    async fn persist_and_adopt(&self, entries: &mut BTreeMap<Uuid, QueuedRequest>) -> Result<()> {
        let document = self.codec.encode(&*entries, EncodeProfile::Wire)?;
        self.store.write(&Self::location(), &document).await?;
        match self.store.read(&Self::location()).await {
            Ok(Some(raw)) => match self.codec.decode::<BTreeMap<Uuid, QueuedRequest>>(&raw) {
                Ok(adopted) => *entries = adopted,
                Err(error) => {
                    tracing::warn!(%error, "queue document failed read-back decode, keeping in-memory state");
                }
            },
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "queue document read-back failed, keeping in-memory state");
            }
        }
        Ok(())
    }
}

fn record_depth(len: usize) {
    metrics::gauge!(telemetry::QUEUE_DEPTH).set(len as f64);
}
