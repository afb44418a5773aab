//! The request resolution engine

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::cache::CacheLocation;
use crate::codec::JsonCodec;
use crate::connectivity::ConnectivityMonitor;
use crate::queue::RetryQueue;
use crate::telemetry;
use crate::traits::{CacheStore, Transport, WireRequest, WireResponse};
use crate::types::{
    CacheRecency, Delivery, FetchOptions, RedispatchInterval, RequestDescriptor, Resolution,
    ResolutionStatus, ResponseParts,
};

/// A raw cache hit with its age bookkeeping.
#[derive(Debug, Clone)]
pub struct CachedPayload {
    pub bytes: Vec<u8>,
    pub modified_at: SystemTime,
    pub age: Duration,
    /// Whether the age satisfied the requested recency.
    pub fresh: bool,
}

/// A decoded cache hit with its age bookkeeping.
#[derive(Debug, Clone)]
pub struct CachedObject<T> {
    pub object: T,
    pub modified_at: SystemTime,
    pub age: Duration,
    pub fresh: bool,
}

/// Outcome of one transport dispatch attempt.
enum Dispatch {
    /// The server answered, with any HTTP status.
    Response(WireResponse),
    /// The connection itself failed after the address parsed.
    ConnectionFailed(reqwest::Url),
    /// The descriptor's address does not parse as a URL.
    InvalidUrl,
}

/// The resolution engine: decides cache-vs-network-vs-queue for each
/// descriptor and owns the collaborators that carry it out.
///
/// Build one per application context through
/// [`Muninn::builder`](crate::Muninn::builder) and share it behind an
/// [`Arc`]; clones share the store, transport, queue, and monitor.
///
/// For each call to [`resolve`](Self::resolve) the engine walks a fixed
/// decision ladder: preference-duration cache shortcut, optional
/// prepopulation delivery, connectivity gate (parking the request in the
/// retry queue when offline), address validation, then one transport
/// dispatch with an asynchronous cache write-back. Each rung is
/// authoritative; once a terminal branch is taken the rest are skipped.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn CacheStore>,
    transport: Arc<dyn Transport>,
    codec: JsonCodec,
    connectivity: ConnectivityMonitor,
    queue: Arc<RetryQueue>,
    default_headers: BTreeMap<String, String>,
}

impl Resolver {
    pub(crate) fn new(
        store: Arc<dyn CacheStore>,
        transport: Arc<dyn Transport>,
        codec: JsonCodec,
        connectivity: ConnectivityMonitor,
        queue: Arc<RetryQueue>,
        default_headers: BTreeMap<String, String>,
    ) -> Self {
        Self {
            store,
            transport,
            codec,
            connectivity,
            queue,
            default_headers,
        }
    }

    /// Resolve one descriptor into a stream of deliveries.
    ///
    /// Yields at most two items: a prepopulation delivery when the
    /// descriptor asks for one and the cache has bytes, then exactly one
    /// terminal delivery. The resolution runs on a spawned task, so
    /// dropping the stream abandons the deliveries but cache write-back
    /// and queue persistence still complete. Must be called within a
    /// tokio runtime.
    pub fn resolve(&self, descriptor: RequestDescriptor, options: FetchOptions) -> Resolution {
        let (tx, resolution) = Resolution::channel();
        let engine = self.clone();
        tokio::spawn(async move {
            engine.run_resolution(descriptor, options, tx).await;
        });
        resolution
    }

    /// The retry queue owned by this engine.
    pub fn queue(&self) -> &RetryQueue {
        &self.queue
    }

    /// The connectivity monitor owned by this engine.
    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    /// Read the cache entry for a descriptor without touching the network.
    ///
    /// Returns the payload even when it is older than `recency`; the
    /// `fresh` flag tells the caller which side of the threshold it is
    /// on. `None` only on a true miss.
    pub async fn read_cache_raw(
        &self,
        descriptor: &RequestDescriptor,
        recency: CacheRecency,
    ) -> Option<CachedPayload> {
        let location = descriptor.cache_location();
        let (payload, modified_at) = self.read_entry(&location, "read").await;
        let bytes = payload?;
        let modified_at = modified_at?;
        let age = age_of(modified_at);
        let fresh = !recency.is_stale(age);
        if !fresh {
            tracing::debug!(
                %location,
                age_secs = age.as_secs(),
                limit_secs = recency.duration().as_secs(),
                "cache entry present but stale"
            );
        }
        Some(CachedPayload {
            bytes,
            modified_at,
            age,
            fresh,
        })
    }

    /// Typed form of [`read_cache_raw`](Self::read_cache_raw).
    ///
    /// A payload that does not decode as `T` is treated as a miss.
    pub async fn read_cached<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
        recency: CacheRecency,
    ) -> Option<CachedObject<T>> {
        let cached = self.read_cache_raw(descriptor, recency).await?;
        match self.codec.decode::<T>(&cached.bytes) {
            Ok(object) => Some(CachedObject {
                object,
                modified_at: cached.modified_at,
                age: cached.age,
                fresh: cached.fresh,
            }),
            Err(error) => {
                tracing::debug!(%error, "cached payload did not match expected shape");
                None
            }
        }
    }

    /// One redispatch pass over the entries tagged with `interval`.
    ///
    /// Skipped entirely while offline. Entries are snapshotted first and
    /// dispatched outside the queue lock, so a pass never blocks new
    /// enqueues. Cache shortcuts do not apply here; this path exists
    /// precisely because the network was down when the request was
    /// parked. Returns how many entries were confirmed and removed.
    pub async fn redispatch_due(&self, interval: RedispatchInterval) -> usize {
        if !self.connectivity.current() {
            tracing::debug!(%interval, "skipping redispatch pass, still offline");
            return 0;
        }
        let due = self.queue.due_entries(interval).await;
        if due.is_empty() {
            return 0;
        }
        tracing::debug!(%interval, pending = due.len(), "starting redispatch pass");

        let mut confirmed = 0;
        for (id, queued) in due {
            match self.dispatch(&queued.descriptor).await {
                Dispatch::Response(response) if (200..300).contains(&response.status) => {
                    if let Err(error) = self.queue.remove(id).await {
                        tracing::warn!(%id, %error, "confirmed entry could not be persisted as removed");
                    }
                    confirmed += 1;
                    metrics::counter!(
                        telemetry::REDISPATCH_TOTAL,
                        "interval" => interval.as_str(),
                        "outcome" => "confirmed"
                    )
                    .increment(1);
                    tracing::debug!(%id, status = response.status, "queued request confirmed");
                }
                Dispatch::Response(response) => {
                    metrics::counter!(
                        telemetry::REDISPATCH_TOTAL,
                        "interval" => interval.as_str(),
                        "outcome" => "requeued"
                    )
                    .increment(1);
                    tracing::debug!(
                        %id,
                        status = response.status,
                        "queued request not confirmed, staying queued"
                    );
                }
                Dispatch::ConnectionFailed(_) | Dispatch::InvalidUrl => {
                    metrics::counter!(
                        telemetry::REDISPATCH_TOTAL,
                        "interval" => interval.as_str(),
                        "outcome" => "requeued"
                    )
                    .increment(1);
                    tracing::debug!(%id, "queued request still undeliverable");
                }
            }
        }
        confirmed
    }

    /// Drain the trigger-only intervals.
    ///
    /// Call once connectivity is up, typically at application start.
    pub async fn drain_startup(&self) -> usize {
        self.redispatch_due(RedispatchInterval::AtStart).await
            + self.redispatch_due(RedispatchInterval::Immediately).await
    }

    async fn run_resolution(
        self,
        descriptor: RequestDescriptor,
        options: FetchOptions,
        tx: mpsc::Sender<Delivery>,
    ) {
        let location = descriptor.cache_location();
        let (cached_payload, modified_at) = self.read_entry(&location, "resolve").await;

        // Preference shortcut: a hit younger than the preferred duration
        // is authoritative and the network is never contacted. Equality
        // favors the cache.
        if !options.force_network {
            if let (Some(limit), Some(bytes), Some(modified)) = (
                descriptor.preferred_cache_duration,
                cached_payload.as_ref(),
                modified_at,
            ) {
                let age = age_of(modified);
                if age <= limit {
                    tracing::debug!(%location, age_secs = age.as_secs(), "serving preference cache");
                    let status = ResolutionStatus::UsingPreferenceCache;
                    record_terminal(&descriptor, status);
                    send(
                        &tx,
                        Delivery {
                            payload: Some(bytes.clone()),
                            url: parsed_url(&descriptor),
                            response: None,
                            status,
                        },
                    )
                    .await;
                    return;
                }
            }
        }

        // Prepopulation: stale bytes now, network result later.
        if descriptor.prepopulate_with_cache {
            if let Some(bytes) = cached_payload.as_ref() {
                tracing::debug!(%location, "delivering prepopulation cache");
                send(
                    &tx,
                    Delivery {
                        payload: Some(bytes.clone()),
                        url: parsed_url(&descriptor),
                        response: None,
                        status: ResolutionStatus::UsingPrepopulationCache,
                    },
                )
                .await;
            }
        }

        // Connectivity gate: park for retry when offline.
        if !self.connectivity.current() {
            if let Some(interval) = options.retry {
                match self.queue.enqueue(descriptor.clone(), interval).await {
                    Ok(id) => tracing::debug!(%id, %interval, "parked request for retry"),
                    Err(error) => {
                        tracing::warn!(%error, "retry entry kept in memory but not persisted")
                    }
                }
            }
            let status = ResolutionStatus::NoNetworkAvailable;
            record_terminal(&descriptor, status);
            send(
                &tx,
                Delivery {
                    payload: cached_payload,
                    url: parsed_url(&descriptor),
                    response: None,
                    status,
                },
            )
            .await;
            return;
        }

        let delivery = match self.dispatch(&descriptor).await {
            Dispatch::InvalidUrl => Delivery {
                payload: cached_payload,
                url: None,
                response: None,
                status: ResolutionStatus::UrlInvalid,
            },
            Dispatch::ConnectionFailed(url) => {
                let status = if cached_payload.is_some() {
                    ResolutionStatus::UsingFallbackCache
                } else {
                    ResolutionStatus::NoNetworkAvailable
                };
                Delivery {
                    payload: cached_payload,
                    url: Some(url),
                    response: None,
                    status,
                }
            }
            Dispatch::Response(response) => {
                // Write-back runs off the delivery path and only ever
                // stores the network's own bytes. Falling back to cached
                // bytes must not refresh the entry's timestamp.
                if options.cache_response && !response.body.is_empty() {
                    self.spawn_write_back(location, response.body.clone());
                }
                let payload = if response.body.is_empty() {
                    cached_payload
                } else {
                    Some(response.body)
                };
                Delivery {
                    payload,
                    url: Some(response.url),
                    response: Some(ResponseParts {
                        status: response.status,
                        headers: response.headers,
                    }),
                    status: ResolutionStatus::Http(response.status),
                }
            }
        };

        record_terminal(&descriptor, delivery.status);
        send(&tx, delivery).await;
    }

    /// Address validation, header merge, and a single transport dispatch.
    async fn dispatch(&self, descriptor: &RequestDescriptor) -> Dispatch {
        let address = descriptor.absolute_path();
        let url = match reqwest::Url::parse(&address) {
            Ok(url) => url,
            Err(error) => {
                tracing::warn!(%address, %error, "descriptor address is not a valid URL");
                return Dispatch::InvalidUrl;
            }
        };

        // Engine defaults first, descriptor headers win on collision.
        let mut headers = self.default_headers.clone();
        headers.extend(descriptor.effective_headers());

        let request = WireRequest {
            method: descriptor.method,
            url: url.clone(),
            headers,
            body: descriptor.body.clone(),
        };

        tracing::debug!(
            method = %descriptor.method,
            %url,
            transport = self.transport.name(),
            "dispatching request"
        );
        let started = Instant::now();
        let result = self.transport.send(request).await;
        metrics::histogram!(
            telemetry::REQUEST_DURATION_SECONDS,
            "method" => descriptor.method.as_str()
        )
        .record(started.elapsed().as_secs_f64());

        match result {
            Ok(response) => Dispatch::Response(response),
            Err(error) => {
                tracing::warn!(method = %descriptor.method, %url, %error, "transport dispatch failed");
                Dispatch::ConnectionFailed(url)
            }
        }
    }

    /// Cache payload and modification time at one location. Store errors
    /// degrade to a miss; resolution never fails on a broken cache.
    async fn read_entry(
        &self,
        location: &CacheLocation,
        operation: &'static str,
    ) -> (Option<Vec<u8>>, Option<SystemTime>) {
        let payload = match self.store.read(location).await {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(%location, %error, "cache read failed");
                None
            }
        };
        let modified_at = match self.store.modified_at(location).await {
            Ok(modified) => modified,
            Err(error) => {
                tracing::warn!(%location, %error, "cache metadata read failed");
                None
            }
        };
        if payload.is_some() {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => operation).increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => operation)
                .increment(1);
        }
        (payload, modified_at)
    }

    /// Re-encode the payload under the local-cache profile and store it,
    /// off the delivery path. Failures are logged and swallowed; caching
    /// is a side effect, never part of the delivery contract.
    fn spawn_write_back(&self, location: CacheLocation, bytes: Vec<u8>) {
        let store = Arc::clone(&self.store);
        let codec = self.codec;
        tokio::spawn(async move {
            match codec.recode_for_cache(&bytes) {
                Ok(document) => {
                    if let Err(error) = store.write(&location, &document).await {
                        metrics::counter!(
                            telemetry::WRITEBACK_FAILURES_TOTAL,
                            "reason" => "storage"
                        )
                        .increment(1);
                        tracing::warn!(%location, %error, "cache write-back failed");
                    }
                }
                Err(error) => {
                    metrics::counter!(telemetry::WRITEBACK_FAILURES_TOTAL, "reason" => "encode")
                        .increment(1);
                    tracing::debug!(%location, %error, "response payload is not cacheable JSON");
                }
            }
        });
    }
}

async fn send(tx: &mpsc::Sender<Delivery>, delivery: Delivery) {
    // a dropped receiver abandons deliveries, not side effects
    let _ = tx.send(delivery).await;
}

fn record_terminal(descriptor: &RequestDescriptor, status: ResolutionStatus) {
    metrics::counter!(
        telemetry::REQUESTS_TOTAL,
        "method" => descriptor.method.as_str(),
        "status" => status.label()
    )
    .increment(1);
}

fn parsed_url(descriptor: &RequestDescriptor) -> Option<reqwest::Url> {
    reqwest::Url::parse(&descriptor.absolute_path()).ok()
}

fn age_of(modified: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO)
}
