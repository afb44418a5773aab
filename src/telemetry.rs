//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `method` — HTTP method of the descriptor (e.g. "GET", "POST")
//! - `status` — terminal delivery status (e.g. "http", "no_network")
//! - `operation` — cache access path ("resolve" | "read")
//! - `interval` — redispatch interval (e.g. "q5min", "atStart")

/// Total resolutions that reached a terminal delivery.
///
/// Labels: `method`, `status` ("http" | "no_network" | "url_invalid" |
/// "preference_cache" | "fallback_cache").
pub const REQUESTS_TOTAL: &str = "muninn_requests_total";

/// Wall-clock duration of the network dispatch in seconds.
///
/// Labels: `method`.
pub const REQUEST_DURATION_SECONDS: &str = "muninn_request_duration_seconds";

/// Total cache reads that found a stored payload.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total cache reads that found nothing.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total cache write-backs that could not complete.
///
/// Labels: `reason` ("encode" | "storage").
pub const WRITEBACK_FAILURES_TOTAL: &str = "muninn_writeback_failures_total";

/// Total requests parked in the retry queue.
///
/// Labels: `interval`.
pub const QUEUE_ENQUEUED_TOTAL: &str = "muninn_queue_enqueued_total";

/// Current number of entries in the retry queue.
pub const QUEUE_DEPTH: &str = "muninn_queue_depth";

/// Total redispatch attempts from the retry queue.
///
/// Labels: `interval`, `outcome` ("confirmed" | "requeued").
pub const REDISPATCH_TOTAL: &str = "muninn_redispatch_total";
