//! Muninn - offline-first request resolution
//!
//! This crate unifies network retrieval, on-disk caching, and durable
//! retry queuing behind a single request abstraction, for applications
//! that must keep working under flaky or absent connectivity. The
//! caller describes one logical fetch as a [`RequestDescriptor`]; the
//! [`Resolver`] decides whether to serve it from disk cache, go to the
//! network, deliver stale cache while refreshing, or park it in the
//! durable [`RetryQueue`] for scheduled redispatch.
//!
//! # Example
//!
//! ```rust,no_run
//! use muninn::{FetchOptions, Method, Muninn, RedispatchInterval, RequestDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let engine = Muninn::builder()
//!         .store_root("/var/cache/my-app")
//!         .build()
//!         .await?;
//!
//!     let descriptor = RequestDescriptor::new("https://api.example.com", Method::Get)
//!         .path_segment("/reports/")
//!         .path_segment("daily")
//!         .prepopulate_with_cache(true);
//!
//!     let options = FetchOptions::default()
//!         .cache_response(true)
//!         .retry(RedispatchInterval::Q5Min);
//!
//!     // At most two deliveries: stale cache first (if present), then
//!     // the network result.
//!     let mut resolution = engine.resolve(descriptor, options);
//!     while let Some(delivery) = resolution.next_delivery().await {
//!         println!("{}: {} bytes", delivery.status, delivery.payload.map_or(0, |p| p.len()));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Connectivity is fed in by the application; the crate never probes
//! the network itself. Pair the engine with a [`Scheduler`] to retry
//! parked requests on their intervals once connectivity returns.

pub mod cache;
pub mod codec;
pub mod connectivity;
pub mod error;
pub mod queue;
pub mod resolver;
pub mod scheduler;
pub mod telemetry;
pub mod traits;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use error::{MuninnError, Result};
pub use resolver::{CachedObject, CachedPayload, Muninn, MuninnBuilder, Resolver};
pub use scheduler::Scheduler;

pub use cache::{CacheLocation, DiskStore, NullStore};
pub use codec::{EncodeProfile, JsonCodec};
pub use connectivity::ConnectivityMonitor;
pub use queue::{QueuedRequest, RetryQueue};
pub use traits::{CacheStore, Transport, WireRequest, WireResponse};
pub use transport::HttpTransport;

// Re-export all types
pub use types::{
    CacheRecency, Delivery, FetchOptions, Method, RedispatchInterval, RequestDescriptor,
    Resolution, ResolutionStatus, ResponseParts,
};
