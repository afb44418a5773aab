//! Builder for configuring resolution engines

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{DiskStore, NullStore};
use crate::codec::JsonCodec;
use crate::connectivity::ConnectivityMonitor;
use crate::error::{MuninnError, Result};
use crate::queue::RetryQueue;
use crate::resolver::Resolver;
use crate::traits::{CacheStore, Transport};
use crate::transport::HttpTransport;

/// Main entry point for creating resolution engines.
pub struct Muninn;

impl Muninn {
    /// Create a new builder for configuring an engine.
    pub fn builder() -> MuninnBuilder {
        MuninnBuilder::new()
    }
}

/// Builder for configuring resolution engines.
///
/// Every collaborator has a default: a [`DiskStore`] under the platform
/// cache directory, a reqwest-backed [`HttpTransport`], and a monitor
/// that starts online. Supply your own implementations to replace any of
/// them; tests typically inject a mock transport and a tempdir store.
pub struct MuninnBuilder {
    store_root: Option<PathBuf>,
    store: Option<Arc<dyn CacheStore>>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
    connectivity: Option<ConnectivityMonitor>,
    default_headers: BTreeMap<String, String>,
    restore_queue: bool,
}

impl MuninnBuilder {
    pub fn new() -> Self {
        Self {
            store_root: None,
            store: None,
            transport: None,
            timeout: None,
            connectivity: None,
            default_headers: BTreeMap::new(),
            restore_queue: true,
        }
    }

    /// Root directory for the disk cache store.
    ///
    /// Defaults to `muninn` under the platform cache directory. Ignored
    /// when a custom [`store`](Self::store) is supplied.
    pub fn store_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.store_root = Some(root.into());
        self
    }

    /// Use a custom cache store instead of the default [`DiskStore`].
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom transport instead of the default [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Per-request timeout for the default transport.
    ///
    /// Ignored when a custom [`transport`](Self::transport) is supplied;
    /// custom transports own their timeout policy.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Share an existing connectivity monitor with the engine.
    ///
    /// The application feeds reachability transitions into the monitor;
    /// the engine only reads it. Defaults to a monitor starting online.
    pub fn connectivity(mut self, monitor: ConnectivityMonitor) -> Self {
        self.connectivity = Some(monitor);
        self
    }

    /// Add an engine-level default header, sent on every dispatch unless
    /// the descriptor overrides the same key.
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Whether to adopt the persisted retry queue document during build,
    /// so restarts resume pending work. Defaults to true.
    pub fn restore_queue(mut self, restore: bool) -> Self {
        self.restore_queue = restore;
        self
    }

    /// Build the engine.
    ///
    /// Storage initialization failure does not abort: the engine falls
    /// back to [`NullStore`] and runs network-only, with no caching and
    /// no retry-queue persistence. Only configuration misuse returns an
    /// error here.
    pub async fn build(self) -> Result<Resolver> {
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(MuninnError::Configuration(
                    "transport timeout must be nonzero".into(),
                ));
            }
        }
        if self.default_headers.keys().any(|key| key.is_empty()) {
            return Err(MuninnError::Configuration(
                "default header names must be non-empty".into(),
            ));
        }

        let store = match self.store {
            Some(store) => store,
            None => Self::open_store(self.store_root).await,
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => match self.timeout {
                Some(timeout) => Arc::new(HttpTransport::with_timeout(timeout)),
                None => Arc::new(HttpTransport::new()),
            },
        };

        // Engine-level defaults: JSON bodies, and a no-cache pair so no
        // intermediary cache sits between this policy and the origin.
        // Builder-supplied headers win on collision.
        let mut default_headers = BTreeMap::from([
            (
                "Content-Type".to_string(),
                "application/json; charset=utf-8".to_string(),
            ),
            ("Cache-Control".to_string(), "no-cache".to_string()),
            ("Pragma".to_string(), "no-cache".to_string()),
        ]);
        default_headers.extend(self.default_headers);

        let codec = JsonCodec::new();
        let queue = Arc::new(RetryQueue::new(Arc::clone(&store), codec));
        if self.restore_queue {
            match queue.load().await {
                Ok(0) => {}
                Ok(restored) => tracing::debug!(restored, "restored persisted retry queue"),
                Err(error) => {
                    tracing::warn!(%error, "persisted retry queue not restored, starting empty")
                }
            }
        }

        let connectivity = self.connectivity.unwrap_or_default();

        Ok(Resolver::new(
            store,
            transport,
            codec,
            connectivity,
            queue,
            default_headers,
        ))
    }

    /// Open the disk store, degrading to [`NullStore`] when the base
    /// directory cannot be created.
    async fn open_store(root: Option<PathBuf>) -> Arc<dyn CacheStore> {
        let root = root.or_else(|| dirs::cache_dir().map(|dir| dir.join("muninn")));
        let Some(root) = root else {
            tracing::warn!("no cache directory available, running network-only");
            return Arc::new(NullStore);
        };
        match DiskStore::new(&root).await {
            Ok(store) => Arc::new(store),
            Err(error) => {
                tracing::warn!(root = %root.display(), %error, "cache store unavailable, running network-only");
                Arc::new(NullStore)
            }
        }
    }
}

impl Default for MuninnBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_timeout_is_a_configuration_error() {
        let result = Muninn::builder()
            .store(Arc::new(NullStore))
            .timeout(Duration::ZERO)
            .build()
            .await;
        assert!(matches!(result, Err(MuninnError::Configuration(_))));
    }

    #[tokio::test]
    async fn empty_header_name_is_a_configuration_error() {
        let result = Muninn::builder()
            .store(Arc::new(NullStore))
            .default_header("", "value")
            .build()
            .await;
        assert!(matches!(result, Err(MuninnError::Configuration(_))));
    }

    #[tokio::test]
    async fn unwritable_root_degrades_to_network_only() {
        let engine = Muninn::builder()
            .store_root("/proc/definitely/not/writable")
            .build()
            .await
            .unwrap();
        assert!(engine.queue().is_empty().await);
    }
}
