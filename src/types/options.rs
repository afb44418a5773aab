//! Per-call fetch options

use crate::types::RedispatchInterval;

/// Options for one resolution call, orthogonal to the descriptor.
///
/// The descriptor says *what* to fetch; these say what to do with the
/// outcome: whether to write a successful response back to the cache,
/// whether to park the request for retry when offline, and whether to
/// skip the cache-preference shortcut entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Write a successful network response back to the cache store.
    pub cache_response: bool,
    /// Park the request in the retry queue at this interval when no
    /// network is available.
    pub retry: Option<RedispatchInterval>,
    /// Ignore the preference-duration shortcut and always attempt the
    /// network. Prepopulation deliveries still happen.
    pub force_network: bool,
}

impl FetchOptions {
    pub fn cache_response(mut self, cache: bool) -> Self {
        self.cache_response = cache;
        self
    }

    pub fn retry(mut self, interval: RedispatchInterval) -> Self {
        self.retry = Some(interval);
        self
    }

    pub fn force_network(mut self, force: bool) -> Self {
        self.force_network = force;
        self
    }
}
