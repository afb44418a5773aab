//! Boundary traits for transport and storage

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;

use crate::Result;
use crate::cache::CacheLocation;
use crate::types::Method;

/// A fully prepared transport request: validated URL, merged headers,
/// optional body. Built by the resolution engine in step order, never by
/// callers directly.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: Method,
    pub url: reqwest::Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

/// The transport's answer: status line, headers, body bytes, and the
/// effective URL after any redirects.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub url: reqwest::Url,
}

/// Black-box byte transport: send a request, get a response.
///
/// One attempt per call, no internal retry, no transparent caching. Any
/// response that carries an HTTP status is `Ok`, including 4xx and 5xx;
/// `Err` means the connection itself failed (DNS, TLS, refused, timeout).
/// The resolution engine relies on that split to tell "the server said
/// no" apart from "the network is gone".
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &str;

    /// Dispatch one request.
    async fn send(&self, request: WireRequest) -> Result<WireResponse>;
}

/// Persistent byte storage addressed by [`CacheLocation`].
///
/// Concurrent operations on *different* locations must not interfere.
/// Same-location concurrent writes are last-writer-wins; callers that
/// need stronger coordination serialize above this trait, the way the
/// retry queue does.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Write bytes, creating any missing parent directories.
    async fn write(&self, location: &CacheLocation, bytes: &[u8]) -> Result<()>;

    /// Read the payload, or `None` when nothing is stored there.
    async fn read(&self, location: &CacheLocation) -> Result<Option<Vec<u8>>>;

    /// Last modification time, or `None` when nothing is stored there.
    async fn modified_at(&self, location: &CacheLocation) -> Result<Option<SystemTime>>;

    /// Create a directory (and parents) under the store root.
    async fn ensure_dir(&self, path: &Path) -> Result<()>;
}
