//! Request descriptor and HTTP method types

use crate::cache::CacheLocation;
use crate::types::CacheRecency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// HTTP method for a request descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one logical fetch.
///
/// A descriptor captures everything the resolution engine needs: the
/// target address (root plus ordered path segments), method, body,
/// headers, and the caching preferences that steer the cache-vs-network
/// decision. Descriptors are plain values; hash and equality cover every
/// field so callers can deduplicate identical fetches.
///
/// The same descriptor always maps to the same [`CacheLocation`]: the
/// location is derived only from `url_root`, `path_segments`, and
/// `cache_path_suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub url_root: String,
    pub path_segments: Vec<String>,
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<Vec<u8>>,
    pub auth_headers: BTreeMap<String, String>,
    pub auxiliary_headers: BTreeMap<String, String>,
    /// Freshness threshold under which the cache is authoritative and
    /// the network is never contacted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preferred_cache_duration: Option<Duration>,
    /// Deliver stale cache immediately, then the network result when it
    /// arrives (two deliveries).
    pub prepopulate_with_cache: bool,
    /// Sub-partitions the cache namespace beyond the URL-derived path.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cache_path_suffix: Option<String>,
}

impl RequestDescriptor {
    pub fn new(url_root: impl Into<String>, method: Method) -> Self {
        Self {
            url_root: url_root.into(),
            path_segments: Vec::new(),
            method,
            body: None,
            auth_headers: BTreeMap::new(),
            auxiliary_headers: BTreeMap::new(),
            preferred_cache_duration: None,
            prepopulate_with_cache: false,
            cache_path_suffix: None,
        }
    }

    pub fn path_segment(mut self, segment: impl Into<String>) -> Self {
        self.path_segments.push(segment.into());
        self
    }

    pub fn path_segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_segments.extend(segments.into_iter().map(Into::into));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn auth_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_headers.insert(key.into(), value.into());
        self
    }

    pub fn auxiliary_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.auxiliary_headers.insert(key.into(), value.into());
        self
    }

    pub fn preferred_cache_duration(mut self, duration: Duration) -> Self {
        self.preferred_cache_duration = Some(duration);
        self
    }

    /// Convenience form of [`preferred_cache_duration`](Self::preferred_cache_duration)
    /// taking a named threshold.
    pub fn preferred_recency(mut self, recency: CacheRecency) -> Self {
        self.preferred_cache_duration = Some(recency.duration());
        self
    }

    pub fn prepopulate_with_cache(mut self, prepopulate: bool) -> Self {
        self.prepopulate_with_cache = prepopulate;
        self
    }

    pub fn cache_path_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.cache_path_suffix = Some(suffix.into());
        self
    }

    /// Full target address: the root with every path segment appended in
    /// order. Segments are concatenated verbatim and carry their own
    /// separators.
    pub fn absolute_path(&self) -> String {
        let mut path = self.url_root.clone();
        for segment in &self.path_segments {
            path.push_str(segment);
        }
        path
    }

    /// The path segments alone, concatenated in order.
    pub fn relative_path(&self) -> String {
        self.path_segments.concat()
    }

    /// Headers as sent on the wire: auxiliary headers override auth
    /// headers on key collision.
    pub fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.auth_headers.clone();
        headers.extend(
            self.auxiliary_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        headers
    }

    /// Deterministic storage key for this descriptor's cache entry.
    pub fn cache_location(&self) -> CacheLocation {
        CacheLocation::for_request(
            &self.url_root,
            &self.path_segments,
            self.cache_path_suffix.as_deref(),
        )
    }
}
