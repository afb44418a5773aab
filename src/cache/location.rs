//! Deterministic cache locations

use std::fmt;
use std::path::{Path, PathBuf};

/// Leaf file name for request cache entries.
const OBJECT_FILE: &str = "object.json";

/// A relative storage path under the cache root.
///
/// Request locations are a pure function of `(url_root, path_segments,
/// cache_path_suffix)`: the same request identity always maps to the
/// same path, and any difference in the suffix yields a different path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheLocation {
    relative: PathBuf,
}

impl CacheLocation {
    /// Derive the location for a request identity.
    ///
    /// The root's scheme is dropped, then root, segments, and suffix are
    /// split on `/`, each piece sanitized to filesystem-safe characters,
    /// and joined with `object.json` as the leaf.
    pub fn for_request(url_root: &str, segments: &[String], suffix: Option<&str>) -> Self {
        let host_path = url_root
            .split_once("://")
            .map_or(url_root, |(_, rest)| rest);

        let mut relative = PathBuf::new();
        for part in sanitized_components(host_path) {
            relative.push(part);
        }
        for segment in segments {
            for part in sanitized_components(segment) {
                relative.push(part);
            }
        }
        if let Some(suffix) = suffix {
            for part in sanitized_components(suffix) {
                relative.push(part);
            }
        }
        relative.push(OBJECT_FILE);
        Self { relative }
    }

    /// Wrap an explicit relative path, e.g. the retry queue document.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            relative: path.into(),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.relative
    }
}

impl fmt::Display for CacheLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative.display())
    }
}

fn sanitized_components(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split('/').filter(|part| !part.is_empty()).map(sanitize)
}

fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    // all-dot names are path navigation, not identity
    if cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}
