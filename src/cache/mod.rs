//! On-disk caching of response payloads.
//!
//! Cache entries are opaque byte files addressed by [`CacheLocation`],
//! a deterministic path derived from request identity. There is no
//! explicit expiry: freshness is computed at read time from the file's
//! modification timestamp against a caller-supplied threshold, so the
//! same entry can be fresh for one caller and stale for another.

mod disk;
mod location;

pub use disk::{DiskStore, NullStore};
pub use location::CacheLocation;
