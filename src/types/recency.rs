//! Named cache freshness thresholds

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Named freshness thresholds for cache reads.
///
/// A convenience vocabulary over raw durations. `Infinity` accepts any
/// cache entry regardless of age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheRecency {
    Minute,
    Minute5,
    Minute15,
    Minute30,
    Hour,
    Hour2,
    Hour4,
    Hour8,
    Hour12,
    Day,
    Week,
    Infinity,
}

impl CacheRecency {
    /// The threshold as a duration.
    pub fn duration(&self) -> Duration {
        let secs = match self {
            Self::Minute => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour => 3600,
            Self::Hour2 => 7200,
            Self::Hour4 => 14400,
            Self::Hour8 => 28800,
            Self::Hour12 => 43200,
            Self::Day => 86400,
            Self::Week => 604800,
            Self::Infinity => 9_999_999_999,
        };
        Duration::from_secs(secs)
    }

    /// True when an entry of the given age no longer satisfies this
    /// threshold. Equality favors the cache: an entry aged exactly the
    /// threshold is still fresh.
    pub fn is_stale(&self, age: Duration) -> bool {
        age > self.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_scale_in_order() {
        let ordered = [
            CacheRecency::Minute,
            CacheRecency::Minute5,
            CacheRecency::Minute15,
            CacheRecency::Minute30,
            CacheRecency::Hour,
            CacheRecency::Hour2,
            CacheRecency::Hour4,
            CacheRecency::Hour8,
            CacheRecency::Hour12,
            CacheRecency::Day,
            CacheRecency::Week,
            CacheRecency::Infinity,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].duration() < pair[1].duration());
        }
    }

    #[test]
    fn staleness_boundary_favors_cache() {
        let recency = CacheRecency::Minute5;
        assert!(!recency.is_stale(Duration::from_secs(299)));
        assert!(!recency.is_stale(Duration::from_secs(300)));
        assert!(recency.is_stale(Duration::from_secs(301)));
    }

    #[test]
    fn infinity_never_goes_stale() {
        assert!(!CacheRecency::Infinity.is_stale(Duration::from_secs(50 * 365 * 86400)));
    }
}
