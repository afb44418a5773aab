//! Resolution status codes

use std::fmt;

/// Outcome of one resolution delivery.
///
/// Real HTTP statuses pass through untouched in `Http`. Everything the
/// engine decides locally is reported through a sentinel variant whose
/// numeric code sits at 1000 and above, outside the HTTP range, so the
/// two can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStatus {
    /// Pass-through HTTP status from the origin server.
    Http(u16),
    /// No network path was available and no fresher source existed.
    NoNetworkAvailable,
    /// The descriptor's absolute path does not parse as a URL.
    UrlInvalid,
    /// Stale cache delivered ahead of an in-flight network attempt.
    UsingPrepopulationCache,
    /// Cache younger than the preferred duration; network was skipped.
    UsingPreferenceCache,
    /// Cache served after the network attempt failed at the connection level.
    UsingFallbackCache,
}

impl ResolutionStatus {
    /// Numeric code for this status.
    ///
    /// Sentinels occupy 1000..=1004; HTTP statuses keep their own value.
    pub fn code(&self) -> u16 {
        match self {
            Self::Http(code) => *code,
            Self::NoNetworkAvailable => 1000,
            Self::UrlInvalid => 1001,
            Self::UsingPrepopulationCache => 1002,
            Self::UsingPreferenceCache => 1003,
            Self::UsingFallbackCache => 1004,
        }
    }

    /// True when this is a pass-through HTTP status rather than a sentinel.
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// True for an HTTP 2xx status. Sentinels are never successes; the
    /// retry queue keys entry removal off this.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Http(code) if (200..300).contains(code))
    }

    /// True when the delivered payload came from the cache store.
    pub fn served_from_cache(&self) -> bool {
        matches!(
            self,
            Self::UsingPrepopulationCache | Self::UsingPreferenceCache | Self::UsingFallbackCache
        )
    }

    /// Short metric label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::NoNetworkAvailable => "no_network",
            Self::UrlInvalid => "url_invalid",
            Self::UsingPrepopulationCache => "prepopulation_cache",
            Self::UsingPreferenceCache => "preference_cache",
            Self::UsingFallbackCache => "fallback_cache",
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{code}"),
            other => f.write_str(other.label()),
        }
    }
}
