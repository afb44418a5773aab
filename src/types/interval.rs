//! Redispatch interval vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Named periods on which queued requests are retried.
///
/// `AtStart` and `Immediately` carry no periodic timer. They are drained
/// only by explicit triggers such as application start, never by the
/// [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedispatchInterval {
    #[serde(rename = "atStart")]
    AtStart,
    Immediately,
    Q5Sec,
    Q1Min,
    Q5Min,
    Q10Min,
    Q15Min,
    Q30Min,
    Q1H,
    Q2H,
    Q4H,
    Q6H,
    Q12H,
    Q1Daily,
}

impl RedispatchInterval {
    /// Every interval value, in ascending period order.
    pub const ALL: [RedispatchInterval; 14] = [
        Self::AtStart,
        Self::Immediately,
        Self::Q5Sec,
        Self::Q1Min,
        Self::Q5Min,
        Self::Q10Min,
        Self::Q15Min,
        Self::Q30Min,
        Self::Q1H,
        Self::Q2H,
        Self::Q4H,
        Self::Q6H,
        Self::Q12H,
        Self::Q1Daily,
    ];

    /// Timer period, or `None` for the trigger-only intervals.
    pub fn period(&self) -> Option<Duration> {
        let secs = match self {
            Self::AtStart | Self::Immediately => return None,
            Self::Q5Sec => 5,
            Self::Q1Min => 60,
            Self::Q5Min => 300,
            Self::Q10Min => 600,
            Self::Q15Min => 900,
            Self::Q30Min => 1800,
            Self::Q1H => 3600,
            Self::Q2H => 7200,
            Self::Q4H => 14400,
            Self::Q6H => 21600,
            Self::Q12H => 43200,
            Self::Q1Daily => 86400,
        };
        Some(Duration::from_secs(secs))
    }

    /// Wire name, matching the persisted queue document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtStart => "atStart",
            Self::Immediately => "immediately",
            Self::Q5Sec => "q5sec",
            Self::Q1Min => "q1min",
            Self::Q5Min => "q5min",
            Self::Q10Min => "q10min",
            Self::Q15Min => "q15min",
            Self::Q30Min => "q30min",
            Self::Q1H => "q1h",
            Self::Q2H => "q2h",
            Self::Q4H => "q4h",
            Self::Q6H => "q6h",
            Self::Q12H => "q12h",
            Self::Q1Daily => "q1daily",
        }
    }
}

impl fmt::Display for RedispatchInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_intervals_have_no_period() {
        assert_eq!(RedispatchInterval::AtStart.period(), None);
        assert_eq!(RedispatchInterval::Immediately.period(), None);
    }

    #[test]
    fn periodic_intervals_ascend() {
        let periods: Vec<Duration> = RedispatchInterval::ALL
            .iter()
            .filter_map(|interval| interval.period())
            .collect();
        assert_eq!(periods.len(), 12);
        for pair in periods.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(periods[0], Duration::from_secs(5));
        assert_eq!(periods[11], Duration::from_secs(86400));
    }

    #[test]
    fn serde_names_match_wire_format() {
        for interval in RedispatchInterval::ALL {
            let json = serde_json::to_string(&interval).unwrap();
            assert_eq!(json, format!("\"{}\"", interval.as_str()));
            let back: RedispatchInterval = serde_json::from_str(&json).unwrap();
            assert_eq!(back, interval);
        }
    }

    #[test]
    fn at_start_round_trips_camel_case() {
        let parsed: RedispatchInterval = serde_json::from_str("\"atStart\"").unwrap();
        assert_eq!(parsed, RedispatchInterval::AtStart);
    }
}
