//! Reward windows and totals.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookback window of a reward total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RewardWindow {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl RewardWindow {
    /// All windows in display order.
    pub const ALL: [RewardWindow; 3] = [Self::Day, Self::Week, Self::Month];

    /// Length of the window in days.
    pub fn days(self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    /// Slot index inside an aggregate record.
    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Day => 0,
            Self::Week => 1,
            Self::Month => 2,
        }
    }

    /// `(min_time, max_time)` for a window ending at `now`.
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::days(self.days()), now)
    }
}

impl fmt::Display for RewardWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "24h"),
            Self::Week => write!(f, "7d"),
            Self::Month => write!(f, "30d"),
        }
    }
}

/// Summary statistics the API reports alongside a reward sum.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardStats {
    /// Sum in bones (integer base units).
    pub sum: i64,
    pub stddev: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
    pub avg: f64,
}

/// Reward total for one lookback window.
///
/// Each fetch replaces the previous total for the same window; totals are
/// never added together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTotal {
    /// Window this total covers.
    pub window: RewardWindow,
    /// Total reward in HNT.
    pub total: Decimal,
    /// Optional summary statistics.
    pub stats: Option<RewardStats>,
    /// Start of the summed range.
    pub min_time: DateTime<Utc>,
    /// End of the summed range.
    pub max_time: DateTime<Utc>,
}

impl RewardTotal {
    /// Total for a window ending now, without statistics.
    pub fn new(window: RewardWindow, total: Decimal) -> Self {
        let (min_time, max_time) = window.bounds(Utc::now());
        Self {
            window,
            total,
            stats: None,
            min_time,
            max_time,
        }
    }
}

/// One independently tracked quantity of a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Metadata,
    Reward(RewardWindow),
}

impl Metric {
    /// The four metrics polled for every address.
    pub const ALL: [Metric; 4] = [
        Self::Metadata,
        Self::Reward(RewardWindow::Day),
        Self::Reward(RewardWindow::Week),
        Self::Reward(RewardWindow::Month),
    ];

    pub fn is_reward(self) -> bool {
        matches!(self, Self::Reward(_))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::Reward(window) => write!(f, "reward {}", window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_window_bounds() {
        let now = Utc.with_ymd_and_hms(2021, 6, 30, 12, 0, 0).unwrap();
        let (min, max) = RewardWindow::Week.bounds(now);
        assert_eq!(max, now);
        assert_eq!(min, Utc.with_ymd_and_hms(2021, 6, 23, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_slots_are_distinct() {
        let slots: Vec<usize> = RewardWindow::ALL.iter().map(|w| w.slot()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::Metadata.to_string(), "metadata");
        assert_eq!(Metric::Reward(RewardWindow::Month).to_string(), "reward 30d");
        assert!(!Metric::Metadata.is_reward());
        assert_eq!(Metric::ALL.iter().filter(|m| m.is_reward()).count(), 3);
    }

    #[test]
    fn test_reward_total_new_spans_window() {
        let total = RewardTotal::new(RewardWindow::Day, dec!(1.5));
        assert_eq!(total.max_time - total.min_time, Duration::days(1));
        assert_eq!(total.total, dec!(1.5));
    }
}
