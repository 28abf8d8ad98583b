//! Per-address aggregate record.

use super::{Address, HotspotInfo, Metric, RewardTotal, RewardWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Most recent failed fetch for an address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub metric: Metric,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Everything currently known about one address.
///
/// Partially populated until each of the four metrics has succeeded at
/// least once. Only the aggregate store creates or mutates these; everyone
/// else sees clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    /// Address this record belongs to.
    pub address: Address,
    /// Display row, fixed for the lifetime of the process.
    pub row: usize,
    /// Latest metadata, if fetched.
    pub info: Option<HotspotInfo>,
    /// Reward slots indexed by window.
    rewards: [Option<RewardTotal>; 3],
    /// Last failure not yet superseded by a success of the same metric.
    pub last_error: Option<FetchFailure>,
    /// Bumped on every mutation.
    pub revision: u64,
    /// Time of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl AggregateRecord {
    pub(crate) fn new(address: Address, row: usize) -> Self {
        Self {
            address,
            row,
            info: None,
            rewards: [None, None, None],
            last_error: None,
            revision: 0,
            updated_at: Utc::now(),
        }
    }

    /// Reward total for a window, if fetched.
    pub fn reward(&self, window: RewardWindow) -> Option<&RewardTotal> {
        self.rewards[window.slot()].as_ref()
    }

    /// Whether all four metrics have arrived at least once.
    pub fn is_complete(&self) -> bool {
        self.info.is_some() && self.rewards.iter().all(Option::is_some)
    }

    /// Display name, falling back to the short address.
    pub fn display_name(&self) -> String {
        self.info
            .as_ref()
            .map(|i| i.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.address.short())
    }

    pub(crate) fn set_info(&mut self, info: HotspotInfo) {
        self.info = Some(info);
        self.clear_error(Metric::Metadata);
        self.touch();
    }

    /// Caller guarantees `total.window` is the slot being written.
    pub(crate) fn set_reward(&mut self, total: RewardTotal) {
        let window = total.window;
        self.rewards[window.slot()] = Some(total);
        self.clear_error(Metric::Reward(window));
        self.touch();
    }

    pub(crate) fn set_error(&mut self, metric: Metric, message: String) {
        self.last_error = Some(FetchFailure {
            metric,
            message,
            at: Utc::now(),
        });
        self.touch();
    }

    fn clear_error(&mut self, metric: Metric) {
        if self.last_error.as_ref().is_some_and(|e| e.metric == metric) {
            self.last_error = None;
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}
