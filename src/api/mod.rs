//! Helium API integration.
//!
//! The polling core only sees the [`DataSource`] trait. [`HeliumClient`] is
//! the production implementation talking JSON over HTTP to the public
//! Helium API; tests substitute their own.

mod client;
mod converter;

pub use client::{HeliumClient, HeliumClientBuilder};
pub use converter::DataConverter;

use crate::error::Result;
use crate::state::{Address, HotspotInfo, RewardTotal, RewardWindow};
use async_trait::async_trait;

/// Read-only source of hotspot metadata and reward totals.
///
/// Shared by every poller at once, so implementations must be safe for
/// concurrent use. Any failure is treated the same way by the caller: it is
/// reported and the next scheduled poll tries again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Current metadata for `address`.
    async fn fetch_metadata(&self, address: &Address) -> Result<HotspotInfo>;

    /// Reward total for `address` over the `window` ending now.
    async fn fetch_reward_total(&self, address: &Address, window: RewardWindow)
    -> Result<RewardTotal>;
}
