//! State management for hotspot-dash.
//!
//! The [`AggregateStore`] is the single owner of per-address state. Pollers
//! push results into it and the dashboard reads clones back out; nobody
//! else holds a mutable reference to a record.

mod hotspot;
mod record;
mod reward;
mod store;

pub use hotspot::{Address, GeoPoint, HotspotInfo, OnlineStatus};
pub use record::{AggregateRecord, FetchFailure};
pub use reward::{Metric, RewardStats, RewardTotal, RewardWindow};
pub use store::AggregateStore;
