//! Polling engine.
//!
//! Each tracked address gets four [`Poller`]s (metadata and the 24h, 7d and
//! 30d reward totals) sharing one cancellation token. Their results flow
//! through a per-address router into the [`AggregateStore`](crate::state::AggregateStore),
//! which notifies the dashboard. The [`Supervisor`] owns those groups.

mod poller;
mod supervisor;

pub use poller::{Fetched, PollCadence, PollExit, PollResult, Poller};
pub use supervisor::Supervisor;
