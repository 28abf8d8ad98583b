//! # hotspot-dash - Helium hotspot tracker
//!
//! Keeps metadata and 24h/7d/30d reward totals for a fixed set of Helium
//! hotspots up to date by polling the public API.
//!
//! ## Architecture
//!
//! - **API**: the [`api::DataSource`] trait and its HTTP implementation
//! - **Engine**: per-address poller groups and their supervisor
//! - **State**: the aggregate store merging results as they arrive
//! - **Events**: change notification and error observation for renderers
//! - **App**: wiring and the event loop
//! - **Config**: configuration management

pub mod api;
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod state;

pub use app::App;
pub use config::Config;
pub use engine::Supervisor;
pub use error::{Error, Result};
pub use state::AggregateStore;
