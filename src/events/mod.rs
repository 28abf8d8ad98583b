//! Change notification and error observation.
//!
//! These are the only two paths from the polling core to whatever draws the
//! dashboard. Both are one-directional and must return quickly; the
//! [`ChannelNotifier`] hands events off to an unbounded channel so the
//! calling poller or store never waits on the consumer.

mod channel;

pub use channel::ChannelNotifier;

use crate::error::Error;
use crate::state::{Address, AggregateRecord, Metric};

/// Told about every store mutation, after it is visible to readers.
///
/// Implementations must not call back into the store that invoked them.
pub trait ChangeNotifier: Send + Sync {
    fn on_record_changed(&self, address: &Address, row: usize, record: &AggregateRecord);
}

/// Told about every failed fetch, whatever the supervisor decides to do next.
pub trait ErrorObserver: Send + Sync {
    fn on_error(&self, address: &Address, metric: Metric, error: &Error);
}

/// Event delivered to the dashboard consumer.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// A record was mutated.
    RecordChanged {
        address: Address,
        row: usize,
        record: AggregateRecord,
    },
    /// A fetch failed.
    FetchFailed {
        address: Address,
        metric: Metric,
        message: String,
        transient: bool,
    },
}

/// Notifier that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn on_record_changed(&self, _address: &Address, _row: usize, _record: &AggregateRecord) {}
}

impl ErrorObserver for NoopNotifier {
    fn on_error(&self, _address: &Address, _metric: Metric, _error: &Error) {}
}
