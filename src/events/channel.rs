//! Channel-backed notifier.

use super::{ChangeNotifier, DashboardEvent, ErrorObserver};
use crate::error::Error;
use crate::state::{Address, AggregateRecord, Metric};
use tokio::sync::mpsc;
use tracing::debug;

/// Forwards notifications as [`DashboardEvent`]s over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    event_tx: mpsc::UnboundedSender<DashboardEvent>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }

    fn send(&self, event: DashboardEvent) {
        if self.event_tx.send(event).is_err() {
            // Consumer is gone (shutting down); nothing left to redraw.
            debug!("dashboard event dropped, receiver closed");
        }
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn on_record_changed(&self, address: &Address, row: usize, record: &AggregateRecord) {
        self.send(DashboardEvent::RecordChanged {
            address: address.clone(),
            row,
            record: record.clone(),
        });
    }
}

impl ErrorObserver for ChannelNotifier {
    fn on_error(&self, address: &Address, metric: Metric, error: &Error) {
        self.send(DashboardEvent::FetchFailed {
            address: address.clone(),
            metric,
            message: error.to_string(),
            transient: error.is_transient(),
        });
    }
}
