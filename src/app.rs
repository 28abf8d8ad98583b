//! Main application module.
//!
//! This module contains the main `App` struct that wires the API client,
//! aggregate store and supervisor together and consumes dashboard events
//! until interrupted.

use crate::api::{DataSource, HeliumClientBuilder};
use crate::config::{Config, PollingConfig};
use crate::engine::Supervisor;
use crate::error::Result;
use crate::events::{ChannelNotifier, DashboardEvent};
use crate::state::{Address, AggregateRecord, AggregateStore, RewardWindow};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The main application.
pub struct App {
    /// Aggregate store shared with the supervisor's routers.
    store: Arc<AggregateStore>,
    /// Owner of all poller groups.
    supervisor: Supervisor,
    /// Dashboard event receiver.
    event_rx: mpsc::UnboundedReceiver<DashboardEvent>,
    /// Addresses to track, in configured order.
    addresses: Vec<Address>,
    /// Latest rendered rows.
    board: Board,
}

impl App {
    /// Create an application polling the Helium API.
    pub fn new(config: Config, addresses: Vec<Address>) -> Result<Self> {
        config.validate()?;
        let client = HeliumClientBuilder::new().config(config.api.clone()).build()?;
        Ok(Self::with_source(Arc::new(client), config.polling, addresses))
    }

    /// Create an application on top of any data source.
    pub fn with_source(
        source: Arc<dyn DataSource>,
        polling: PollingConfig,
        addresses: Vec<Address>,
    ) -> Self {
        let (notifier, event_rx) = ChannelNotifier::new();
        let notifier = Arc::new(notifier);

        let store = Arc::new(AggregateStore::new(notifier.clone()));
        let supervisor = Supervisor::new(source, store.clone(), notifier, polling);

        Self {
            store,
            supervisor,
            event_rx,
            addresses,
            board: Board::default(),
        }
    }

    /// Shared store, for consumers that want snapshots.
    pub fn store(&self) -> Arc<AggregateStore> {
        self.store.clone()
    }

    /// Run until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `stop` resolves, then shut every poller down.
    pub async fn run_until<F>(&mut self, stop: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let spawned = self
            .supervisor
            .supervise_all(self.addresses.iter().cloned())
            .await;
        info!(spawned, "tracking hotspots");

        tokio::pin!(stop);
        loop {
            tokio::select! {
                _ = &mut stop => {
                    info!("stopping");
                    break;
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
            }
        }

        self.supervisor.shutdown().await;
        // Drain what arrived while shutting down so the board is final.
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
        Ok(())
    }

    /// Rows currently on the board, ordered by row.
    pub fn rows(&self) -> Vec<String> {
        self.board.lines()
    }

    fn handle_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::RecordChanged { row, record, .. } => {
                if let Some(line) = self.board.apply(record) {
                    info!(row, "{}", line);
                }
            }
            DashboardEvent::FetchFailed {
                address,
                metric,
                message,
                transient,
            } => {
                warn!(address = %address.short(), metric = %metric, transient, "{}", message);
            }
        }
    }
}

/// Latest snapshot per address, discarding stale notifications.
#[derive(Debug, Default)]
struct Board {
    records: HashMap<Address, AggregateRecord>,
}

impl Board {
    /// Keep `record` if it is newer than what is shown. Returns the new line.
    fn apply(&mut self, record: AggregateRecord) -> Option<String> {
        if let Some(current) = self.records.get(&record.address)
            && current.revision >= record.revision
        {
            return None;
        }
        let line = format_row(&record);
        self.records.insert(record.address.clone(), record);
        Some(line)
    }

    fn lines(&self) -> Vec<String> {
        let mut records: Vec<&AggregateRecord> = self.records.values().collect();
        records.sort_by_key(|r| r.row);
        records.into_iter().map(format_row).collect()
    }
}

/// One dashboard row: name, 24h, 7d, 30d, address, owner.
fn format_row(record: &AggregateRecord) -> String {
    let reward = |window: RewardWindow| {
        record
            .reward(window)
            .map(|r| format!("{:.4}", r.total))
            .unwrap_or_else(|| "-".to_string())
    };
    let owner = record
        .info
        .as_ref()
        .map(|i| i.owner.as_str())
        .filter(|o| !o.is_empty())
        .unwrap_or("-");
    let status = match &record.last_error {
        Some(failure) => format!(" ! {} failed", failure.metric),
        None => String::new(),
    };

    format!(
        "{:>3} {:<28} {:>12} {:>12} {:>12}  {}  {}{}",
        record.row,
        record.display_name(),
        reward(RewardWindow::Day),
        reward(RewardWindow::Week),
        reward(RewardWindow::Month),
        record.address.short(),
        owner,
        status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{HotspotInfo, Metric, RewardTotal};
    use rust_decimal_macros::dec;

    fn record(revision: u64) -> AggregateRecord {
        let mut record = AggregateRecord::new(Address::from("addr1"), 0);
        for _ in 0..revision {
            record.set_info(HotspotInfo::named(format!("H{}", revision)));
        }
        record
    }

    #[test]
    fn test_board_discards_stale_revisions() {
        let mut board = Board::default();

        assert!(board.apply(record(2)).is_some());
        assert!(board.apply(record(1)).is_none());
        assert!(board.apply(record(2)).is_none());
        assert!(board.apply(record(3)).is_some());

        assert_eq!(board.lines().len(), 1);
        assert!(board.lines()[0].contains("H3"));
    }

    #[test]
    fn test_format_row() {
        let mut record = AggregateRecord::new(Address::from("addr1"), 4);
        record.set_info(HotspotInfo {
            owner: "wallet".to_string(),
            ..HotspotInfo::named("H1")
        });
        record.set_reward(RewardTotal::new(RewardWindow::Week, dec!(5.25)));
        record.set_error(Metric::Reward(RewardWindow::Month), "timeout".to_string());

        let line = format_row(&record);

        assert!(line.starts_with("  4 H1"));
        assert!(line.contains("5.2500"));
        assert!(line.contains(" - "));
        assert!(line.contains("wallet"));
        assert!(line.ends_with("! reward 30d failed"));
    }
}
