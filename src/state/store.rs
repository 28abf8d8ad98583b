//! The aggregate store.
//!
//! Holds the authoritative [`AggregateRecord`] per address behind a single
//! lock and hands out row numbers in first-arrival order.

use super::{Address, AggregateRecord, HotspotInfo, Metric, RewardTotal, RewardWindow};
use crate::error::{Error, Result};
use crate::events::ChangeNotifier;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct StoreInner {
    records: HashMap<Address, AggregateRecord>,
    /// Row index -> address. Only ever appended to.
    rows: Vec<Address>,
}

impl StoreInner {
    /// Record for `address`, creating it and assigning the next row if unseen.
    fn entry(&mut self, address: &Address) -> &mut AggregateRecord {
        let rows = &mut self.rows;
        self.records.entry(address.clone()).or_insert_with(|| {
            let row = rows.len();
            rows.push(address.clone());
            debug!(address = %address, row, "assigned row");
            AggregateRecord::new(address.clone(), row)
        })
    }
}

/// Concurrency-safe holder of merged per-address state.
pub struct AggregateStore {
    inner: RwLock<StoreInner>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl std::fmt::Debug for AggregateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateStore").finish_non_exhaustive()
    }
}

impl AggregateStore {
    /// Create an empty store reporting mutations to `notifier`.
    pub fn new(notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            notifier,
        }
    }

    /// Replace the metadata of `address`. Returns its row.
    pub async fn upsert_metadata(&self, address: &Address, info: HotspotInfo) -> usize {
        self.mutate(address, |record| record.set_info(info)).await
    }

    /// Replace the `window` reward slot of `address`. Returns its row.
    ///
    /// Fails without touching the store if `total` covers a different window.
    pub async fn upsert_reward(
        &self,
        address: &Address,
        window: RewardWindow,
        total: RewardTotal,
    ) -> Result<usize> {
        if total.window != window {
            return Err(Error::invalid_input(format!(
                "reward for {} cannot fill the {} slot",
                total.window, window
            )));
        }
        Ok(self.mutate(address, |record| record.set_reward(total)).await)
    }

    /// Note a failed fetch on the record, keeping every previous value.
    ///
    /// Creates the record (and its row) if this is the first result seen.
    pub async fn record_error(
        &self,
        address: &Address,
        metric: Metric,
        message: impl Into<String>,
    ) -> usize {
        let message = message.into();
        self.mutate(address, |record| record.set_error(metric, message))
            .await
    }

    /// Consistent copy of one record.
    pub async fn snapshot(&self, address: &Address) -> Option<AggregateRecord> {
        self.inner.read().await.records.get(address).cloned()
    }

    /// Consistent copy of every record, in row order.
    pub async fn snapshot_all(&self) -> Vec<AggregateRecord> {
        let inner = self.inner.read().await;
        inner
            .rows
            .iter()
            .filter_map(|address| inner.records.get(address).cloned())
            .collect()
    }

    /// Row assigned to `address`, if any result has arrived for it.
    pub async fn row_of(&self, address: &Address) -> Option<usize> {
        self.inner.read().await.records.get(address).map(|r| r.row)
    }

    pub async fn contains(&self, address: &Address) -> bool {
        self.inner.read().await.records.contains_key(address)
    }

    /// Number of addresses with a record.
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    /// Apply `f` under the write lock, then notify outside it.
    async fn mutate<F>(&self, address: &Address, f: F) -> usize
    where
        F: FnOnce(&mut AggregateRecord),
    {
        let snapshot = {
            let mut inner = self.inner.write().await;
            let record = inner.entry(address);
            f(&mut *record);
            record.clone()
        };

        self.notifier
            .on_record_changed(address, snapshot.row, &snapshot);
        snapshot.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        changes: Mutex<Vec<(Address, usize, u64)>>,
    }

    impl RecordingNotifier {
        fn changes(&self) -> Vec<(Address, usize, u64)> {
            self.changes.lock().unwrap().clone()
        }
    }

    impl ChangeNotifier for RecordingNotifier {
        fn on_record_changed(&self, address: &Address, row: usize, record: &AggregateRecord) {
            self.changes
                .lock()
                .unwrap()
                .push((address.clone(), row, record.revision));
        }
    }

    fn store() -> (Arc<AggregateStore>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (Arc::new(AggregateStore::new(notifier.clone())), notifier)
    }

    #[tokio::test]
    async fn test_rows_follow_first_arrival() {
        let (store, _) = store();
        let b = Address::from("addr-b");
        let a = Address::from("addr-a");

        assert_eq!(store.upsert_metadata(&b, HotspotInfo::named("B")).await, 0);
        assert_eq!(store.record_error(&a, Metric::Metadata, "boom").await, 1);
        assert_eq!(store.upsert_metadata(&b, HotspotInfo::named("B2")).await, 0);
        assert_eq!(
            store
                .upsert_reward(&a, RewardWindow::Day, RewardTotal::new(RewardWindow::Day, dec!(1)))
                .await
                .unwrap(),
            1
        );

        assert_eq!(store.len().await, 2);
        let rows: Vec<usize> = store.snapshot_all().await.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_last_write_wins_per_slot() {
        let (store, _) = store();
        let addr = Address::from("addr1");

        store
            .upsert_reward(&addr, RewardWindow::Day, RewardTotal::new(RewardWindow::Day, dec!(1)))
            .await
            .unwrap();
        store
            .upsert_reward(&addr, RewardWindow::Week, RewardTotal::new(RewardWindow::Week, dec!(7)))
            .await
            .unwrap();
        store
            .upsert_reward(&addr, RewardWindow::Day, RewardTotal::new(RewardWindow::Day, dec!(2)))
            .await
            .unwrap();

        let record = store.snapshot(&addr).await.unwrap();
        assert_eq!(record.reward(RewardWindow::Day).unwrap().total, dec!(2));
        assert_eq!(record.reward(RewardWindow::Week).unwrap().total, dec!(7));
        assert!(record.reward(RewardWindow::Month).is_none());
    }

    #[tokio::test]
    async fn test_mismatched_window_is_rejected() {
        let (store, notifier) = store();
        let addr = Address::from("addr1");

        let result = store
            .upsert_reward(&addr, RewardWindow::Day, RewardTotal::new(RewardWindow::Month, dec!(30)))
            .await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(!store.contains(&addr).await);
        assert!(notifier.changes().is_empty());
    }

    #[tokio::test]
    async fn test_error_keeps_previous_values() {
        let (store, notifier) = store();
        let addr = Address::from("addr1");

        store.upsert_metadata(&addr, HotspotInfo::named("H1")).await;
        store.record_error(&addr, Metric::Metadata, "502").await;

        let record = store.snapshot(&addr).await.unwrap();
        assert_eq!(record.info.as_ref().unwrap().name, "H1");
        assert_eq!(record.last_error.as_ref().unwrap().message, "502");
        assert_eq!(notifier.changes().len(), 2);
    }

    #[tokio::test]
    async fn test_notifications_only_for_mutated_address() {
        let (store, notifier) = store();
        let a = Address::from("A");
        let b = Address::from("B");

        store.upsert_metadata(&b, HotspotInfo::named("B")).await;
        store.record_error(&a, Metric::Reward(RewardWindow::Day), "timeout").await;

        let record_b = store.snapshot(&b).await.unwrap();
        assert_eq!(record_b.revision, 1);
        assert!(record_b.last_error.is_none());

        let changes = notifier.changes();
        assert_eq!(changes, vec![(b.clone(), 0, 1), (a.clone(), 1, 1)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_are_not_lost() {
        let (store, notifier) = store();
        let addr = Address::from("addr1");

        let mut handles = Vec::new();
        {
            let store = store.clone();
            let addr = addr.clone();
            handles.push(tokio::spawn(async move {
                store.upsert_metadata(&addr, HotspotInfo::named("H1")).await;
            }));
        }
        for (window, total) in [
            (RewardWindow::Day, dec!(1.0)),
            (RewardWindow::Week, dec!(5.0)),
            (RewardWindow::Month, dec!(20.0)),
        ] {
            let store = store.clone();
            let addr = addr.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert_reward(&addr, window, RewardTotal::new(window, total))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = store.snapshot(&addr).await.unwrap();
        assert!(record.is_complete());
        assert_eq!(record.info.as_ref().unwrap().name, "H1");
        assert_eq!(record.reward(RewardWindow::Day).unwrap().total, dec!(1.0));
        assert_eq!(record.reward(RewardWindow::Week).unwrap().total, dec!(5.0));
        assert_eq!(record.reward(RewardWindow::Month).unwrap().total, dec!(20.0));
        assert_eq!(record.revision, 4);

        let mut revisions: Vec<u64> = notifier.changes().iter().map(|c| c.2).collect();
        revisions.sort_unstable();
        assert_eq!(revisions, vec![1, 2, 3, 4]);
    }
}
