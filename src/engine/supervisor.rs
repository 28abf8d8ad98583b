//! Task supervisor - owns the pollers of every tracked address.

use super::poller::{Fetched, PollCadence, PollExit, PollResult, Poller};
use crate::api::DataSource;
use crate::config::{FailurePolicy, MetadataCadence, PollingConfig};
use crate::error::Error;
use crate::events::ErrorObserver;
use crate::state::{Address, AggregateStore, Metric};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The four pollers of one address plus the task routing their results.
struct AddressGroup {
    token: CancellationToken,
    pollers: Vec<JoinHandle<PollExit>>,
    router: JoinHandle<()>,
}

/// Spawns and cancels per-address poller groups.
///
/// Every group derives its token from the supervisor's root token, so
/// [`Supervisor::shutdown`] stops everything while [`Supervisor::cancel`]
/// stops one address without touching the others.
pub struct Supervisor {
    source: Arc<dyn DataSource>,
    store: Arc<AggregateStore>,
    observer: Arc<dyn ErrorObserver>,
    polling: PollingConfig,
    root: CancellationToken,
    groups: Mutex<HashMap<Address, AddressGroup>>,
}

impl Supervisor {
    /// Create a supervisor. Nothing is polled until [`Supervisor::supervise`].
    pub fn new(
        source: Arc<dyn DataSource>,
        store: Arc<AggregateStore>,
        observer: Arc<dyn ErrorObserver>,
        polling: PollingConfig,
    ) -> Self {
        Self {
            source,
            store,
            observer,
            polling,
            root: CancellationToken::new(),
            groups: Mutex::new(HashMap::new()),
        }
    }

    /// Start the four pollers for `address`.
    ///
    /// Returns `false` and spawns nothing if the address is already
    /// supervised (even if its group was cancelled), already has a record in
    /// the store, or the supervisor has been shut down.
    pub async fn supervise(&self, address: Address) -> bool {
        // Checked under the lock so a concurrent shutdown cannot drain the
        // map before this group is inserted.
        let mut groups = self.groups.lock().await;
        if self.root.is_cancelled() {
            debug!(address = %address, "supervisor shut down, not spawning");
            return false;
        }
        if groups.contains_key(&address) || self.store.contains(&address).await {
            debug!(address = %address, "already supervised, skipping");
            return false;
        }

        let group = self.spawn_group(&address);
        info!(address = %address, "supervising");
        groups.insert(address, group);
        true
    }

    /// Supervise every address; returns how many groups were spawned.
    pub async fn supervise_all<I>(&self, addresses: I) -> usize
    where
        I: IntoIterator<Item = Address>,
    {
        let mut spawned = 0;
        for address in addresses {
            if self.supervise(address).await {
                spawned += 1;
            }
        }
        spawned
    }

    /// Cancel the pollers of one address. Returns `false` if it was never
    /// supervised.
    pub async fn cancel(&self, address: &Address) -> bool {
        match self.groups.lock().await.get(address) {
            Some(group) => {
                info!(address = %address, "cancelling pollers");
                group.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether `address` has a group that has not been cancelled.
    pub async fn is_active(&self, address: &Address) -> bool {
        self.groups
            .lock()
            .await
            .get(address)
            .is_some_and(|g| !g.token.is_cancelled())
    }

    /// Addresses whose groups are still running, in no particular order.
    pub async fn active_addresses(&self) -> Vec<Address> {
        self.groups
            .lock()
            .await
            .iter()
            .filter(|(_, g)| !g.token.is_cancelled())
            .map(|(address, _)| address.clone())
            .collect()
    }

    /// Cancel every group and wait for all their tasks to finish.
    pub async fn shutdown(&self) {
        self.root.cancel();

        let groups: Vec<(Address, AddressGroup)> =
            self.groups.lock().await.drain().collect();

        for (address, group) in groups {
            let exits = futures::future::join_all(group.pollers).await;
            let panicked = exits.iter().filter(|exit| exit.is_err()).count();
            if panicked > 0 {
                warn!(address = %address, panicked, "pollers ended abnormally");
            }
            if let Err(err) = group.router.await {
                warn!(address = %address, error = %err, "result router ended abnormally");
            }
        }
        info!("supervisor shut down");
    }

    fn spawn_group(&self, address: &Address) -> AddressGroup {
        let token = self.root.child_token();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let pollers = Metric::ALL
            .into_iter()
            .map(|metric| {
                let poller = Poller::new(
                    address.clone(),
                    metric,
                    self.source.clone(),
                    self.polling.interval(),
                    token.clone(),
                )
                .with_cadence(self.cadence_for(metric));
                tokio::spawn(poller.run(result_tx.clone()))
            })
            .collect();
        // The router stops once every poller has dropped its sender.
        drop(result_tx);

        let router = ResultRouter {
            address: address.clone(),
            store: self.store.clone(),
            observer: self.observer.clone(),
            policy: self.polling.failure_policy,
            token: token.clone(),
        };
        let router = tokio::spawn(router.run(result_rx));

        AddressGroup {
            token,
            pollers,
            router,
        }
    }

    fn cadence_for(&self, metric: Metric) -> PollCadence {
        match (metric, self.polling.metadata_cadence) {
            (Metric::Metadata, MetadataCadence::Once) => PollCadence::UntilFirstSuccess,
            _ => PollCadence::Forever,
        }
    }
}

/// Applies one address's poll results to the store.
struct ResultRouter {
    address: Address,
    store: Arc<AggregateStore>,
    observer: Arc<dyn ErrorObserver>,
    policy: FailurePolicy,
    token: CancellationToken,
}

impl ResultRouter {
    async fn run(self, mut results: mpsc::UnboundedReceiver<PollResult>) {
        while let Some(result) = results.recv().await {
            let metric = result.metric;
            let applied = match (metric, result.outcome) {
                (Metric::Metadata, Ok(Fetched::Metadata(info))) => {
                    self.store.upsert_metadata(&self.address, info).await;
                    Ok(())
                }
                (Metric::Reward(window), Ok(Fetched::Reward(total))) => self
                    .store
                    .upsert_reward(&self.address, window, total)
                    .await
                    .map(|_| ()),
                (metric, Ok(_)) => Err(Error::decode(format!(
                    "{} poller produced a value of another metric",
                    metric
                ))),
                (_, Err(err)) => Err(err),
            };

            if let Err(err) = applied {
                self.on_failure(metric, err).await;
            }
        }
        debug!(address = %self.address, "result router finished");
    }

    async fn on_failure(&self, metric: Metric, err: Error) {
        warn!(address = %self.address, metric = %metric, error = %err, "fetch failed");

        self.store
            .record_error(&self.address, metric, err.to_string())
            .await;
        self.observer.on_error(&self.address, metric, &err);

        if self.policy == FailurePolicy::CancelAddress && !self.token.is_cancelled() {
            warn!(address = %self.address, "cancelling remaining pollers after failure");
            self.token.cancel();
        }
    }
}
