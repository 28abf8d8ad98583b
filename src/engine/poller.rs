//! A single (address, metric) poller.

use crate::api::DataSource;
use crate::error::Result;
use crate::state::{Address, HotspotInfo, Metric, RewardTotal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Value produced by a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Metadata(HotspotInfo),
    Reward(RewardTotal),
}

/// One poll outcome pushed to the result sink.
#[derive(Debug)]
pub struct PollResult {
    pub address: Address,
    pub metric: Metric,
    pub outcome: Result<Fetched>,
}

/// How long a poller keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollCadence {
    /// Poll every interval until cancelled.
    #[default]
    Forever,
    /// Stop after the first successful fetch.
    UntilFirstSuccess,
}

/// Why a poller stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// Its cancellation token fired.
    Cancelled,
    /// Nobody is listening for results any more.
    SinkClosed,
    /// `UntilFirstSuccess` cadence got its value.
    Completed,
}

/// Keeps one metric of one address fresh.
///
/// The first poll happens immediately, then one per interval. Cancellation
/// is checked before each poll; a request already in flight is allowed to
/// finish and its result is still delivered. Failures are delivered like
/// any other result and never stop the loop.
pub struct Poller {
    address: Address,
    metric: Metric,
    source: Arc<dyn DataSource>,
    interval: Duration,
    cadence: PollCadence,
    cancel: CancellationToken,
}

impl Poller {
    /// Create a poller that repeats forever.
    pub fn new(
        address: Address,
        metric: Metric,
        source: Arc<dyn DataSource>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            address,
            metric,
            source,
            interval,
            cadence: PollCadence::Forever,
            cancel,
        }
    }

    /// Set the cadence.
    pub fn with_cadence(mut self, cadence: PollCadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Poll until cancelled, completed, or the sink closes.
    pub async fn run(self, sink: mpsc::UnboundedSender<PollResult>) -> PollExit {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let exit = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break PollExit::Cancelled,
                _ = ticker.tick() => {}
            }

            trace!(address = %self.address, metric = %self.metric, "polling");
            let outcome = self.fetch().await;
            let succeeded = outcome.is_ok();

            let result = PollResult {
                address: self.address.clone(),
                metric: self.metric,
                outcome,
            };
            if sink.send(result).is_err() {
                break PollExit::SinkClosed;
            }

            if succeeded && self.cadence == PollCadence::UntilFirstSuccess {
                break PollExit::Completed;
            }
        };

        debug!(address = %self.address, metric = %self.metric, ?exit, "poller stopped");
        exit
    }

    async fn fetch(&self) -> Result<Fetched> {
        match self.metric {
            Metric::Metadata => self
                .source
                .fetch_metadata(&self.address)
                .await
                .map(Fetched::Metadata),
            Metric::Reward(window) => self
                .source
                .fetch_reward_total(&self.address, window)
                .await
                .map(Fetched::Reward),
        }
    }
}
