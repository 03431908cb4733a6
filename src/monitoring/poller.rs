// Manager poller: fetch and reconcile on a fixed interval

use super::{emit, ticker};
use super::events::MonitorEvent;
use crate::network::NodeSource;
use crate::node::NodeRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub(super) struct Poller {
    pub source: Arc<dyn NodeSource>,
    pub registry: NodeRegistry,
    pub address: String,
    pub interval: Duration,
}

impl Poller {
    /// Poll until `token` is cancelled or the event stream closes.
    pub async fn run(self, token: CancellationToken, events: mpsc::Sender<MonitorEvent>) {
        debug!(interval = ?self.interval, address = %self.address, "Manager poller started");

        let mut ticks = ticker(self.interval);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticks.tick() => {
                    if !self.poll_once(&token, &events).await {
                        break;
                    }
                }
            }
        }

        debug!("Manager poller stopped");
    }

    /// One fetch + reconcile cycle. Returns `false` once the task should end.
    async fn poll_once(&self, token: &CancellationToken, events: &mpsc::Sender<MonitorEvent>) -> bool {
        let fetched = tokio::select! {
            _ = token.cancelled() => return false,
            fetched = self.source.fetch(&self.address) => fetched,
        };

        match fetched {
            Ok(nodes) => {
                let changes = self.registry.reconcile(nodes.as_deref()).await;
                for change in changes {
                    if !emit(token, events, change.into()).await {
                        return false;
                    }
                }
                true
            }
            Err(e) => {
                warn!(address = %self.address, "Failed to get connected nodes: {}", e);
                let event = MonitorEvent::FetchFailed {
                    address: self.address.clone(),
                    reason: e.to_string(),
                };
                emit(token, events, event).await
            }
        }
    }
}
