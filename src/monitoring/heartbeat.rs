// Heartbeat: periodic status summary, independent of change events

use super::{emit, ticker};
use super::events::{MonitorEvent, StatusKind, StatusReport};
use crate::node::NodeRegistry;
use crate::service::DiscoveryChecker;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Connected count plus discovery cross-check, folded into one report.
pub(super) async fn build_report(
    registry: &NodeRegistry,
    discovery: &DiscoveryChecker,
    kind: StatusKind,
) -> StatusReport {
    // Both counts come from the same snapshot so a concurrent reconcile
    // cannot make them disagree.
    let nodes = registry.snapshot().await;
    let discovery_connected = discovery.count_listed(&nodes).await.ok();
    let report = StatusReport::new(kind, nodes.len(), discovery_connected);
    debug!(
        connected = report.connected,
        discovery_connected = report.discovery_connected,
        degraded = report.is_degraded(),
        "Status report built"
    );
    report
}

pub(super) struct Heartbeat {
    pub registry: NodeRegistry,
    pub discovery: DiscoveryChecker,
    pub interval: Duration,
}

impl Heartbeat {
    pub async fn run(self, token: CancellationToken, events: mpsc::Sender<MonitorEvent>) {
        debug!(interval = ?self.interval, "Heartbeat started");

        let mut ticks = ticker(self.interval);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticks.tick() => {
                    let report = tokio::select! {
                        _ = token.cancelled() => break,
                        report = build_report(&self.registry, &self.discovery, StatusKind::Heartbeat) => report,
                    };
                    if !emit(&token, &events, MonitorEvent::Status(report)).await {
                        break;
                    }
                }
            }
        }

        debug!("Heartbeat stopped");
    }
}
