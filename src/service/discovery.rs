// Discovery cross-check
//
// Counts how many of the locally connected nodes the discovery service also
// reports. The registry is only read here; a discovery outage is reported to
// the caller and never used to correct the local view.

use crate::errors::FetchError;
use crate::network::NodeSource;
use crate::node::{nodes_by_key, NodeRecord, NodeRegistry};
use std::sync::Arc;
use tracing::{debug, error};

/// Checks local nodes against the discovery service's node list.
#[derive(Clone)]
pub struct DiscoveryChecker {
    source: Arc<dyn NodeSource>,
    address: String,
}

impl DiscoveryChecker {
    pub fn new(source: Arc<dyn NodeSource>, address: impl Into<String>) -> Self {
        Self {
            source,
            address: address.into(),
        }
    }

    /// Number of registry nodes that the discovery service lists.
    ///
    /// An empty registry short-circuits to `Ok(0)` without contacting the
    /// discovery service.
    pub async fn count_connected(&self, registry: &NodeRegistry) -> Result<usize, FetchError> {
        self.count_listed(&registry.snapshot().await).await
    }

    /// Same as [`count_connected`](Self::count_connected), against a
    /// snapshot the caller already holds.
    pub async fn count_listed(&self, nodes: &[NodeRecord]) -> Result<usize, FetchError> {
        if nodes.is_empty() {
            debug!("Connected node list is empty, skipping discovery check");
            return Ok(0);
        }

        let discovery_nodes = match self.source.fetch(&self.address).await {
            Ok(nodes) => nodes.unwrap_or_default(),
            Err(e) => {
                error!(address = %self.address, "Error contacting discovery server: {}", e);
                return Err(e);
            }
        };

        if discovery_nodes.is_empty() {
            debug!(address = %self.address, "Discovery server returned no nodes");
            return Ok(0);
        }
        debug!(
            address = %self.address,
            count = discovery_nodes.len(),
            "Discovery server returned nodes"
        );

        let listed = nodes_by_key(&discovery_nodes);

        let mut connected = 0;
        for node in nodes {
            if listed.contains_key(&node.key) {
                debug!(key = %node.key, "Node connected to discovery");
                connected += 1;
            } else {
                debug!(key = %node.key, "Node not connected to discovery");
            }
        }

        debug!(connected, "Nodes connected to discovery");
        Ok(connected)
    }
}
