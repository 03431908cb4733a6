// Node registry: the authoritative view of which nodes are connected
//
// Only the poller writes (through `reconcile`); the heartbeat, the discovery
// cross-check and the command layer read. A failed fetch never reaches the
// registry, so its contents are always the last successfully applied list.

use super::NodeRecord;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Membership change produced by a reconcile pass.
///
/// `connected` is the registry size right after this particular change, so
/// a join that is later followed by a prune in the same pass reports the
/// transient (larger) size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    Joined { key: String, connected: usize },
    Left { key: String, connected: usize },
}

impl NodeEvent {
    pub fn key(&self) -> &str {
        match self {
            NodeEvent::Joined { key, .. } | NodeEvent::Left { key, .. } => key,
        }
    }

    pub fn connected(&self) -> usize {
        match self {
            NodeEvent::Joined { connected, .. } | NodeEvent::Left { connected, .. } => *connected,
        }
    }
}

/// Thread-safe map of node key → latest record.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    nodes: Arc<RwLock<HashMap<String, NodeRecord>>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently connected nodes.
    pub async fn count(&self) -> usize {
        self.nodes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.nodes.read().await.contains_key(key)
    }

    /// Copy of every record, in no particular order.
    pub async fn snapshot(&self) -> Vec<NodeRecord> {
        self.nodes.read().await.values().cloned().collect()
    }

    /// Sorted list of connected node keys.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.nodes.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn clear(&self) {
        self.nodes.write().await.clear();
    }

    /// Apply a freshly fetched node list and report who joined and who left.
    ///
    /// `None` stands for a fetch that produced no usable list (a `null`
    /// body); it is ignored and the registry stays as it was. Records whose
    /// key is already known are replaced wholesale without an event.
    ///
    /// The removal scan only runs when the registry ends up larger than the
    /// number of distinct incoming keys, which is exactly when some known
    /// key is missing from the new list.
    ///
    /// Must only be called from one task at a time; the monitor guarantees
    /// this by running a single poller.
    pub async fn reconcile(&self, incoming: Option<&[NodeRecord]>) -> Vec<NodeEvent> {
        let Some(incoming) = incoming else {
            debug!("Ignoring empty fetch result (no node list)");
            return Vec::new();
        };

        let mut nodes = self.nodes.write().await;
        let mut events = Vec::new();

        for node in incoming {
            if nodes.insert(node.key.clone(), node.clone()).is_none() {
                debug!(key = %node.key, connected = nodes.len(), "Node joined");
                events.push(NodeEvent::Joined {
                    key: node.key.clone(),
                    connected: nodes.len(),
                });
            }
        }

        let incoming_keys: HashSet<&str> = incoming.iter().map(|n| n.key.as_str()).collect();
        if nodes.len() > incoming_keys.len() {
            let mut stale: Vec<String> = nodes
                .keys()
                .filter(|key| !incoming_keys.contains(key.as_str()))
                .cloned()
                .collect();
            stale.sort();

            for key in stale {
                if let Some(removed) = nodes.remove(&key) {
                    debug!(connected = nodes.len(), "Node removed: {}", removed.summary());
                    events.push(NodeEvent::Left {
                        key,
                        connected: nodes.len(),
                    });
                }
            }
        }

        events
    }
}
