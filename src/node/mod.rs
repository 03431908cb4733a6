// Node module: the records reported by `GET /conn/getAll`
//
// A node is identified purely by its key. Byte counters and timestamps
// change on every poll; they are carried along but never decide whether a
// node joined or left.

pub mod registry;

pub use registry::{NodeEvent, NodeRegistry};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One entry of a manager or discovery node list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Public key of the node, unique within one response.
    pub key: String,
    /// Transport label (e.g. "TCP").
    #[serde(rename = "type")]
    pub connection_type: String,
    #[serde(rename = "send_bytes")]
    pub bytes_sent: u64,
    #[serde(rename = "recv_bytes")]
    pub bytes_received: u64,
    /// Seconds, as reported by the manager.
    #[serde(rename = "last_ack_time")]
    pub last_ack_time_secs: i64,
    /// Seconds, as reported by the manager.
    #[serde(rename = "start_time")]
    pub start_time_secs: i64,
}

impl NodeRecord {
    /// One-line summary for logs and node listings
    pub fn summary(&self) -> String {
        format!(
            "Key: {}, Type: {}, SendBytes: {}, RecvBytes: {}, LastAckTime: {}s, StartTime: {}s",
            self.key,
            self.connection_type,
            self.bytes_sent,
            self.bytes_received,
            self.last_ack_time_secs,
            self.start_time_secs
        )
    }
}

impl fmt::Display for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node Information:\n\
             Key        : {}\n\
             Type       : {}\n\
             SendBytes  : {}\n\
             RecvBytes  : {}\n\
             LastAckTime: {}s\n\
             StartTime  : {}s",
            self.key,
            self.connection_type,
            self.bytes_sent,
            self.bytes_received,
            self.last_ack_time_secs,
            self.start_time_secs
        )
    }
}

/// Index a node list by key.
///
/// Duplicate keys are resolved last-one-wins: the later record replaces the
/// earlier one.
pub fn nodes_by_key(nodes: &[NodeRecord]) -> HashMap<String, NodeRecord> {
    nodes
        .iter()
        .map(|node| (node.key.clone(), node.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) fn test_node(key: &str) -> NodeRecord {
    NodeRecord {
        key: key.to_string(),
        connection_type: "TCP".to_string(),
        bytes_sent: 0,
        bytes_received: 0,
        last_ack_time_secs: 0,
        start_time_secs: 0,
    }
}
