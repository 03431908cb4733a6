// Outbound event stream
//
// Everything the monitor has to say goes out as a `MonitorEvent`. Events
// carry structured data (kind, node key, counts) and render to plain text
// through `Display`; formatting markup and delivery belong to the notifier.

use crate::node::NodeEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::mpsc;

/// Why a status report is flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWarning {
    /// The discovery service could not be queried.
    DiscoveryUnavailable,
    /// Some local nodes are not listed by the discovery service.
    NodesMissingFromDiscovery,
}

impl fmt::Display for StatusWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusWarning::DiscoveryUnavailable => write!(f, "Problem checking the Discovery Server."),
            StatusWarning::NodesMissingFromDiscovery => {
                write!(f, "Some Nodes are not connected to the Discovery Server.")
            }
        }
    }
}

/// What triggered a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Heartbeat,
    OnDemand,
}

/// Connected count vs. discovery-connected count at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub kind: StatusKind,
    pub connected: usize,
    pub discovery_connected: usize,
    pub warning: Option<StatusWarning>,
    pub generated_at: DateTime<Utc>,
}

impl StatusReport {
    /// Build a report from the counts and the outcome of the discovery
    /// check. A failed check counts zero discovery-connected nodes.
    pub fn new(kind: StatusKind, connected: usize, discovery: Option<usize>) -> Self {
        let (discovery_connected, warning) = match discovery {
            None => (0, Some(StatusWarning::DiscoveryUnavailable)),
            Some(n) if n != connected => (n, Some(StatusWarning::NodesMissingFromDiscovery)),
            Some(n) => (n, None),
        };
        Self {
            kind,
            connected,
            discovery_connected,
            warning,
            generated_at: Utc::now(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let badge = if self.is_degraded() { "⚠️ " } else { "👍 " };
        let title = match self.kind {
            StatusKind::Heartbeat => "Heartbeat",
            StatusKind::OnDemand => "Status",
        };
        write!(
            f,
            "{}{}\nConnected Nodes: {}\nDiscovery Connected Nodes: {}",
            badge, title, self.connected, self.discovery_connected
        )?;
        if let Some(warning) = self.warning {
            write!(f, "\n{}", warning)?;
        }
        Ok(())
    }
}

/// One item on the monitor's outbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Node(NodeEvent),
    /// The manager could not be polled this tick.
    FetchFailed { address: String, reason: String },
    Status(StatusReport),
}

impl From<NodeEvent> for MonitorEvent {
    fn from(event: NodeEvent) -> Self {
        MonitorEvent::Node(event)
    }
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorEvent::Node(NodeEvent::Joined { key, connected }) => {
                write!(f, "Node Connected: {}\n\nConnected Nodes: {}", key, connected)
            }
            MonitorEvent::Node(NodeEvent::Left { key, connected }) => {
                write!(f, "‼ Node Disconnected: {}\n\nConnected Nodes: {}", key, connected)
            }
            MonitorEvent::FetchFailed { address, .. } => write!(
                f,
                "⚠️ Problem getting connected Nodes from the Manager ({}).",
                address
            ),
            MonitorEvent::Status(report) => report.fmt(f),
        }
    }
}

/// Delivers monitor events to the outside world (chat, console, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &MonitorEvent) -> anyhow::Result<()>;
}

/// Forwards events into an unbounded channel, for embedding the monitor in
/// another event loop.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, event: &MonitorEvent) -> anyhow::Result<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| anyhow::anyhow!("event receiver dropped"))
    }
}
