// Node monitoring - lifecycle of the poller, heartbeat and event consumer.
//
// Two states matter to callers: running or not. A run owns one
// cancellation token and one task tracker; the poller and heartbeat send into
// a channel that only lives as long as that run, so a restart always gets
// fresh state.

pub mod events;
mod heartbeat;
mod poller;

pub use events::{
    ChannelNotifier, MonitorEvent, Notifier, StatusKind, StatusReport, StatusWarning,
};

use crate::config::constants::EVENT_CHANNEL_CAPACITY;
use crate::network::NodeSource;
use crate::node::NodeRegistry;
use crate::service::DiscoveryChecker;
use heartbeat::Heartbeat;
use poller::Poller;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Validated settings the monitor runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub manager_address: String,
    pub discovery_address: String,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
}

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    NotStarted,
    Running,
    Stopped,
}

/// Result of [`NodeMonitor::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

impl fmt::Display for StartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartOutcome::Started => write!(f, "Monitoring starting..."),
            StartOutcome::AlreadyRunning => write!(f, "Monitoring has already been started."),
        }
    }
}

/// Result of [`NodeMonitor::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::Stopped => write!(f, "Monitoring stopped."),
            StopOutcome::NotRunning => write!(f, "Monitoring is not running."),
        }
    }
}

/// Everything a live run needs to be torn down.
struct RunHandle {
    token: CancellationToken,
    tasks: TaskTracker,
}

enum Lifecycle {
    NotStarted,
    Running(RunHandle),
    Stopped,
}

/// Watches the manager's node list and reports joins, leaves and status.
pub struct NodeMonitor {
    config: MonitorConfig,
    source: Arc<dyn NodeSource>,
    registry: NodeRegistry,
    discovery: DiscoveryChecker,
    notifier: Arc<dyn Notifier>,
    lifecycle: Mutex<Lifecycle>,
}

impl NodeMonitor {
    pub fn new(
        config: MonitorConfig,
        source: Arc<dyn NodeSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let discovery = DiscoveryChecker::new(source.clone(), config.discovery_address.clone());
        Self {
            config,
            source,
            registry: NodeRegistry::new(),
            discovery,
            notifier,
            lifecycle: Mutex::new(Lifecycle::NotStarted),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// True exactly while a run handle is held.
    pub async fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock().await, Lifecycle::Running(_))
    }

    pub async fn state(&self) -> MonitorState {
        match *self.lifecycle.lock().await {
            Lifecycle::NotStarted => MonitorState::NotStarted,
            Lifecycle::Running(_) => MonitorState::Running,
            Lifecycle::Stopped => MonitorState::Stopped,
        }
    }

    /// Spawn the poller, heartbeat and event consumer.
    ///
    /// The registry is cleared first, so every node present at the first
    /// poll of a run is announced as joined.
    pub async fn start(&self) -> StartOutcome {
        let mut lifecycle = self.lifecycle.lock().await;
        if matches!(*lifecycle, Lifecycle::Running(_)) {
            info!("Monitoring has already been started");
            return StartOutcome::AlreadyRunning;
        }

        self.registry.clear().await;

        let token = CancellationToken::new();
        let tasks = TaskTracker::new();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tasks.spawn(run_consumer(token.clone(), events_rx, self.notifier.clone()));

        let poller = Poller {
            source: self.source.clone(),
            registry: self.registry.clone(),
            address: self.config.manager_address.clone(),
            interval: self.config.poll_interval,
        };
        tasks.spawn(poller.run(token.clone(), events_tx.clone()));

        let heartbeat = Heartbeat {
            registry: self.registry.clone(),
            discovery: self.discovery.clone(),
            interval: self.config.heartbeat_interval,
        };
        tasks.spawn(heartbeat.run(token.clone(), events_tx));

        tasks.close();
        *lifecycle = Lifecycle::Running(RunHandle { token, tasks });

        info!(
            manager = %self.config.manager_address,
            discovery = %self.config.discovery_address,
            poll_interval = ?self.config.poll_interval,
            heartbeat_interval = ?self.config.heartbeat_interval,
            "Monitoring started"
        );
        StartOutcome::Started
    }

    /// Cancel the run and wait until all of its tasks have exited.
    pub async fn stop(&self) -> StopOutcome {
        let mut lifecycle = self.lifecycle.lock().await;
        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running(handle) => {
                handle.token.cancel();
                handle.tasks.wait().await;
                info!("Monitoring stopped");
                StopOutcome::Stopped
            }
            previous => {
                *lifecycle = previous;
                info!("Monitoring is not running");
                StopOutcome::NotRunning
            }
        }
    }

    /// Current connected / discovery-connected summary.
    pub async fn status_report(&self, kind: StatusKind) -> StatusReport {
        heartbeat::build_report(&self.registry, &self.discovery, kind).await
    }
}

impl Drop for NodeMonitor {
    fn drop(&mut self) {
        if let Lifecycle::Running(handle) = self.lifecycle.get_mut() {
            handle.token.cancel();
        }
    }
}

/// Tick periods are kept within these bounds so a hand-built
/// `MonitorConfig` cannot overflow the timer or spin on a zero period.
const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);
const MAX_TICK_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Ticker whose first tick fires one `period` from now. Missed ticks are
/// delayed rather than bunched up.
pub(crate) fn ticker(period: Duration) -> Interval {
    let clamped = period.clamp(MIN_TICK_PERIOD, MAX_TICK_PERIOD);
    if clamped != period {
        warn!(requested = ?period, using = ?clamped, "Tick period out of range, clamping");
    }

    let mut interval = time::interval_at(Instant::now() + clamped, clamped);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Send `event` unless the run is cancelled first. Returns `false` when the
/// sender should give up (cancelled or the consumer is gone).
pub(crate) async fn emit(
    token: &CancellationToken,
    events: &mpsc::Sender<MonitorEvent>,
    event: MonitorEvent,
) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        sent = events.send(event) => sent.is_ok(),
    }
}

/// Hand every event to the notifier, in order, until cancelled. A notifier
/// that never returns is abandoned on cancellation.
async fn run_consumer(
    token: CancellationToken,
    mut events: mpsc::Receiver<MonitorEvent>,
    notifier: Arc<dyn Notifier>,
) {
    debug!("Event consumer started");
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => tokio::select! {
                    _ = token.cancelled() => break,
                    delivered = notifier.notify(&event) => {
                        if let Err(e) = delivered {
                            warn!("Failed to deliver monitor event: {:#}", e);
                        }
                    }
                },
                None => break,
            },
        }
    }
    debug!("Event consumer stopped");
}
