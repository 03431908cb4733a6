// Project-wide constants
//
// Centralised here so addresses, intervals and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

use std::time::Duration;

/// Default address of the local manager.
pub const DEFAULT_MANAGER_ADDR: &str = "127.0.0.1:8000";

/// Default address of the discovery service.
pub const DEFAULT_DISCOVERY_ADDR: &str = "discovery.skycoin.net:8001";

/// Relative path of the node-list endpoint on both services.
pub const NODE_LIST_PATH: &str = "conn/getAll";

/// Default seconds between manager polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default minutes between heartbeat status reports.
pub const DEFAULT_HEARTBEAT_INTERVAL_MINS: u64 = 120;

/// Default seconds before a node-list request is abandoned.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Upper bounds accepted from configuration (one day, thirty days, one hour).
pub const MAX_POLL_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const MAX_HEARTBEAT_INTERVAL_MINS: u64 = 30 * 24 * 60;
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 60 * 60;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS);

/// Buffered events between the monitor tasks and the notifier.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// User-Agent sent with every node-list request.
pub const USER_AGENT: &str = concat!("nodewatch/", env!("CARGO_PKG_VERSION"));
