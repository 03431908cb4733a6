// Nodewatch - connected-node monitor for a local manager
// Library exports

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod monitoring;
pub mod network;
pub mod node;
pub mod service;

pub use errors::{ConfigError, FetchError};
pub use monitoring::{MonitorConfig, MonitorEvent, NodeMonitor, Notifier};
pub use network::{NodeListClient, NodeSource};
pub use node::{NodeEvent, NodeRecord, NodeRegistry};
