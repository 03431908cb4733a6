// Configuration structs

use super::constants::{
    DEFAULT_DISCOVERY_ADDR, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_HEARTBEAT_INTERVAL_MINS,
    DEFAULT_MANAGER_ADDR, DEFAULT_POLL_INTERVAL_SECS, MAX_FETCH_TIMEOUT_SECS,
    MAX_HEARTBEAT_INTERVAL_MINS, MAX_POLL_INTERVAL_SECS,
};
use crate::errors::ConfigError;
use crate::monitoring::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Where the node lists come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Local manager, host:port
    pub address: String,
    /// Discovery service, host:port
    pub discovery_address: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_MANAGER_ADDR.to_string(),
            discovery_address: DEFAULT_DISCOVERY_ADDR.to_string(),
        }
    }
}

/// Polling and heartbeat cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Seconds between manager polls
    pub interval_secs: u64,
    /// Minutes between heartbeat reports
    pub heartbeat_interval_mins: u64,
    /// Seconds before a node-list request is abandoned
    pub fetch_timeout_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            heartbeat_interval_mins: DEFAULT_HEARTBEAT_INTERVAL_MINS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable debug logging for troubleshooting
    pub debug: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub manager: ManagerConfig,
    pub monitor: MonitorSettings,
    pub logging: LoggingConfig,
}

impl Config {
    /// Normalise addresses and reject values the monitor cannot run with.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.manager.address = normalize_address("manager.address", &self.manager.address)?;
        self.manager.discovery_address =
            normalize_address("manager.discovery_address", &self.manager.discovery_address)?;

        check_range(
            "monitor.interval_secs",
            self.monitor.interval_secs,
            MAX_POLL_INTERVAL_SECS,
        )?;
        check_range(
            "monitor.heartbeat_interval_mins",
            self.monitor.heartbeat_interval_mins,
            MAX_HEARTBEAT_INTERVAL_MINS,
        )?;
        check_range(
            "monitor.fetch_timeout_secs",
            self.monitor.fetch_timeout_secs,
            MAX_FETCH_TIMEOUT_SECS,
        )?;

        Ok(self)
    }

    /// Settings handed to the monitor.
    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        let heartbeat_secs = self
            .monitor
            .heartbeat_interval_mins
            .checked_mul(60)
            .ok_or(ConfigError::IntervalTooLarge {
                field: "monitor.heartbeat_interval_mins",
                max: MAX_HEARTBEAT_INTERVAL_MINS,
            })?;

        Ok(MonitorConfig {
            manager_address: self.manager.address.clone(),
            discovery_address: self.manager.discovery_address.clone(),
            poll_interval: Duration::from_secs(self.monitor.interval_secs),
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor.fetch_timeout_secs)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[manager]")?;
        writeln!(f, "  address = {:?}", self.manager.address)?;
        writeln!(f, "  discovery_address = {:?}", self.manager.discovery_address)?;
        writeln!(f, "[monitor]")?;
        writeln!(f, "  interval_secs = {}", self.monitor.interval_secs)?;
        writeln!(f, "  heartbeat_interval_mins = {}", self.monitor.heartbeat_interval_mins)?;
        writeln!(f, "  fetch_timeout_secs = {}", self.monitor.fetch_timeout_secs)?;
        writeln!(f, "[logging]")?;
        write!(f, "  debug = {}", self.logging.debug)
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroInterval { field });
    }
    if value > max {
        return Err(ConfigError::IntervalTooLarge { field, max });
    }
    Ok(())
}

/// Reduce an address to `host:port`, tolerating a leading `http://` and a
/// trailing slash.
fn normalize_address(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyAddress { field });
    }

    let mut address = trimmed;
    for scheme in ["http://", "https://"] {
        if let Some(rest) = address.strip_prefix(scheme) {
            warn!(field, "Address is prefixed with {}; using {}", scheme, rest);
            address = rest;
        }
    }
    let address = address.trim_end_matches('/');

    let valid = match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && !host.contains('/') && port.parse::<u16>().is_ok(),
        None => false,
    };
    if !valid {
        return Err(ConfigError::InvalidAddress {
            field,
            value: raw.to_string(),
        });
    }

    Ok(address.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.manager.address, "127.0.0.1:8000");
        assert_eq!(config.manager.discovery_address, "discovery.skycoin.net:8001");
        assert_eq!(config.monitor.interval_secs, 10);
        assert_eq!(config.monitor.heartbeat_interval_mins, 120);
        assert_eq!(config.monitor.fetch_timeout_secs, 30);
        assert!(!config.logging.debug);
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_monitor_config_durations() {
        let mc = Config::default().monitor_config().unwrap();
        assert_eq!(mc.poll_interval, Duration::from_secs(10));
        assert_eq!(mc.heartbeat_interval, Duration::from_secs(2 * 60 * 60));
        assert_eq!(mc.manager_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_scheme_and_slash_are_stripped() {
        let mut config = Config::default();
        config.manager.address = "http://10.0.0.5:8000/".to_string();
        let config = config.validated().unwrap();
        assert_eq!(config.manager.address, "10.0.0.5:8000");
    }

    #[test]
    fn test_empty_address_rejected() {
        let mut config = Config::default();
        config.manager.discovery_address = "  ".to_string();
        assert_eq!(
            config.validated(),
            Err(ConfigError::EmptyAddress {
                field: "manager.discovery_address"
            })
        );
    }

    #[test]
    fn test_address_without_port_rejected() {
        let mut config = Config::default();
        config.manager.address = "localhost".to_string();
        assert!(matches!(
            config.validated(),
            Err(ConfigError::InvalidAddress { field: "manager.address", .. })
        ));
    }

    #[test]
    fn test_address_with_path_rejected() {
        let mut config = Config::default();
        config.manager.address = "localhost:8000/conn/getAll".to_string();
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = Config::default();
        config.monitor.interval_secs = 0;
        assert_eq!(
            config.validated(),
            Err(ConfigError::ZeroInterval {
                field: "monitor.interval_secs"
            })
        );
    }

    #[test]
    fn test_oversized_intervals_rejected() {
        let mut config = Config::default();
        config.monitor.heartbeat_interval_mins = u64::MAX / 2;
        assert_eq!(
            config.validated(),
            Err(ConfigError::IntervalTooLarge {
                field: "monitor.heartbeat_interval_mins",
                max: MAX_HEARTBEAT_INTERVAL_MINS
            })
        );

        let mut config = Config::default();
        config.monitor.interval_secs = MAX_POLL_INTERVAL_SECS + 1;
        assert!(matches!(
            config.validated(),
            Err(ConfigError::IntervalTooLarge { field: "monitor.interval_secs", .. })
        ));

        let mut config = Config::default();
        config.monitor.fetch_timeout_secs = u64::MAX;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_upper_bounds_accepted() {
        let mut config = Config::default();
        config.monitor.interval_secs = MAX_POLL_INTERVAL_SECS;
        config.monitor.heartbeat_interval_mins = MAX_HEARTBEAT_INTERVAL_MINS;
        config.monitor.fetch_timeout_secs = MAX_FETCH_TIMEOUT_SECS;
        let mc = config.validated().unwrap().monitor_config().unwrap();
        assert_eq!(
            mc.heartbeat_interval,
            Duration::from_secs(MAX_HEARTBEAT_INTERVAL_MINS * 60)
        );
    }

    #[test]
    fn test_monitor_config_overflow_is_an_error() {
        // Unvalidated input must not panic when converted to seconds.
        let mut config = Config::default();
        config.monitor.heartbeat_interval_mins = u64::MAX / 2;
        assert!(matches!(
            config.monitor_config(),
            Err(ConfigError::IntervalTooLarge { .. })
        ));
    }

    #[test]
    fn test_display_lists_sections() {
        let text = Config::default().to_string();
        assert!(text.contains("[manager]"));
        assert!(text.contains("address = \"127.0.0.1:8000\""));
        assert!(text.contains("heartbeat_interval_mins = 120"));
    }
}
