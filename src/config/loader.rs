// Configuration loader
// Loads ~/.nodewatch/config.toml (or an explicit path), then applies
// NODEWATCH_* environment overrides and validates the result.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::settings::Config;

pub const ENV_MANAGER_ADDRESS: &str = "NODEWATCH_MANAGER_ADDRESS";
pub const ENV_DISCOVERY_ADDRESS: &str = "NODEWATCH_DISCOVERY_ADDRESS";
pub const ENV_INTERVAL_SECS: &str = "NODEWATCH_INTERVAL_SECS";
pub const ENV_HEARTBEAT_INTERVAL_MINS: &str = "NODEWATCH_HEARTBEAT_INTERVAL_MINS";

/// Default config file location.
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".nodewatch").join("config.toml"))
}

/// Load configuration.
///
/// With `path` given the file must exist. Without it the default location is
/// tried and built-in defaults are used when no file is there.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            read_config_file(path)?
        }
        None => {
            let path = default_config_path()?;
            if path.exists() {
                read_config_file(&path)?
            } else {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Config::default()
            }
        }
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    config
        .validated()
        .context("Configuration validation failed")
}

fn read_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("Failed to parse configuration in {}", path.display()))?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Parse TOML text; missing sections and keys fall back to defaults.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("Invalid configuration TOML")
}

/// Apply `NODEWATCH_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(address) = lookup(ENV_MANAGER_ADDRESS) {
        config.manager.address = address;
    }
    if let Some(address) = lookup(ENV_DISCOVERY_ADDRESS) {
        config.manager.discovery_address = address;
    }
    if let Some(secs) = lookup(ENV_INTERVAL_SECS) {
        config.monitor.interval_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds", ENV_INTERVAL_SECS))?;
    }
    if let Some(mins) = lookup(ENV_HEARTBEAT_INTERVAL_MINS) {
        config.monitor.heartbeat_interval_mins = mins.trim().parse().with_context(|| {
            format!("{} must be a whole number of minutes", ENV_HEARTBEAT_INTERVAL_MINS)
        })?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [manager]
            address = "192.168.0.2:8000"

            [monitor]
            interval_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.manager.address, "192.168.0.2:8000");
        assert_eq!(config.manager.discovery_address, "discovery.skycoin.net:8001");
        assert_eq!(config.monitor.interval_secs, 30);
        assert_eq!(config.monitor.heartbeat_interval_mins, 120);
    }

    #[test]
    fn test_parse_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(parse_config("[monitor]\ninterval_secs = \"often\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_MANAGER_ADDRESS, "10.1.1.1:8000"),
            (ENV_INTERVAL_SECS, " 5 "),
            (ENV_HEARTBEAT_INTERVAL_MINS, "1"),
        ]
        .into_iter()
        .collect();

        let config =
            apply_env_overrides(Config::default(), |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.manager.address, "10.1.1.1:8000");
        assert_eq!(config.monitor.interval_secs, 5);
        assert_eq!(config.monitor.heartbeat_interval_mins, 1);
        assert_eq!(config.manager.discovery_address, "discovery.skycoin.net:8001");
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let result = apply_env_overrides(Config::default(), |k| {
            (k == ENV_INTERVAL_SECS).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_no_overrides_is_identity() {
        let config = apply_env_overrides(Config::default(), no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[manager]\naddress = \"http://127.0.0.1:9000\"\n[logging]\ndebug = true\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.logging.debug);
        // Overrides from the test process environment are not expected here.
        if std::env::var(ENV_MANAGER_ADDRESS).is_err() {
            assert_eq!(config.manager.address, "127.0.0.1:9000");
        }
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[monitor]\nfetch_timeout_secs = 0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
