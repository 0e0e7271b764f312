//! Configuration loading and database path resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`database` key)
/// 4. Platform data directory default (fallback)
pub fn resolve_database_path(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(database) = config.get("database").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(database));
                }
            }
        }
    }

    // Priority 4: Platform default
    Ok(default_database_path())
}

/// Locate the config file for the platform (~/.config/biosync/config.toml,
/// falling back to /etc/biosync/config.toml on Linux)
fn locate_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("biosync").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/biosync/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Default database location in the platform data directory
fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("biosync")
        .join("biosync.db")
}

/// Reconciliation tuning parameters.
///
/// Both values encode operational knowledge about the latency of the two
/// external pipelines being compared and are injected at construction time
/// rather than hard-coded at the comparison sites.
#[derive(Debug, Clone, Copy)]
pub struct ReconSettings {
    /// Maximum skew between report and API timestamps still treated as
    /// the same instant
    pub timestamp_tolerance_secs: i64,
    /// Inventory-report observation window: a report row first seen more
    /// than this many days before an API-side disposal never receives the
    /// disposal update
    pub staleness_window_days: i64,
}

impl Default for ReconSettings {
    fn default() -> Self {
        Self {
            timestamp_tolerance_secs: 3600,
            staleness_window_days: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_takes_priority() {
        let path = resolve_database_path(Some("/tmp/cli.db"), "BIOSYNC_TEST_DB_UNSET").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/cli.db"));
    }

    #[test]
    fn test_env_var_used_when_no_cli_arg() {
        std::env::set_var("BIOSYNC_TEST_DB_PRIORITY", "/tmp/env.db");
        let path = resolve_database_path(None, "BIOSYNC_TEST_DB_PRIORITY").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/env.db"));
        std::env::remove_var("BIOSYNC_TEST_DB_PRIORITY");
    }

    #[test]
    fn test_default_settings() {
        let settings = ReconSettings::default();
        assert_eq!(settings.timestamp_tolerance_secs, 3600);
        assert_eq!(settings.staleness_window_days, 10);
    }
}
