//! Run configuration
//!
//! A run is parameterized either from CLI flags or from a TOML file with
//! the same fields. Defaults are collected in [`defaults`] so every entry
//! point agrees on them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default configuration constants
pub mod defaults {

    /// IPs assigned to each host. The global IP list is sliced into
    /// contiguous blocks of this size, one block per host.
    pub const IPS_PER_HOST: usize = 8;

    /// Number of share names exported by each server (`mount1`..`mount8`).
    /// Matches [`IPS_PER_HOST`]: slot i of a host's block mounts share i+1.
    pub const SHARE_COUNT: usize = 8;

    /// Default fio thread count per mount point
    pub const TOTAL_THREADS: u32 = 8192;

    /// Default base directory for mount points
    pub const fn default_mount_base() -> &'static str {
        "/mnt"
    }

    /// Default log level
    pub const fn default_log_level() -> &'static str {
        "info"
    }
}

/// Run configuration
///
/// `hosts` and `ip_addresses` must be identical on every host of the fleet;
/// partitioning is positional and falls apart if the lists diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// All hostnames in the fleet, in partition order
    pub hosts: Vec<String>,

    /// All NFS server IPs, 8 per host, in partition order
    pub ip_addresses: Vec<String>,

    /// Base directory under which per-IP mount points are created
    #[serde(default = "default_mount_base")]
    pub mount_base: PathBuf,

    /// fio `numjobs` value, used directly per mount point
    #[serde(default = "default_total_threads")]
    pub total_threads: u32,
}

fn default_mount_base() -> PathBuf {
    PathBuf::from(defaults::default_mount_base())
}

fn default_total_threads() -> u32 {
    defaults::TOTAL_THREADS
}

impl RunConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::ReadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: RunConfig = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::ValidationError(
                "Host list cannot be empty".to_string(),
            ));
        }

        if self.ip_addresses.is_empty() {
            return Err(ConfigError::ValidationError(
                "IP address list cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
            hosts = ["h1", "h2"]
            ip_addresses = ["10.0.0.1", "10.0.0.2"]
            mount_base = "/srv/bench"
            total_threads = 64
            "#,
        );

        let config = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(config.hosts, vec!["h1", "h2"]);
        assert_eq!(config.ip_addresses.len(), 2);
        assert_eq!(config.mount_base, PathBuf::from("/srv/bench"));
        assert_eq!(config.total_threads, 64);
    }

    #[test]
    fn test_defaults_applied() {
        let file = write_config(
            r#"
            hosts = ["h1"]
            ip_addresses = ["10.0.0.1"]
            "#,
        );

        let config = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mount_base, PathBuf::from("/mnt"));
        assert_eq!(config.total_threads, defaults::TOTAL_THREADS);
    }

    #[test]
    fn test_missing_required_key_names_field() {
        let file = write_config(r#"hosts = ["h1"]"#);

        let err = RunConfig::from_file(file.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ip_addresses"), "error was: {}", msg);
    }

    #[test]
    fn test_malformed_document() {
        let file = write_config("hosts = [unclosed");

        assert!(matches!(
            RunConfig::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_unreadable_path() {
        let path = std::path::Path::new("/nonexistent/fiobal.toml");
        assert!(matches!(
            RunConfig::from_file(path),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn test_empty_lists_rejected() {
        let file = write_config(
            r#"
            hosts = []
            ip_addresses = ["10.0.0.1"]
            "#,
        );

        assert!(matches!(
            RunConfig::from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
