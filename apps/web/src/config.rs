//! Web server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use tally_db::DbConfig;

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Listen address (default: 127.0.0.1)
    pub bind_addr: IpAddr,

    /// Listen port (default: 5000)
    pub port: u16,

    /// SQLite database file (default: sales.db)
    pub db_path: PathBuf,

    /// Pool size (default: 5)
    pub db_max_connections: u32,

    /// Seed the default catalog into an empty database (default: true)
    pub seed_default_items: bool,

    /// Optional directory served under `/static`
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            db_path: PathBuf::from("sales.db"),
            db_max_connections: 5,
            seed_default_items: true,
            static_dir: None,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WebConfig::default();

        let config = WebConfig {
            bind_addr: parse_or(&lookup, "TALLY_BIND_ADDR", defaults.bind_addr)?,

            port: parse_or(&lookup, "TALLY_PORT", defaults.port)?,

            db_path: lookup("TALLY_DB_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            db_max_connections: parse_or(
                &lookup,
                "TALLY_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            seed_default_items: parse_or(
                &lookup,
                "TALLY_SEED_DEFAULT_ITEMS",
                defaults.seed_default_items,
            )?,

            static_dir: lookup("TALLY_STATIC_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "TALLY_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Socket address the server listens on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.db_max_connections)
            .seed_defaults(self.seed_default_items)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        _ => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WebConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.db_path, PathBuf::from("sales.db"));
        assert_eq!(config.db_max_connections, 5);
        assert!(config.seed_default_items);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TALLY_BIND_ADDR", "0.0.0.0"),
            ("TALLY_PORT", "8080"),
            ("TALLY_DB_PATH", "/var/lib/tally/shop.db"),
            ("TALLY_SEED_DEFAULT_ITEMS", "false"),
            ("TALLY_STATIC_DIR", "./static"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/tally/shop.db"));
        assert!(!config.seed_default_items);
        assert_eq!(config.static_dir, Some(PathBuf::from("./static")));

        let db = config.db_config();
        assert!(!db.seed_defaults);
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("TALLY_PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for TALLY_PORT");

        assert!(load(&[("TALLY_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("TALLY_SEED_DEFAULT_ITEMS", "maybe")]).is_err());
    }
}
