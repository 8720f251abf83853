use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub targets_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    /// SLUGLINE_DATABASE_URL defaults to "sqlite://slugline.db",
    /// SLUGLINE_TARGETS_PATH to "targets.json".
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("SLUGLINE_DATABASE_URL")
            .unwrap_or_else(|| "sqlite://slugline.db".to_string());

        let listen_addr = lookup("SLUGLINE_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("SLUGLINE_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let targets_path = lookup("SLUGLINE_TARGETS_PATH")
            .unwrap_or_else(|| "targets.json".to_string())
            .into();

        Ok(Config {
            listen_addr,
            database_url,
            targets_path,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite://slugline.db");
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.targets_path, PathBuf::from("targets.json"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SLUGLINE_DATABASE_URL", "sqlite::memory:"),
            ("SLUGLINE_LISTEN_ADDR", "127.0.0.1:8080"),
            ("SLUGLINE_TARGETS_PATH", "/etc/slugline/targets.json"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(
            config.targets_path,
            PathBuf::from("/etc/slugline/targets.json")
        );
    }

    #[test]
    fn test_invalid_listen_addr() {
        let err = config_from(&[("SLUGLINE_LISTEN_ADDR", "nope")]).unwrap_err();
        assert!(err.to_string().contains("SLUGLINE_LISTEN_ADDR"));
    }
}
