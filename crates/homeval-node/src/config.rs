//! Node configuration.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Top-level configuration for the valuation service.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub server: ServerConfig,

    /// Path of the JSON model artifact.
    pub model_path: PathBuf,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl NodeConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOMEVAL_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("HOMEVAL_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8000,
        };

        let model_path = lookup("HOMEVAL_MODEL_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingModelPath)?;

        let log_level = lookup("HOMEVAL_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            model_path,
            log_level,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(|source| ConfigError::InvalidHost {
            host: self.host.clone(),
            source,
        })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("HOMEVAL_PORT must be a valid u16, got '{0}'")]
    InvalidPort(String),

    #[error("HOMEVAL_HOST '{host}' must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        host: String,
        source: std::net::AddrParseError,
    },

    #[error("HOMEVAL_MODEL_PATH must point to a model artifact")]
    MissingModelPath,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let config =
            NodeConfig::from_lookup(lookup(&[("HOMEVAL_MODEL_PATH", "model.json")])).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.model_path, PathBuf::from("model.json"));
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.server.socket_addr().unwrap(),
            SocketAddr::from(([0, 0, 0, 0], 8000))
        );
    }

    #[test]
    fn model_path_is_required() {
        let err = NodeConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingModelPath));
    }

    #[test]
    fn accepts_localhost_host() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("HOMEVAL_MODEL_PATH", "model.json"),
            ("HOMEVAL_HOST", "localhost"),
            ("HOMEVAL_PORT", "9100"),
        ]))
        .unwrap();

        let addr = config.server.socket_addr().unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 9100));
    }

    #[test]
    fn rejects_bad_port_and_host() {
        let err = NodeConfig::from_lookup(lookup(&[
            ("HOMEVAL_MODEL_PATH", "model.json"),
            ("HOMEVAL_PORT", "99999"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));

        let server = ServerConfig {
            host: "valuation.internal".to_string(),
            port: 8000,
        };
        assert!(matches!(
            server.socket_addr(),
            Err(ConfigError::InvalidHost { .. })
        ));
    }
}
