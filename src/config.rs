use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Port cameras push alarms to unless told otherwise
pub const DEFAULT_PORT: u16 = 15002;

/// Listener settings, taken from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind; empty means all interfaces
    pub addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: String::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        let host = if self.addr.is_empty() {
            "0.0.0.0"
        } else {
            self.addr.as_str()
        };
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

/// Shinobi video-management backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShinobiConfig {
    /// Base URL, e.g. `http://shinobi.local:8080`
    pub url: String,
    pub api_key: String,
    pub group_key: String,

    /// Camera host -> monitor id. Hosts not listed here are looked up
    /// through the monitor list API.
    #[serde(default)]
    pub monitors: HashMap<String, String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_motion_name")]
    pub motion_name: String,
    #[serde(default = "default_confidence")]
    pub confidence: u32,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_motion_name() -> String {
    "alarm-server".to_string()
}

fn default_confidence() -> u32 {
    100
}

/// Process-wide configuration, loaded once at startup and never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub shinobi: ShinobiConfig,
}

impl AppConfig {
    /// Load the backend configuration file. A missing or invalid file is an
    /// error; there is no usable default backend.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&config_str)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_json(config_str: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(config_str)?;
        if config.shinobi.url.trim().is_empty() {
            anyhow::bail!("shinobi.url must not be empty");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        assert_eq!(ServerConfig::default().listen_addr(), "0.0.0.0:15002");

        let cfg = ServerConfig {
            addr: "127.0.0.1".to_string(),
            port: 9000,
        };
        assert_eq!(cfg.listen_addr(), "127.0.0.1:9000");

        let cfg = ServerConfig {
            addr: "::1".to_string(),
            port: 9000,
        };
        assert_eq!(cfg.listen_addr(), "[::1]:9000");
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_json(
            r#"{"shinobi": {"url": "http://nvr:8080", "api_key": "k", "group_key": "g"}, "ignored": true}"#,
        )
        .unwrap();

        assert_eq!(config.shinobi.url, "http://nvr:8080");
        assert!(config.shinobi.monitors.is_empty());
        assert_eq!(config.shinobi.timeout_secs, 10);
        assert_eq!(config.shinobi.motion_name, "alarm-server");
        assert_eq!(config.shinobi.confidence, 100);
    }

    #[test]
    fn test_config_monitors() {
        let config = AppConfig::from_json(
            r#"{"shinobi": {"url": "http://nvr", "api_key": "k", "group_key": "g",
                "monitors": {"192.168.1.10": "frontdoor"}, "confidence": 80}}"#,
        )
        .unwrap();

        assert_eq!(
            config.shinobi.monitors.get("192.168.1.10").map(String::as_str),
            Some("frontdoor")
        );
        assert_eq!(config.shinobi.confidence, 80);
    }

    #[test]
    fn test_config_rejects_invalid() {
        assert!(AppConfig::from_json("").is_err());
        assert!(AppConfig::from_json(r#"{"shinobi": {"url": ""}}"#).is_err());
        assert!(AppConfig::from_json(
            r#"{"shinobi": {"url": " ", "api_key": "k", "group_key": "g"}}"#
        )
        .is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/alarm-bridge/config.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
