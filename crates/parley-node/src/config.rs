//! Node configuration types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Configuration for the relay node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// TCP front-end listen address.
    pub tcp_addr: SocketAddr,
    /// WebSocket front-end listen address.
    pub ws_addr: SocketAddr,
    /// History buffer capacity.
    pub chat_log_size: usize,
    /// Delay between connection setup and history replay, in milliseconds.
    pub replay_delay_ms: u64,
    /// Log level.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_addr: SocketAddr::from(([0, 0, 0, 0], 32167)),
            ws_addr: SocketAddr::from(([0, 0, 0, 0], 32168)),
            chat_log_size: 10,
            replay_delay_ms: 3000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file. Missing keys fall back to the
    /// defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// The replay delay as a [`Duration`].
    pub fn replay_delay(&self) -> Duration {
        Duration::from_millis(self.replay_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tcp_addr.port(), 32167);
        assert_eq!(config.ws_addr.port(), 32168);
        assert_eq!(config.chat_log_size, 10);
        assert_eq!(config.replay_delay_ms, 3000);
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config: Config = serde_yaml::from_str("chat_log_size: 5\n").unwrap();
        assert_eq!(config.chat_log_size, 5);
        assert_eq!(config.tcp_addr.port(), 32167);
        assert_eq!(config.replay_delay_ms, 3000);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "\
tcp_addr: 127.0.0.1:4000
ws_addr: 127.0.0.1:4001
chat_log_size: 50
replay_delay_ms: 100
log_level: debug
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tcp_addr.port(), 4000);
        assert_eq!(config.ws_addr.port(), 4001);
        assert_eq!(config.chat_log_size, 50);
        assert_eq!(config.replay_delay(), Duration::from_millis(100));
        assert_eq!(config.log_level, "debug");
    }
}
