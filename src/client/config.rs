use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::PROTOCOL_VERSION;
use super::keepalive::KEEPALIVE_INTERVAL;

/// Longest player name the server accepts.
pub const MAX_NAME_LEN: usize = 16;

/// Settings for one bot. Missing fields in a config file take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub host: String,
    /// The server's internal port, not a proxy in front of it.
    pub port: u16,
    pub name: String,
    pub protocol_version: i32,
    pub keepalive_interval_secs: u64,
    /// Connect from a distinct loopback address per bot.
    pub bind_local_address: bool,
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 25565,
            name: "Bot1".into(),
            protocol_version: PROTOCOL_VERSION,
            keepalive_interval_secs: KEEPALIVE_INTERVAL.as_secs(),
            bind_local_address: true,
            log_level: "info".into(),
        }
    }
}

impl BotConfig {
    pub fn new(host: impl Into<String>, port: u16, name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".simplebot")
            .join("config.json")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidConfig("bot name is empty".into()));
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidConfig(format!(
                "bot name {:?} is longer than {MAX_NAME_LEN} characters",
                self.name
            )));
        }
        if self.keepalive_interval_secs == 0 {
            return Err(Error::InvalidConfig("keepalive interval must be positive".into()));
        }
        Ok(())
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert_eq!(config.port, 25565);
        assert_eq!(config.protocol_version, 13);
        assert_eq!(config.keepalive_interval(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: BotConfig = serde_json::from_str(r#"{"name": "Miner", "port": 25566}"#).unwrap();
        assert_eq!(config.name, "Miner");
        assert_eq!(config.port, 25566);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.bind_local_address);
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("simplebot-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"host": "10.0.0.5", "name": "Digger"}"#).unwrap();
        let config = BotConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config, BotConfig::new("10.0.0.5", 25565, "Digger"));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let path = std::env::temp_dir().join(format!("simplebot-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ nope").unwrap();
        let err = BotConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_validate() {
        assert!(BotConfig::new("h", 1, "").validate().is_err());
        assert!(BotConfig::new("h", 1, "ABCDEFGHIJKLMNOPQ").validate().is_err());
        assert!(BotConfig::new("h", 1, "ABCDEFGHIJKLMNOP").validate().is_ok());

        let mut config = BotConfig::default();
        config.keepalive_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_path() {
        assert!(BotConfig::default_path().ends_with(".simplebot/config.json"));
    }
}
