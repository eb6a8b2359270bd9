use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::storage::backend::BackendOptions;
use crate::Result;

/// Server configuration, loaded from a TOML file. Key names match the
/// config files the original deployment shipped with; unknown keys are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// host:port to bind.
    #[serde(rename = "Listen")]
    pub listen: String,

    /// Non-empty enables AUTH gating with this password.
    #[serde(rename = "RequirePass")]
    pub require_pass: String,

    #[serde(rename = "LogLevel")]
    pub log_level: String,

    /// Directory base under which databases 0-15 are opened.
    #[serde(rename = "LevelDBPath")]
    pub leveldb_path: PathBuf,

    /// Pass-through tuning options for the backend store.
    #[serde(rename = "LevelDB")]
    pub leveldb: BackendOptions,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            listen: "127.0.0.1:6379".to_string(),
            require_pass: String::new(),
            log_level: "info".to_string(),
            leveldb_path: PathBuf::from("./data"),
            leveldb: BackendOptions::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_options() {
        let config: Config = toml::from_str(
            r#"
            Listen = "0.0.0.0:6380"
            RequirePass = "hunter2"
            LogLevel = "debug"
            LevelDBPath = "/var/lib/rodis"

            [LevelDB]
            BlockCacheCapacity = 8388608
            Compression = true
            "#,
        )
        .unwrap();

        assert_eq!(config.listen, "0.0.0.0:6380");
        assert_eq!(config.require_pass, "hunter2");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.leveldb_path, PathBuf::from("/var/lib/rodis"));
        assert_eq!(config.leveldb.block_cache_capacity, Some(8388608));
        assert_eq!(config.leveldb.compression, Some(true));
    }

    #[test]
    fn defaults_apply_to_missing_options() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.listen, "127.0.0.1:6379");
        assert!(config.require_pass.is_empty());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn unknown_options_are_ignored() {
        let config: Config = toml::from_str(
            r#"
            App = "rodis"
            Version = 0.2
            Listen = "127.0.0.1:7000"
            "#,
        )
        .unwrap();
        assert_eq!(config.listen, "127.0.0.1:7000");
    }
}
