use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Only messages in this channel are handled.
    pub channel: String,
    /// Display name of the console operator.
    pub operator: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            channel: "schedule".to_string(),
            operator: "operator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {path:?}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.bot.channel, "schedule");
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let config: Config = toml::from_str("[bot]\nchannel = \"planning\"\n").unwrap();
        assert_eq!(config.bot.channel, "planning");
        assert_eq!(config.bot.operator, "operator");
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
    }
}
