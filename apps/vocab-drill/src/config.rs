//! Configuration for vocab drill.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_deck_path")]
    pub deck_path: PathBuf,
    #[serde(default)]
    pub results_path: Option<PathBuf>,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_deck_path() -> PathBuf {
    PathBuf::from("vocab.csv")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deck_path: default_deck_path(),
            results_path: None,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vocab-drill")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Where answers and practice durations are appended.
    pub fn results_path(&self) -> PathBuf {
        self.results_path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("", "", "vocab-drill")
                    .map(|d| d.data_dir().join("results.csv"))
            })
            .unwrap_or_else(|| PathBuf::from("results.csv"))
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log.path.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "vocab-drill")
                .map(|d| d.data_dir().join("vocab-drill.log"))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            level: "debug".to_string(),
        }
    }
}
