//! Configuration management
//!
//! Storage locations and matcher tuning, persisted as TOML under the
//! platform config directory. Missing config is created with defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the knowledge base and blacklist live
    #[serde(default)]
    pub storage: StorageConfig,
    /// Fuzzy matching settings
    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// Storage file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding the question/answer pairs
    #[serde(default = "default_knowledge_file")]
    pub knowledge_file: PathBuf,
    /// Newline-delimited forbidden terms
    #[serde(default = "default_blacklist_file")]
    pub blacklist_file: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apprentice")
}

fn default_knowledge_file() -> PathBuf {
    default_data_dir().join("knowledge.json")
}

fn default_blacklist_file() -> PathBuf {
    default_data_dir().join("blacklist.txt")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            knowledge_file: default_knowledge_file(),
            blacklist_file: default_blacklist_file(),
        }
    }
}

/// Fuzzy matching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity score for a query to count as matched
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    crate::matcher::MATCH_THRESHOLD
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "apprentice", "apprentice")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!("  knowledge file:  {}", config.storage.knowledge_file.display());
    println!("  blacklist file:  {}", config.storage.blacklist_file.display());
    println!("  match threshold: {:.2}", config.matcher.threshold);
    println!();
    println!("Use 'apprentice config' without --show to list the available options.");

    Ok(())
}

/// Set the match threshold
pub fn set_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("Threshold must be between 0.0 and 1.0, got {}", threshold);
    }

    let mut config = Config::load()?;
    config.matcher.threshold = threshold;
    config.save()?;
    println!("Match threshold set to {:.2}", threshold);
    Ok(())
}

/// Set the knowledge file path
pub fn set_knowledge_file(path: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.storage.knowledge_file = PathBuf::from(path);
    config.save()?;
    println!("Knowledge file set to {}", path);
    Ok(())
}

/// Set the blacklist file path
pub fn set_blacklist_file(path: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.storage.blacklist_file = PathBuf::from(path);
    config.save()?;
    println!("Blacklist file set to {}", path);
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}
