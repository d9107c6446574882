//! Configuration loading for Recensio.
//! Reads recensio.toml from the current directory or path in RECENSIO_CONFIG
//! env var; a missing file means defaults throughout.

use recensio_common::FeedSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub digest:  DigestConfig,
    #[serde(default)]
    pub llm:     LlmConfig,
    #[serde(default)]
    pub paths:   PathsConfig,
    /// Replaces the built-in domain feed list when non-empty.
    #[serde(default)]
    pub feeds:   Vec<FeedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_start_year")]
    pub start_year:   i32,
    #[serde(default = "default_max_papers")]
    pub max_papers:   usize,
    #[serde(default = "default_max_per_feed")]
    pub max_per_feed: usize,
}

fn default_start_year()   -> i32   { 2022 }
fn default_max_papers()   -> usize { 5 }
fn default_max_per_feed() -> usize { 15 }

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            start_year:   default_start_year(),
            max_papers:   default_max_papers(),
            max_per_feed: default_max_per_feed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String { "gpt-4-turbo-preview".to_string() }

impl Default for LlmConfig {
    fn default() -> Self {
        Self { model: default_model() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir:   String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_history")]
    pub history:    String,
}

fn default_data_dir()   -> String { "data".to_string() }
fn default_output_dir() -> String { "output".to_string() }
fn default_history()    -> String { "data/processed_papers.json".to_string() }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir:   default_data_dir(),
            output_dir: default_output_dir(),
            history:    default_history(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub name: String,
    pub url:  String,
}

impl Config {
    /// Load configuration from recensio.toml.
    /// Checks RECENSIO_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("RECENSIO_CONFIG")
            .unwrap_or_else(|_| "recensio.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::debug!(path, "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn feed_sources(&self) -> Vec<FeedSource> {
        if self.feeds.is_empty() {
            return recensio_feeds::sources::default_feeds();
        }
        self.feeds
            .iter()
            .map(|f| FeedSource { name: f.name.clone(), url: f.url.clone() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.digest.start_year, 2022);
        assert_eq!(config.digest.max_papers, 5);
        assert_eq!(config.digest.max_per_feed, 15);
        assert_eq!(config.llm.model, "gpt-4-turbo-preview");
        assert_eq!(config.paths.data_dir, "data");
        assert_eq!(config.feed_sources().len(), 10);
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            "[digest]\nstart_year = 2024\n\n[[feeds]]\nname = \"Custom\"\nurl = \"https://example.com/rss\"\n",
        )
        .unwrap();
        assert_eq!(config.digest.start_year, 2024);
        assert_eq!(config.digest.max_papers, 5);
        let feeds = config.feed_sources();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].name, "Custom");
    }
}
