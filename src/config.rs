//! TOML configuration.
//!
//! Every section is optional; a missing file yields [`Config::default`].
//! The loaded value is passed explicitly to each command.
//!
//! ```toml
//! [db]
//! dialect = "sqlite3"
//! path = "./data/cpe.sqlite"
//!
//! [feed]
//! url = "https://nvd.nist.gov/feeds/xml/cpe/dictionary/official-cpe-dictionary_v2.3.xml.gz"
//! proxy = "http://proxy.internal:3128"
//! timeout_secs = 300
//!
//! [ingest]
//! chunk_size = 500
//! on_malformed = "abort"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::FetchOptions;
use crate::store::Dialect;

pub const DEFAULT_FEED_URL: &str =
    "https://nvd.nist.gov/feeds/xml/cpe/dictionary/official-cpe-dictionary_v2.3.xml.gz";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_dialect")]
    pub dialect: String,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            path: default_db_path(),
        }
    }
}

fn default_dialect() -> String {
    "sqlite3".to_string()
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/cpe.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FeedConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            proxy: self.proxy.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    300
}

/// What to do with a feed item whose CPE name cannot be unbound.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the run before anything is written.
    #[default]
    Abort,
    /// Log a warning, drop the item and continue.
    Skip,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            on_malformed: MalformedPolicy::default(),
        }
    }
}

fn default_chunk_size() -> usize {
    500
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file means defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    if config.ingest.chunk_size == 0 {
        anyhow::bail!("ingest.chunk_size must be > 0");
    }

    if config.feed.timeout_secs == 0 {
        anyhow::bail!("feed.timeout_secs must be > 0");
    }

    config.db.dialect.parse::<Dialect>()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cpedict.toml");
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let (_tmp, path) = write_config("");
        let config = load_config(&path).unwrap();
        assert_eq!(config.db.dialect, "sqlite3");
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.ingest.chunk_size, 500);
        assert_eq!(config.ingest.on_malformed, MalformedPolicy::Abort);
        assert!(config.feed.proxy.is_none());
    }

    #[test]
    fn test_full_config() {
        let (_tmp, path) = write_config(
            r#"
[db]
dialect = "memory"
path = "/tmp/unused.sqlite"

[feed]
url = "http://mirror.local/cpe.xml.gz"
proxy = "http://proxy.local:3128"
timeout_secs = 30

[ingest]
chunk_size = 50
on_malformed = "skip"
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.db.dialect, "memory");
        assert_eq!(config.ingest.chunk_size, 50);
        assert_eq!(config.ingest.on_malformed, MalformedPolicy::Skip);

        let options = config.feed.fetch_options();
        assert_eq!(options.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(options.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let (_tmp, path) = write_config("[ingest]\nchunk_size = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_rejects_unknown_dialect() {
        let (_tmp, path) = write_config("[db]\ndialect = \"oracle\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let (_tmp, path) = write_config("[ingest]\non_malformed = \"ignore\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.ingest.chunk_size, 500);
        assert!(load_config(&tmp.path().join("absent.toml")).is_err());
    }
}
