//! Ambient settings and on-disk locations.
//!
//! Named search configurations live in `<home>/configs/*.json` (see
//! [`crate::store`]). Tool-wide settings such as timeouts and the embeddings
//! endpoint come from an optional `<home>/settings.toml`:
//!
//! ```toml
//! [mongo]
//! connect_timeout_secs = 10
//! query_timeout_secs = 30
//!
//! [embedding]
//! base_url = "https://api.voyageai.com"
//! model = "voyage-3.5"
//! timeout_secs = 10
//! ```
//!
//! `<home>` is `~/.atlas-search-cli` unless `ATLAS_SEARCH_CLI_HOME` is set.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CliError;

/// Environment variable that relocates the tool's home directory.
pub const HOME_ENV: &str = "ATLAS_SEARCH_CLI_HOME";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub mongo: MongoSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MongoSettings {
    /// Bound on client construction plus the initial ping.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Bound on running the aggregation and draining the cursor.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}
fn default_query_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used when neither `--voyageModel` nor the config names one.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.voyageai.com".to_string()
}
fn default_model() -> String {
    "voyage-3.5".to_string()
}
fn default_embedding_timeout() -> u64 {
    10
}

impl MongoSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl EmbeddingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Root directory for settings and saved configurations.
pub fn home_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".atlas-search-cli")
}

/// Directory holding one `<name>.json` file per saved configuration.
pub fn configs_dir(home: &Path) -> PathBuf {
    home.join("configs")
}

/// Load `<home>/settings.toml`, falling back to defaults when it is absent.
pub fn load_settings(home: &Path) -> Result<Settings, CliError> {
    let path = home.join("settings.toml");
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(source) => {
            return Err(CliError::Storage {
                context: "failed to read settings file",
                path,
                source,
            })
        }
    };

    let settings: Settings = toml::from_str(&content)
        .map_err(|e| CliError::Settings(format!("{}: {}", path.display(), e)))?;

    if settings.mongo.connect_timeout_secs == 0 {
        return Err(CliError::Settings(
            "mongo.connect_timeout_secs must be > 0".into(),
        ));
    }
    if settings.mongo.query_timeout_secs == 0 {
        return Err(CliError::Settings(
            "mongo.query_timeout_secs must be > 0".into(),
        ));
    }
    if settings.embedding.timeout_secs == 0 {
        return Err(CliError::Settings(
            "embedding.timeout_secs must be > 0".into(),
        ));
    }
    if settings.embedding.base_url.trim().is_empty() {
        return Err(CliError::Settings(
            "embedding.base_url must not be empty".into(),
        ));
    }
    if settings.embedding.model.trim().is_empty() {
        return Err(CliError::Settings("embedding.model must not be empty".into()));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_when_file_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings(tmp.path()).unwrap();
        assert_eq!(settings.mongo.connect_timeout_secs, 10);
        assert_eq!(settings.mongo.query_timeout_secs, 30);
        assert_eq!(settings.embedding.base_url, "https://api.voyageai.com");
        assert_eq!(settings.embedding.model, "voyage-3.5");
        assert_eq!(settings.embedding.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("settings.toml"),
            "[mongo]\nquery_timeout_secs = 5\n",
        )
        .unwrap();

        let settings = load_settings(tmp.path()).unwrap();
        assert_eq!(settings.mongo.query_timeout_secs, 5);
        assert_eq!(settings.mongo.connect_timeout_secs, 10);
        assert_eq!(settings.embedding.model, "voyage-3.5");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("settings.toml"),
            "[embedding]\ntimeout_secs = 0\n",
        )
        .unwrap();

        let err = load_settings(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("embedding.timeout_secs"));
    }

    #[test]
    fn malformed_toml_is_a_settings_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("settings.toml"), "[mongo\n").unwrap();

        let err = load_settings(tmp.path()).unwrap_err();
        assert!(matches!(err, CliError::Settings(_)));
    }

    #[test]
    fn configs_live_under_home() {
        let home = Path::new("/home/u/.atlas-search-cli");
        assert_eq!(
            configs_dir(home),
            PathBuf::from("/home/u/.atlas-search-cli/configs")
        );
    }
}
