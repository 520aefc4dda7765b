//! Storage abstraction for named search configurations.
//!
//! The [`ConfigStore`] trait is the read/write contract used by the command
//! handlers. Two implementations ship with the crate:
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`FsConfigStore`] | one pretty-printed JSON file per name under `~/.atlas-search-cli/configs` |
//! | [`InMemoryConfigStore`] | a map of serialized records, for tests |
//!
//! Both store the serialized JSON text, so parse failures surface the same way
//! regardless of backend.

pub mod fs;
pub mod memory;

pub use fs::FsConfigStore;
pub use memory::InMemoryConfigStore;

use crate::error::CliError;
use crate::models::NamedConfig;

/// Abstract storage for [`NamedConfig`] records keyed by name.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`save`](ConfigStore::save) | Write (or overwrite) a named configuration |
/// | [`load`](ConfigStore::load) | Read one configuration by name |
/// | [`list`](ConfigStore::list) | Names of all saved configurations, sorted |
pub trait ConfigStore: Send + Sync {
    /// Persist `config` under `name`, replacing any previous record.
    fn save(&self, name: &str, config: &NamedConfig) -> Result<(), CliError>;

    /// Fails with [`CliError::ConfigNotFound`] when nothing is stored under
    /// `name` and [`CliError::ConfigParse`] when the record is not valid JSON.
    fn load(&self, name: &str) -> Result<NamedConfig, CliError>;

    /// An empty list means no configurations have been saved yet.
    fn list(&self) -> Result<Vec<String>, CliError>;
}

/// Reject names that would escape the configuration directory.
pub fn validate_name(name: &str) -> Result<(), CliError> {
    if name.trim().is_empty() {
        return Err(CliError::Validation(
            "configuration name must not be empty".into(),
        ));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(CliError::Validation(format!(
            "invalid configuration name '{}': must not contain path separators",
            name
        )));
    }
    Ok(())
}

/// Decode a stored record, attributing parse failures to `name`.
pub(crate) fn decode(name: &str, raw: &str) -> Result<NamedConfig, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::ConfigParse {
        name: name.to_string(),
        source,
    })
}

/// Encode a record the way it is written to disk: two-space pretty JSON.
pub(crate) fn encode(config: &NamedConfig) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_valid() {
        assert!(validate_name("prod").is_ok());
        assert!(validate_name("movies-dev_2").is_ok());
    }

    #[test]
    fn traversal_names_are_rejected() {
        for name in ["", "  ", "..", ".", "a/b", "..\\x"] {
            assert!(
                matches!(validate_name(name), Err(CliError::Validation(_))),
                "expected '{}' to be rejected",
                name
            );
        }
    }

    #[test]
    fn decode_reports_name_on_bad_json() {
        let err = decode("broken", "{ not json").unwrap_err();
        match err {
            CliError::ConfigParse { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
