//! Layering command-line overrides onto a saved configuration.
//!
//! Only flags the user actually passed take part in the merge. Scalars are
//! replaced; `--field` and `--projectField` values are appended after the
//! configuration's own values, so a saved list is augmented, never dropped.

use crate::error::CliError;
use crate::models::{NamedConfig, SearchParams};
use crate::store::ConfigStore;

/// Flags supplied on the command line. `None` means the flag was absent,
/// which is distinct from `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub connection_string: Option<String>,
    pub db: Option<String>,
    pub coll: Option<String>,
    pub index: Option<String>,
    pub field: Vec<String>,
    pub project_field: Vec<String>,
    pub voyage_api_key: Option<String>,
    pub voyage_model: Option<String>,
}

impl FlagOverrides {
    /// The configuration `config set` persists: exactly the supplied flags.
    pub fn into_config(self) -> NamedConfig {
        merge(NamedConfig::default(), self)
    }
}

/// Apply `flags` on top of `base`.
pub fn merge(base: NamedConfig, flags: FlagOverrides) -> SearchParams {
    let mut merged = base;

    if let Some(v) = flags.connection_string {
        merged.connection_string = v;
    }
    if let Some(v) = flags.db {
        merged.db = v;
    }
    if let Some(v) = flags.coll {
        merged.coll = v;
    }
    if let Some(v) = flags.index {
        merged.index = v;
    }
    merged.field.extend(flags.field);
    merged.project_field.extend(flags.project_field);
    if let Some(v) = flags.voyage_api_key {
        merged.voyage_api_key = v;
    }
    if let Some(v) = flags.voyage_model {
        merged.voyage_model = v;
    }

    merged
}

/// Load `config_name` from `store` (or start empty) and merge `flags` over it.
pub fn resolve(
    store: &dyn ConfigStore,
    config_name: Option<&str>,
    flags: FlagOverrides,
) -> Result<SearchParams, CliError> {
    let base = match config_name {
        Some(name) if !name.is_empty() => store.load(name)?,
        _ => NamedConfig::default(),
    };
    Ok(merge(base, flags))
}

/// Lexical search needs somewhere to run.
pub fn validate_lexical(params: &SearchParams) -> Result<(), CliError> {
    let missing = missing_connection_fields(params);
    if missing.is_empty() {
        return Ok(());
    }
    Err(CliError::Validation(format!(
        "{} must be provided either via config or flags",
        missing.join(", ")
    )))
}

/// Vector search additionally needs the embedding field. Only the first
/// field becomes the `$vectorSearch` path, so that one must be non-blank.
pub fn validate_vector(params: &SearchParams) -> Result<(), CliError> {
    let mut missing = missing_connection_fields(params);
    if params.field.first().map_or(true, |f| f.trim().is_empty()) {
        missing.push("field");
    }
    if missing.is_empty() {
        return Ok(());
    }
    Err(CliError::Validation(format!(
        "{} must be provided either via config or flags",
        missing.join(", ")
    )))
}

fn missing_connection_fields(params: &SearchParams) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if params.connection_string.is_empty() {
        missing.push("connectionString");
    }
    if params.db.is_empty() {
        missing.push("db");
    }
    if params.coll.is_empty() {
        missing.push("coll");
    }
    missing
}
