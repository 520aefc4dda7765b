//! `config set`, `config list` and `config get`.
//!
//! The `render_*` functions build the text each command prints so the output
//! can be checked without capturing stdout.

use crate::error::CliError;
use crate::merge::FlagOverrides;
use crate::models::NamedConfig;
use crate::store::{validate_name, ConfigStore};

/// Visible suffix length of a redacted API key.
const KEY_SUFFIX_LEN: usize = 4;

/// Save exactly the supplied flags under `name`, replacing any previous
/// record.
pub fn set(store: &dyn ConfigStore, name: &str, flags: FlagOverrides) -> Result<String, CliError> {
    validate_name(name)?;
    let config = flags.into_config();
    store.save(name, &config)?;
    Ok(format!("Configuration '{}' saved successfully.", name))
}

pub fn list(store: &dyn ConfigStore) -> Result<String, CliError> {
    let names = store.list()?;
    Ok(render_list(&names))
}

/// The stored configuration as pretty JSON, API key redacted.
pub fn get(store: &dyn ConfigStore, name: &str) -> Result<String, CliError> {
    validate_name(name)?;
    let mut config = store.load(name)?;
    config.voyage_api_key = redact_key(&config.voyage_api_key);
    render_config(&config)
}

pub fn render_list(names: &[String]) -> String {
    if names.is_empty() {
        return "No configurations found.".to_string();
    }
    let mut out = String::from("Available Configurations:");
    for name in names {
        out.push_str("\n- ");
        out.push_str(name);
    }
    out
}

fn render_config(config: &NamedConfig) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// `sk-abcdef1234` → `****1234`. Keys of four characters or fewer are fully
/// masked; an empty key stays empty.
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= KEY_SUFFIX_LEN {
        return "*".repeat(chars.len());
    }
    let suffix: String = chars[chars.len() - KEY_SUFFIX_LEN..].iter().collect();
    format!("****{}", suffix)
}
