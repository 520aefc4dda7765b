//! Core data models shared by the store, the merge layer, and the pipeline
//! builder.

use serde::{Deserialize, Serialize};

/// A named configuration as persisted in `<configDir>/<name>.json`.
///
/// Empty strings and empty lists are omitted on write, so a file only holds
/// the keys that were actually set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamedConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub connection_string: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub db: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub coll: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub index: String,
    /// Fields to search. Repeatable on the command line.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field: Vec<String>,
    /// Fields to include in the `$project` stage.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_field: Vec<String>,
    #[serde(rename = "voyageAPIKey", skip_serializing_if = "String::is_empty")]
    pub voyage_api_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub voyage_model: String,
}

/// Parameters for one search invocation: a [`NamedConfig`] with command-line
/// overrides applied. Never persisted.
pub type SearchParams = NamedConfig;

/// An ordered list of aggregation stages.
pub type Pipeline = Vec<serde_json::Value>;
