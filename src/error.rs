//! Error taxonomy for search and configuration commands.
//!
//! Every failure inside a command handler is a [`CliError`]. Errors are
//! terminal for the current command: `main` prints the message (and a hint
//! when one applies) to stderr and exits with status 1. Nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Process exit code for a failed command.
pub const EXIT_ERROR: i32 = 1;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("configuration '{0}' not found")]
    ConfigNotFound(String),

    #[error("failed to parse configuration '{name}': {source}")]
    ConfigParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the configuration directory failed.
    #[error("{context} ({}): {source}", path.display())]
    Storage {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Settings(String),

    /// Missing connection string or unreachable deployment.
    #[error("{0}")]
    Connection(String),

    /// Required parameters missing after merging config and flags.
    #[error("{0}")]
    Validation(String),

    #[error(
        "Voyage AI API key not provided; set --voyageAPIKey, voyageAPIKey in the config, or VOYAGE_API_KEY"
    )]
    EmbeddingAuth,

    #[error("failed to send request to Voyage AI: {0}")]
    EmbeddingRequest(String),

    #[error("Voyage AI API returned non-200 status: {status}, body: {body}")]
    EmbeddingUpstream { status: u16, body: String },

    #[error("failed to parse Voyage AI response: {0}")]
    EmbeddingParse(String),

    #[error("no embeddings found in Voyage AI response")]
    EmbeddingEmpty,

    #[error("invalid vector component '{token}' at position {position}: {reason}")]
    VectorParse {
        token: String,
        position: usize,
        reason: String,
    },

    #[error("search stage file {}: {reason}", path.display())]
    StageFile { path: PathBuf, reason: String },

    #[error("aggregation failed: {0}")]
    Aggregation(String),

    #[error("failed to serialize results: {0}")]
    ResultSerialization(#[from] serde_json::Error),
}

impl CliError {
    /// An optional human-readable hint printed after the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::ConfigNotFound(_) => {
                Some("run `atlas-search config list` to see saved configurations")
            }
            CliError::ConfigParse { .. } => {
                Some("fix the JSON by hand or overwrite it with `atlas-search config set`")
            }
            CliError::Validation(_) => {
                Some("save the values with `atlas-search config set <name>` and pass --config <name>")
            }
            CliError::Connection(_) => Some("check the connection string and network access list"),
            CliError::EmbeddingUpstream { status: 401, .. } => Some("check the Voyage AI API key"),
            CliError::VectorParse { .. } => {
                Some("pass comma-separated numbers, or use --embedWithVoyage to embed text")
            }
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        EXIT_ERROR
    }
}
