//! # Atlas Search CLI (`atlas-search`)
//!
//! Runs MongoDB Atlas Search queries from the command line, with reusable
//! named configurations for connection and search settings.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `atlas-search config set <name>` | Save the supplied flags as a named configuration |
//! | `atlas-search config list` | List saved configurations |
//! | `atlas-search config get <name>` | Show a saved configuration (API key redacted) |
//! | `atlas-search lexical "<query>"` | Full-text `$search` query |
//! | `atlas-search vector "<query>"` | `$vectorSearch` with a literal or Voyage AI vector |
//!
//! ## Examples
//!
//! ```bash
//! # Save connection details once
//! atlas-search config set movies --connectionString "$MONGODB_URI" \
//!     --db sample_mflix --coll movies --projectField title --projectField year
//!
//! # Lexical search against specific fields
//! atlas-search lexical "space odyssey" --config movies --field title --field plot
//!
//! # Lexical search from a compound $search template
//! atlas-search lexical "heat" --config movies --searchStageFile ./stage.json --verbose
//!
//! # Vector search, embedding the query with Voyage AI
//! atlas-search vector "heist gone wrong" --config movies \
//!     --field plot_embedding --embedWithVoyage --limit 5
//! ```

use std::path::PathBuf;

use atlas_search_cli::config;
use atlas_search_cli::config_cmd;
use atlas_search_cli::error::CliError;
use atlas_search_cli::merge::FlagOverrides;
use atlas_search_cli::search::{self, LexicalRequest, VectorRequest};
use atlas_search_cli::store::FsConfigStore;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "atlas-search",
    about = "Run MongoDB Atlas Search queries from the command line",
    version
)]
struct Cli {
    /// Print the aggregation pipeline and debug logs to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage named configurations.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Full-text search using the `$search` stage.
    Lexical {
        /// Search text.
        #[arg(allow_hyphen_values = true)]
        query: String,

        /// Saved configuration to start from.
        #[arg(long)]
        config: Option<String>,

        #[command(flatten)]
        flags: SearchFlags,

        /// JSON file holding a `$search` body; the query is injected into it.
        #[arg(long = "searchStageFile")]
        search_stage_file: Option<PathBuf>,

        /// Maximum number of results.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
    },

    /// Approximate nearest-neighbour search using `$vectorSearch`.
    ///
    /// QUERY is a comma-separated vector, or text to embed with
    /// `--embedWithVoyage`.
    Vector {
        #[arg(allow_hyphen_values = true)]
        query: String,

        /// Saved configuration to start from.
        #[arg(long)]
        config: Option<String>,

        #[command(flatten)]
        flags: SearchFlags,

        /// Candidates considered by the ANN search (default: 10 x limit, or 100).
        #[arg(long = "numCandidates", value_parser = clap::value_parser!(u32).range(1..))]
        num_candidates: Option<u32>,

        /// Maximum number of results (default: 10).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,

        /// Embed QUERY with Voyage AI instead of parsing it as a vector.
        #[arg(long = "embedWithVoyage")]
        embed_with_voyage: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Save the supplied flags under NAME, replacing any previous record.
    Set {
        name: String,

        #[command(flatten)]
        flags: SearchFlags,
    },
    /// List saved configurations.
    List,
    /// Print a saved configuration.
    Get { name: String },
}

/// Connection and search settings shared by every command that takes them.
#[derive(Args)]
struct SearchFlags {
    /// MongoDB connection string.
    #[arg(long = "connectionString")]
    connection_string: Option<String>,

    /// Database name.
    #[arg(long)]
    db: Option<String>,

    /// Collection name.
    #[arg(long)]
    coll: Option<String>,

    /// Search index name.
    #[arg(long)]
    index: Option<String>,

    /// Field to search (repeatable).
    #[arg(long)]
    field: Vec<String>,

    /// Field to include in results (repeatable).
    #[arg(long = "projectField")]
    project_field: Vec<String>,

    /// Voyage AI API key (falls back to VOYAGE_API_KEY).
    #[arg(long = "voyageAPIKey")]
    voyage_api_key: Option<String>,

    /// Voyage AI embedding model.
    #[arg(long = "voyageModel")]
    voyage_model: Option<String>,
}

impl From<SearchFlags> for FlagOverrides {
    fn from(f: SearchFlags) -> Self {
        FlagOverrides {
            connection_string: f.connection_string,
            db: f.db,
            coll: f.coll,
            index: f.index,
            field: f.field,
            project_field: f.project_field,
            voyage_api_key: f.voyage_api_key,
            voyage_model: f.voyage_model,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("hint: {}", hint);
        }
        std::process::exit(e.exit_code());
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let home = config::home_dir();
    let store = FsConfigStore::new(config::configs_dir(&home));
    tracing::debug!(home = %home.display(), "using configuration home");

    match cli.command {
        Commands::Config { action } => {
            let output = match action {
                ConfigAction::Set { name, flags } => config_cmd::set(&store, &name, flags.into())?,
                ConfigAction::List => config_cmd::list(&store)?,
                ConfigAction::Get { name } => config_cmd::get(&store, &name)?,
            };
            println!("{}", output);
        }
        Commands::Lexical {
            query,
            config,
            flags,
            search_stage_file,
            limit,
        } => {
            let settings = config::load_settings(&home)?;
            let request = LexicalRequest {
                query,
                config_name: config,
                flags: flags.into(),
                stage_file: search_stage_file,
                limit,
                verbose: cli.verbose,
            };
            search::run_lexical(&settings, &store, request).await?;
        }
        Commands::Vector {
            query,
            config,
            flags,
            num_candidates,
            limit,
            embed_with_voyage,
        } => {
            let settings = config::load_settings(&home)?;
            let request = VectorRequest {
                query,
                config_name: config,
                flags: flags.into(),
                num_candidates,
                limit,
                embed_with_voyage,
                verbose: cli.verbose,
            };
            search::run_vector(&settings, &store, request).await?;
        }
    }
    Ok(())
}
