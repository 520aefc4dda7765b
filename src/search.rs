//! `lexical` and `vector` commands.
//!
//! Each command resolves its parameters (saved config + flags), builds the
//! pipeline, and only then connects to MongoDB. Preparation is split from
//! execution so the resolution and pipeline logic can be exercised without a
//! database.

use std::path::PathBuf;

use mongodb::bson::Document;

use crate::config::Settings;
use crate::db;
use crate::embedding;
use crate::error::CliError;
use crate::merge::{self, FlagOverrides};
use crate::models::{Pipeline, SearchParams};
use crate::pipeline::{self, VectorOptions};
use crate::store::ConfigStore;

/// Arguments of `atlas-search lexical`.
#[derive(Debug, Clone, Default)]
pub struct LexicalRequest {
    pub query: String,
    pub config_name: Option<String>,
    pub flags: FlagOverrides,
    /// `--searchStageFile`: a `$search` body to use as a template.
    pub stage_file: Option<PathBuf>,
    pub limit: Option<u32>,
    pub verbose: bool,
}

/// Arguments of `atlas-search vector`.
#[derive(Debug, Clone, Default)]
pub struct VectorRequest {
    /// Text to embed, or a comma-separated vector when not embedding.
    pub query: String,
    pub config_name: Option<String>,
    pub flags: FlagOverrides,
    pub num_candidates: Option<u32>,
    pub limit: Option<u32>,
    pub embed_with_voyage: bool,
    pub verbose: bool,
}

/// Resolve parameters and build the lexical pipeline.
pub fn prepare_lexical(
    store: &dyn ConfigStore,
    request: &LexicalRequest,
) -> Result<(SearchParams, Pipeline), CliError> {
    let params = merge::resolve(
        store,
        request.config_name.as_deref(),
        request.flags.clone(),
    )?;
    merge::validate_lexical(&params)?;

    let pipeline = match &request.stage_file {
        Some(path) => {
            let template = pipeline::load_stage_file(path)?;
            pipeline::template_pipeline(&request.query, template, &params, request.limit)?
        }
        None => pipeline::lexical_pipeline(&request.query, &params, request.limit),
    };
    Ok((params, pipeline))
}

/// Resolve parameters, obtain the query vector, and build the vector
/// pipeline. The embeddings endpoint is called here, before any database
/// connection is made.
pub async fn prepare_vector(
    store: &dyn ConfigStore,
    settings: &Settings,
    request: &VectorRequest,
    env_api_key: Option<String>,
) -> Result<(SearchParams, Pipeline), CliError> {
    let params = merge::resolve(
        store,
        request.config_name.as_deref(),
        request.flags.clone(),
    )?;
    merge::validate_vector(&params)?;

    if params.field.len() > 1 {
        tracing::warn!(
            field = %params.field[0],
            "multiple fields given for vector search; only the first is used"
        );
    }

    let query_vector = if request.embed_with_voyage {
        let api_key = embedding::resolve_api_key(&params, env_api_key);
        let model = embedding::resolve_model(&params, &settings.embedding);
        let client = embedding::VoyageClient::new(&settings.embedding, &api_key, &model)?;
        if atty::is(atty::Stream::Stderr) {
            eprintln!("Fetching embeddings from Voyage AI ({})...", client.model());
        }
        client.embed(&request.query).await?
    } else {
        pipeline::parse_vector(&request.query)?
    };
    tracing::debug!(dims = query_vector.len(), "query vector ready");

    let options = VectorOptions::resolve(request.num_candidates, request.limit);
    let pipeline = pipeline::vector_pipeline(&query_vector, &params, options);
    Ok((params, pipeline))
}

pub async fn run_lexical(
    settings: &Settings,
    store: &dyn ConfigStore,
    request: LexicalRequest,
) -> Result<(), CliError> {
    let (params, pipeline) = prepare_lexical(store, &request)?;
    execute(settings, &params, &pipeline, request.verbose).await
}

pub async fn run_vector(
    settings: &Settings,
    store: &dyn ConfigStore,
    request: VectorRequest,
) -> Result<(), CliError> {
    let env_api_key = std::env::var(embedding::VOYAGE_API_KEY_ENV).ok();
    let (params, pipeline) = prepare_vector(store, settings, &request, env_api_key).await?;
    execute(settings, &params, &pipeline, request.verbose).await
}

/// Connect, run, print, and always disconnect.
async fn execute(
    settings: &Settings,
    params: &SearchParams,
    pipeline: &Pipeline,
    verbose: bool,
) -> Result<(), CliError> {
    if verbose {
        eprintln!("MongoDB Aggregation Pipeline:");
        eprintln!("{}", serde_json::to_string_pretty(pipeline)?);
    }

    let stages = db::to_bson_pipeline(pipeline)?;
    let client = db::connect(&params.connection_string, &settings.mongo).await?;
    let result = db::aggregate(
        &client,
        &params.db,
        &params.coll,
        stages,
        settings.mongo.query_timeout(),
    )
    .await;
    db::disconnect(client).await;

    match format_results(result?)? {
        Some(output) => println!("{}", output),
        None => println!("No results found."),
    }
    Ok(())
}

/// Pretty JSON array of the result documents, or `None` when there are none.
pub fn format_results(docs: Vec<Document>) -> Result<Option<String>, CliError> {
    if docs.is_empty() {
        return Ok(None);
    }
    let json = db::documents_to_json(docs);
    Ok(Some(serde_json::to_string_pretty(&json)?))
}
