//! Aggregation pipeline construction.
//!
//! Two ways to build the search stage:
//!
//! - **Structured**: `$search` with a single `text` operator, or
//!   `$vectorSearch`, assembled from [`SearchParams`].
//! - **Template**: a user-supplied `$search` body (`--searchStageFile`) in
//!   which every `text`, `phrase`, and `autocomplete` operator, at any depth,
//!   receives the query string and a default `path`.
//!
//! Either way the pipeline ends with a `$project` stage built from
//! `projectField`.
//!
//! Stages are plain [`serde_json::Value`]s; conversion to BSON happens only
//! when the pipeline is sent to the server (see [`crate::db`]).

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::CliError;
use crate::models::{Pipeline, SearchParams};

/// Index used by `lexical` when neither config nor flags name one.
pub const DEFAULT_LEXICAL_INDEX: &str = "default";
/// Index used by `vector` when neither config nor flags name one.
pub const DEFAULT_VECTOR_INDEX: &str = "vector_index";
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_NUM_CANDIDATES: u32 = 100;
/// `numCandidates` per requested result when only `--limit` is given.
pub const CANDIDATES_PER_RESULT: u32 = 10;

/// Search operators whose bodies receive the query during template injection.
pub const QUERY_OPERATORS: [&str; 3] = ["text", "phrase", "autocomplete"];

/// `limit` and `numCandidates` for a `$vectorSearch` stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorOptions {
    pub num_candidates: u32,
    pub limit: u32,
}

impl VectorOptions {
    /// Resolve the stage sizes from the flags the user actually passed.
    ///
    /// `numCandidates` is taken verbatim when given. Otherwise it is
    /// `10 × limit` if `--limit` was given, and 100 if neither was.
    pub fn resolve(num_candidates: Option<u32>, limit: Option<u32>) -> Self {
        let num_candidates = match (num_candidates, limit) {
            (Some(n), _) => n,
            (None, Some(l)) => l.saturating_mul(CANDIDATES_PER_RESULT),
            (None, None) => DEFAULT_NUM_CANDIDATES,
        };
        Self {
            num_candidates,
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}

/// The `path` value for text operators: the configured fields, or every
/// indexed field when none are configured.
pub fn search_path(fields: &[String]) -> Value {
    if fields.is_empty() {
        json!({ "wildcard": "*" })
    } else {
        json!(fields)
    }
}

fn index_or<'a>(params: &'a SearchParams, fallback: &'a str) -> &'a str {
    if params.index.is_empty() {
        fallback
    } else {
        &params.index
    }
}

/// `$project` including each field with `_id` excluded, or an empty stage
/// when no fields are requested.
pub fn project_stage(fields: &[String]) -> Value {
    let mut projection = Map::new();
    if !fields.is_empty() {
        for field in fields {
            projection.insert(field.clone(), json!(1));
        }
        projection.insert("_id".to_string(), json!(0));
    }
    json!({ "$project": projection })
}

/// Structured lexical pipeline: `$search` → optional `$limit` → `$project`.
pub fn lexical_pipeline(query: &str, params: &SearchParams, limit: Option<u32>) -> Pipeline {
    let search = json!({
        "$search": {
            "index": index_or(params, DEFAULT_LEXICAL_INDEX),
            "text": {
                "query": query,
                "path": search_path(&params.field),
            }
        }
    });
    finish(search, params, limit)
}

/// Template lexical pipeline built from a `$search` body.
pub fn template_pipeline(
    query: &str,
    template: Value,
    params: &SearchParams,
    limit: Option<u32>,
) -> Result<Pipeline, CliError> {
    let mut body = unwrap_search_stage(template);
    inject_query(
        &mut body,
        query,
        &search_path(&params.field),
        index_or(params, DEFAULT_LEXICAL_INDEX),
    )?;
    Ok(finish(json!({ "$search": body }), params, limit))
}

/// Structured vector pipeline: `$vectorSearch` → `$project`.
///
/// Only the first configured field is used as the vector path.
pub fn vector_pipeline(
    query_vector: &[f64],
    params: &SearchParams,
    options: VectorOptions,
) -> Pipeline {
    let path = params.field.first().cloned().unwrap_or_default();
    let search = json!({
        "$vectorSearch": {
            "index": index_or(params, DEFAULT_VECTOR_INDEX),
            "path": path,
            "queryVector": query_vector,
            "numCandidates": options.num_candidates,
            "limit": options.limit,
        }
    });
    vec![search, project_stage(&params.project_field)]
}

fn finish(search: Value, params: &SearchParams, limit: Option<u32>) -> Pipeline {
    let mut pipeline = vec![search];
    if let Some(n) = limit {
        pipeline.push(json!({ "$limit": n }));
    }
    pipeline.push(project_stage(&params.project_field));
    pipeline
}

/// Accept either a bare `$search` body or a full `{"$search": {...}}` stage.
fn unwrap_search_stage(template: Value) -> Value {
    match template {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("$search") => {
            map.remove("$search").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Visit every object entry at any depth, calling `mutate` on the body of
/// each entry whose key satisfies `is_tag` and whose value is an object.
///
/// Children are visited after their parent is mutated, so tagged bodies
/// nested inside other tagged bodies are rewritten too.
pub fn rewrite_tagged<P, F>(value: &mut Value, is_tag: &P, mutate: &mut F)
where
    P: Fn(&str) -> bool,
    F: FnMut(&mut Map<String, Value>),
{
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_tag(key.as_str()) {
                    if let Value::Object(body) = child {
                        mutate(body);
                    }
                }
                rewrite_tagged(child, is_tag, mutate);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_tagged(item, is_tag, mutate);
            }
        }
        _ => {}
    }
}

/// Inject `query` into every query operator of a `$search` body, add
/// `default_path` where an operator has none, and set the top-level index
/// when the body does not name one.
pub fn inject_query(
    body: &mut Value,
    query: &str,
    default_path: &Value,
    index: &str,
) -> Result<(), CliError> {
    if !body.is_object() {
        return Err(CliError::Validation(
            "search stage template must be a JSON object".into(),
        ));
    }

    let is_operator = |key: &str| QUERY_OPERATORS.contains(&key);
    rewrite_tagged(body, &is_operator, &mut |operator| {
        operator.insert("query".to_string(), Value::String(query.to_string()));
        if !operator.contains_key("path") {
            operator.insert("path".to_string(), default_path.clone());
        }
    });

    if let Value::Object(top) = body {
        if !top.contains_key("index") {
            top.insert("index".to_string(), Value::String(index.to_string()));
        }
    }
    Ok(())
}

/// Read and parse a `--searchStageFile` document.
pub fn load_stage_file(path: &Path) -> Result<Value, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::StageFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| CliError::StageFile {
        path: path.to_path_buf(),
        reason: format!("invalid JSON: {}", e),
    })?;
    if !value.is_object() {
        return Err(CliError::StageFile {
            path: path.to_path_buf(),
            reason: "expected a JSON object containing a $search body".into(),
        });
    }
    Ok(value)
}

/// Parse a literal query vector such as `"0.1, -0.2,3"`.
pub fn parse_vector(s: &str) -> Result<Vec<f64>, CliError> {
    s.split(',')
        .enumerate()
        .map(|(i, part)| {
            let token = part.trim();
            token.parse::<f64>().map_err(|e| CliError::VectorParse {
                token: token.to_string(),
                position: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}
