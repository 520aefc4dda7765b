//! MongoDB connection and aggregation execution.
//!
//! The client is owned by the calling command: [`connect`] verifies the
//! deployment with a `ping` inside the connect timeout, [`aggregate`] runs a
//! pipeline inside the query timeout, and [`disconnect`] shuts the client
//! down.

use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::Client;
use serde_json::Value;

use crate::config::MongoSettings;
use crate::error::CliError;

const APP_NAME: &str = "atlas-search-cli";

pub async fn connect(
    connection_string: &str,
    settings: &MongoSettings,
) -> Result<Client, CliError> {
    if connection_string.trim().is_empty() {
        return Err(CliError::Connection(
            "MongoDB connection string is empty".into(),
        ));
    }

    let timeout = settings.connect_timeout();
    let attempt = async {
        let mut options = ClientOptions::parse(connection_string)
            .await
            .map_err(|e| CliError::Connection(format!("invalid connection string: {}", e)))?;
        options.app_name.get_or_insert_with(|| APP_NAME.to_string());
        options.connect_timeout.get_or_insert(timeout);
        options.server_selection_timeout.get_or_insert(timeout);

        let client = Client::with_options(options)
            .map_err(|e| CliError::Connection(format!("failed to connect to MongoDB: {}", e)))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| CliError::Connection(format!("failed to ping MongoDB: {}", e)))?;
        Ok::<_, CliError>(client)
    };

    let client = tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| {
            CliError::Connection(format!(
                "timed out connecting to MongoDB after {}s",
                timeout.as_secs()
            ))
        })??;

    tracing::debug!("connected to MongoDB");
    Ok(client)
}

/// Convert JSON stages into BSON documents for the driver.
pub fn to_bson_pipeline(pipeline: &[Value]) -> Result<Vec<Document>, CliError> {
    pipeline
        .iter()
        .map(|stage| {
            mongodb::bson::to_document(stage)
                .map_err(|e| CliError::Aggregation(format!("invalid pipeline stage: {}", e)))
        })
        .collect()
}

/// Run `pipeline` against `db.coll` and collect every result document.
pub async fn aggregate(
    client: &Client,
    db: &str,
    coll: &str,
    pipeline: Vec<Document>,
    timeout: Duration,
) -> Result<Vec<Document>, CliError> {
    let collection = client.database(db).collection::<Document>(coll);
    let run = async {
        let cursor = collection
            .aggregate(pipeline)
            .await
            .map_err(|e| CliError::Aggregation(e.to_string()))?;
        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| CliError::Aggregation(format!("error reading results: {}", e)))
    };

    let docs = tokio::time::timeout(timeout, run).await.map_err(|_| {
        CliError::Aggregation(format!("timed out after {}s", timeout.as_secs()))
    })??;

    tracing::debug!(count = docs.len(), db, coll, "aggregation finished");
    Ok(docs)
}

pub async fn disconnect(client: Client) {
    client.shutdown().await;
    tracing::debug!("disconnected from MongoDB");
}

/// Result documents as relaxed Extended JSON (ObjectIds become `{"$oid": ..}`).
pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(
        docs.into_iter()
            .map(|d| Bson::Document(d).into_relaxed_extjson())
            .collect(),
    )
}
