//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The query pipeline and the backfill job share one
//! Turso database.

use crate::config::AppConfig;
use std::sync::Arc;
use tracing::{info, warn};
use vecsql::{
    providers::{db::sqlite::SqliteProvider, factory::create_embedding_provider},
    EmbeddingClient, QueryPipeline,
};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// Classifier, embedding client, synthesizer, and executor for `/query`.
    pub pipeline: Arc<QueryPipeline>,
    /// The store, also used directly by the backfill job.
    pub sqlite_provider: Arc<SqliteProvider>,
    /// Embeds stored rows (document task type) for the backfill job.
    pub document_embedder: EmbeddingClient,
}

/// Builds the shared application state from the configuration.
///
/// Opens the database, ensures the schema exists, and wires the configured
/// collaborators into a `QueryPipeline`.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let pipeline_config = config.pipeline_config();
    if pipeline_config.db_host.is_some()
        || pipeline_config.db_user.is_some()
        || pipeline_config.db_credential.is_some()
    {
        warn!("db_host, db_user, and db_credential are ignored by the embedded Turso engine.");
    }

    let sqlite_provider = SqliteProvider::new(&pipeline_config.db_name).await?;
    info!(db_path = %pipeline_config.db_name, "Initialized storage provider (Turso).");
    // Ensure the database schema exists on startup.
    sqlite_provider.initialize_schema().await?;

    let pipeline = QueryPipeline::with_storage(&pipeline_config, Box::new(sqlite_provider.clone()))?;

    let document_embedder = EmbeddingClient::new(Arc::from(create_embedding_provider(
        &pipeline_config.embedding,
        pipeline_config.embedding_api_key.as_deref(),
        Some("RETRIEVAL_DOCUMENT"),
    )?));

    Ok(AppState {
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
        sqlite_provider: Arc::new(sqlite_provider),
        document_embedder,
    })
}
