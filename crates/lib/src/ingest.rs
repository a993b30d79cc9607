//! # Embedding Backfill
//!
//! The offline job that fills embedding columns: read every `(id, name)` pair
//! from a table, embed the text, and write the vector back keyed by `id`.
//! Each source row gets at most one write, and only to its own primary key.

use crate::{
    embedding::EmbeddingClient, errors::PromptError, providers::db::storage::EmbeddingStore,
};
use serde::Serialize;
use tracing::{info, warn};

/// A row the job could not embed.
#[derive(Debug, Clone, Serialize)]
pub struct BackfillFailure {
    pub id: i64,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillSummary {
    pub table: String,
    /// Rows read from the table.
    pub scanned: usize,
    /// Rows whose embedding was written.
    pub embedded: usize,
    pub failed: Vec<BackfillFailure>,
}

/// Embeds every row of `table` (or only rows without an embedding).
///
/// Embedding failures skip the row and are listed in the summary; store errors
/// abort the job.
pub async fn backfill_embeddings(
    store: &dyn EmbeddingStore,
    client: &EmbeddingClient,
    table: &str,
    only_missing: bool,
) -> Result<BackfillSummary, PromptError> {
    let sources = store.embedding_sources(table, only_missing).await?;
    info!(table, rows = sources.len(), "Starting embedding backfill.");

    let mut summary = BackfillSummary {
        table: table.to_string(),
        scanned: sources.len(),
        ..Default::default()
    };

    for (id, text) in sources {
        match client.embed(&text).await {
            Ok(vector) => {
                store.write_embedding(table, id, &vector).await?;
                summary.embedded += 1;
            }
            Err(e) => {
                warn!(table, id, "Skipping row: {e}");
                summary.failed.push(BackfillFailure {
                    id,
                    error: e.cause(),
                });
            }
        }
    }

    info!(
        table,
        embedded = summary.embedded,
        failed = summary.failed.len(),
        "Embedding backfill finished."
    );
    Ok(summary)
}
