use crate::errors::PromptError;
use crate::types::{BoundStatement, EmbeddingVector, QueryRows};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a storage backend.
///
/// Implementations receive a fully bound statement and are responsible for
/// encoding bind values in their own native syntax. A connection is acquired per
/// call and released before the call returns, whatever the outcome.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "Turso").
    fn name(&self) -> &str;

    /// Returns the query language the provider speaks (e.g., "SQLite").
    fn language(&self) -> &str;

    /// Executes a bound statement and returns its rows.
    async fn execute(&self, statement: &BoundStatement) -> Result<QueryRows, PromptError>;
}

dyn_clone::clone_trait_object!(Storage);

/// Reads and writes embedding columns, for the offline backfill job.
#[async_trait]
pub trait EmbeddingStore: Send + Sync + Debug {
    /// Returns `(id, name)` for every row of `table`, or only for rows without an
    /// embedding when `only_missing` is set.
    async fn embedding_sources(
        &self,
        table: &str,
        only_missing: bool,
    ) -> Result<Vec<(i64, String)>, PromptError>;

    /// Writes `vector` into the embedding column of the row keyed by `id`.
    async fn write_embedding(
        &self,
        table: &str,
        id: i64,
        vector: &EmbeddingVector,
    ) -> Result<(), PromptError>;
}
