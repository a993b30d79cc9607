//! # Embedding Client
//!
//! Wraps an `EmbeddingProvider` and converts every collaborator failure into a
//! `QueryError::Embedding`. There are no retries here.

use crate::{
    errors::{PromptError, QueryError},
    providers::ai::EmbeddingProvider,
    types::EmbeddingVector,
};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingClient {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Converts `text` into an embedding, making exactly one call to the provider
    /// for non-empty input.
    pub async fn embed(&self, text: &str) -> Result<EmbeddingVector, QueryError> {
        if text.trim().is_empty() {
            return Err(QueryError::Embedding(PromptError::EmptyInput));
        }

        let vector = self.provider.embed(text).await.map_err(|e| {
            warn!("Embedding provider failed: {e}");
            QueryError::Embedding(e)
        })?;

        if vector.dimension() != self.provider.dimension() {
            return Err(QueryError::Embedding(
                PromptError::EmbeddingDimensionMismatch {
                    expected: self.provider.dimension(),
                    actual: vector.dimension(),
                },
            ));
        }

        debug!(dimension = vector.dimension(), "Generated query embedding");
        Ok(vector)
    }
}
