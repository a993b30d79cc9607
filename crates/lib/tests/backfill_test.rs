//! # Embedding Backfill Tests

mod common;

use anyhow::Result;
use async_trait::async_trait;
use common::setup_tracing;
use std::sync::Arc;
use vecsql::{
    errors::PromptError,
    ingest::backfill_embeddings,
    providers::{ai::EmbeddingProvider, db::storage::EmbeddingStore},
    EmbeddingClient, EmbeddingVector,
};
use vecsql_test_utils::{MockEmbeddingProvider, TestSetup};

/// Delegates to the demo embedder but fails for any text containing `word`.
#[derive(Clone, Debug)]
struct FailOnWord {
    inner: MockEmbeddingProvider,
    word: &'static str,
}

#[async_trait]
impl EmbeddingProvider for FailOnWord {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, PromptError> {
        if text.contains(self.word) {
            return Err(PromptError::AiApi(format!("cannot embed '{text}'")));
        }
        self.inner.embed(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

#[tokio::test]
async fn every_row_gets_exactly_one_embedding() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    let embedder = MockEmbeddingProvider::demo();
    let client = EmbeddingClient::new(Arc::new(embedder.clone()));

    let summary = backfill_embeddings(&setup.provider, &client, "products", false).await?;

    assert_eq!(summary.table, "products");
    assert_eq!(summary.scanned, 6);
    assert_eq!(summary.embedded, 6);
    assert!(summary.failed.is_empty());
    assert_eq!(embedder.call_count(), 6);
    assert!(setup
        .provider
        .embedding_sources("products", true)
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn only_missing_skips_rows_that_already_have_embeddings() -> Result<()> {
    let setup = TestSetup::new().await?;
    let embedder = MockEmbeddingProvider::demo();
    setup
        .provider
        .write_embedding("products", 1, &EmbeddingVector::new(embedder.vector_for("notebook")))
        .await?;
    let client = EmbeddingClient::new(Arc::new(embedder.clone()));

    let summary = backfill_embeddings(&setup.provider, &client, "products", true).await?;

    assert_eq!(summary.scanned, 5);
    assert_eq!(summary.embedded, 5);
    Ok(())
}

#[tokio::test]
async fn embedding_failures_skip_the_row_and_are_reported() -> Result<()> {
    let setup = TestSetup::new().await?;
    let client = EmbeddingClient::new(Arc::new(FailOnWord {
        inner: MockEmbeddingProvider::demo(),
        word: "Chair",
    }));

    let summary = backfill_embeddings(&setup.provider, &client, "products", false).await?;

    assert_eq!(summary.embedded, 4);
    let mut failed_ids: Vec<i64> = summary.failed.iter().map(|f| f.id).collect();
    failed_ids.sort();
    assert_eq!(failed_ids, vec![2, 6]);
    assert!(summary.failed[0].error.contains("cannot embed"));

    let missing = setup.provider.embedding_sources("products", true).await?;
    let missing_ids: Vec<i64> = missing.iter().map(|(id, _)| *id).collect();
    assert_eq!(missing_ids, vec![2, 6]);
    Ok(())
}

#[tokio::test]
async fn orders_are_embedded_from_customer_name() -> Result<()> {
    let setup = TestSetup::new().await?;
    let client = EmbeddingClient::new(Arc::new(MockEmbeddingProvider::demo()));

    let sources = setup.provider.embedding_sources("orders", false).await?;
    assert_eq!(
        sources,
        vec![(1, "Acme Corp".to_string()), (2, "Globex".to_string())]
    );

    let summary = backfill_embeddings(&setup.provider, &client, "orders", false).await?;
    assert_eq!(summary.embedded, 2);
    Ok(())
}

#[tokio::test]
async fn tables_without_an_embedding_column_are_refused() -> Result<()> {
    let setup = TestSetup::new().await?;
    let embedder = MockEmbeddingProvider::demo();
    let client = EmbeddingClient::new(Arc::new(embedder.clone()));

    let result = backfill_embeddings(&setup.provider, &client, "employees", false).await;

    assert!(matches!(result, Err(PromptError::UnsupportedTable(_))));
    assert_eq!(embedder.call_count(), 0);
    Ok(())
}
