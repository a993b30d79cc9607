#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the `vecsql` integration tests. Mocks live in
//! `vecsql-test-utils`; this module wires them into pipelines.

use dotenvy::dotenv;
use std::sync::Once;
use vecsql::{QueryPipeline, QueryPipelineBuilder};
use vecsql_test_utils::{CountingStorage, MockAiProvider, MockEmbeddingProvider};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Builds a pipeline from the given mocks, keeping handles for assertions.
pub fn mock_pipeline(
    ai: &MockAiProvider,
    embedder: &MockEmbeddingProvider,
    storage: &CountingStorage,
) -> QueryPipeline {
    QueryPipelineBuilder::new()
        .ai_provider(Box::new(ai.clone()))
        .embedding_provider(Box::new(embedder.clone()))
        .storage(Box::new(storage.clone()))
        .build()
        .expect("pipeline should build from mocks")
}
