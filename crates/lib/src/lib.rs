//! # Natural Language to Hybrid Query
//!
//! This crate turns natural-language questions into executable queries against a
//! relational store with vector similarity search. A keyword classifier routes
//! each question either to the canned vector-search template (bound to a query
//! embedding) or to an NL-to-SQL model whose output must pass a read-only gate.
//! The result is executed with typed parameter binding and returned as rows or
//! as a failure tagged with the stage that produced it.

pub mod classifier;
pub mod embedding;
pub mod errors;
pub mod executor;
pub mod ingest;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod sql_guard;
pub mod synthesizer;
pub mod types;

pub use classifier::{classify, IntentClassifier};
pub use embedding::EmbeddingClient;
pub use errors::{PromptError, QueryError, Stage};
pub use executor::QueryExecutor;
pub use pipeline::{QueryPipeline, QueryPipelineBuilder, QueryReport, RequestState};
pub use synthesizer::QuerySynthesizer;
pub use types::{
    ColumnValue, EmbeddingVector, PipelineConfig, QueryIntent, QueryRequest, QueryRows,
    QueryTemplate,
};
