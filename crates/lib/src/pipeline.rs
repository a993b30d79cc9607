//! # The Query Pipeline
//!
//! This module defines `QueryPipeline`, the entry point that drives one user
//! query from raw text to rows. It owns the four core components and walks each
//! request through the same state machine:
//!
//! ```text
//! Received -> Classified -> [EmbeddingPending -> Embedded | EmbeddingFailed]
//!          -> Synthesized | SynthesisFailed | Rejected
//!          -> Executed | ExecutionFailed -> Presented
//! ```
//!
//! A similarity query never reaches the store without an embedding, and a
//! generated query never reaches it without passing the read-only gate.

use crate::{
    classifier::IntentClassifier,
    embedding::EmbeddingClient,
    errors::{PromptError, QueryError},
    executor::QueryExecutor,
    providers::{
        ai::{AiProvider, EmbeddingProvider},
        db::{sqlite::SqliteProvider, storage::Storage},
        factory::{create_ai_provider, create_embedding_provider},
    },
    schema::SCHEMA_DESCRIPTION,
    synthesizer::QuerySynthesizer,
    types::{PipelineConfig, QueryIntent, QueryRequest, QueryRows, SynthesizedQuery, DEFAULT_TOP_K},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Every state a request can be in. The last five are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Received,
    Classified,
    EmbeddingPending,
    Embedded,
    Synthesized,
    Executed,
    EmbeddingFailed,
    SynthesisFailed,
    Rejected,
    ExecutionFailed,
    Presented,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::EmbeddingFailed
                | RequestState::SynthesisFailed
                | RequestState::Rejected
                | RequestState::ExecutionFailed
                | RequestState::Presented
        )
    }
}

impl From<&QueryError> for RequestState {
    fn from(err: &QueryError) -> Self {
        match err {
            QueryError::Embedding(_) => RequestState::EmbeddingFailed,
            QueryError::Synthesis(_) => RequestState::SynthesisFailed,
            QueryError::InvalidQuery { .. } => RequestState::Rejected,
            QueryError::Execution(_) => RequestState::ExecutionFailed,
        }
    }
}

/// The outcome of one request, ready for a presentation layer.
#[derive(Debug)]
pub struct QueryReport {
    pub query: String,
    pub intent: QueryIntent,
    /// The query text sent (or refused) to the store, when one was produced.
    pub generated_query: Option<String>,
    /// The row limit bound into a similarity template.
    pub top_k: Option<u32>,
    pub outcome: Result<QueryRows, QueryError>,
}

impl QueryReport {
    /// The terminal state this request ended in.
    pub fn state(&self) -> RequestState {
        match &self.outcome {
            Ok(_) => RequestState::Presented,
            Err(e) => RequestState::from(e),
        }
    }

    pub fn rows(&self) -> Option<&QueryRows> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.outcome.as_ref().err()
    }
}

fn transition(state: RequestState) {
    debug!(?state, "request state");
}

#[derive(Debug, Clone)]
pub struct QueryPipeline {
    classifier: IntentClassifier,
    embedding_client: EmbeddingClient,
    synthesizer: QuerySynthesizer,
    executor: QueryExecutor,
}

impl QueryPipeline {
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::new()
    }

    /// Builds a pipeline backed by the real collaborators and the embedded store.
    pub async fn from_config(config: &PipelineConfig) -> Result<Self, PromptError> {
        if config.db_host.is_some() || config.db_user.is_some() || config.db_credential.is_some() {
            warn!("db_host, db_user, and db_credential are ignored by the embedded Turso engine.");
        }
        let storage = SqliteProvider::new(&config.db_name).await?;
        info!(db_path = %config.db_name, "Initialized storage provider (Turso).");
        Self::with_storage(config, Box::new(storage))
    }

    /// Builds a pipeline from `config` around an already opened store.
    pub fn with_storage(
        config: &PipelineConfig,
        storage: Box<dyn Storage>,
    ) -> Result<Self, PromptError> {
        let ai_provider = create_ai_provider(&config.llm, config.llm_api_key.as_deref())?;
        let embedding_provider = create_embedding_provider(
            &config.embedding,
            config.embedding_api_key.as_deref(),
            Some("RETRIEVAL_QUERY"),
        )?;

        QueryPipelineBuilder::new()
            .ai_provider(ai_provider)
            .embedding_provider(embedding_provider)
            .storage(storage)
            .default_top_k(config.default_top_k)
            .similarity_keywords(config.similarity_keywords.clone())
            .prompts(config.system_prompt.clone(), config.user_prompt.clone())
            .build()
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn embedding_client(&self) -> &EmbeddingClient {
        &self.embedding_client
    }

    pub fn synthesizer(&self) -> &QuerySynthesizer {
        &self.synthesizer
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Runs one request to a terminal state. Never returns an unhandled failure:
    /// every stage's error ends up in `QueryReport::outcome`.
    pub async fn run(&self, request: QueryRequest) -> QueryReport {
        info!("Pipeline received query: '{}'", request.query);
        transition(RequestState::Received);

        let intent = self.classifier.classify(&request.query);
        transition(RequestState::Classified);
        debug!(?intent, "Classified query intent");

        let mut report = QueryReport {
            query: request.query.clone(),
            intent,
            generated_query: None,
            top_k: None,
            outcome: Ok(QueryRows::default()),
        };

        let synthesized = match intent {
            QueryIntent::SimilarityQuery => {
                transition(RequestState::EmbeddingPending);
                match self.embedding_client.embed(&request.query).await {
                    Ok(vector) => {
                        transition(RequestState::Embedded);
                        self.synthesizer.synthesize_similarity(vector, request.top_k)
                    }
                    Err(e) => return Self::finish(report, e),
                }
            }
            QueryIntent::StructuredQuery => {
                match self.synthesizer.synthesize_structured(&request.query).await {
                    Ok(template) => SynthesizedQuery {
                        template,
                        vector: None,
                        top_k: self.synthesizer.resolve_top_k(request.top_k),
                    },
                    Err(e) => {
                        if let QueryError::InvalidQuery { query, .. } = &e {
                            report.generated_query = Some(query.clone());
                        }
                        return Self::finish(report, e);
                    }
                }
            }
        };
        transition(RequestState::Synthesized);

        report.generated_query = Some(synthesized.template.sql.clone());
        if synthesized.vector.is_some() {
            report.top_k = Some(synthesized.top_k);
        }

        match self
            .executor
            .execute(
                &synthesized.template,
                synthesized.vector.as_ref(),
                synthesized.top_k,
            )
            .await
        {
            Ok(rows) => {
                transition(RequestState::Executed);
                info!("Query returned {} rows.", rows.len());
                report.outcome = Ok(rows);
                transition(RequestState::Presented);
                report
            }
            Err(e) => Self::finish(report, e),
        }
    }

    fn finish(mut report: QueryReport, err: QueryError) -> QueryReport {
        let state = RequestState::from(&err);
        warn!(?state, stage = %err.stage(), "Request failed: {err}");
        transition(state);
        report.outcome = Err(err);
        report
    }
}

/// A builder for `QueryPipeline`, taking each collaborator explicitly.
#[derive(Default)]
pub struct QueryPipelineBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    embedding_provider: Option<Box<dyn EmbeddingProvider>>,
    storage: Option<Box<dyn Storage>>,
    schema: Option<String>,
    default_top_k: Option<u32>,
    similarity_keywords: Option<Vec<String>>,
    system_prompt: Option<String>,
    user_prompt: Option<String>,
}

impl QueryPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ai_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    pub fn embedding_provider(mut self, provider: Box<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Overrides the schema description sent to the NL-to-SQL collaborator.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn default_top_k(mut self, top_k: u32) -> Self {
        self.default_top_k = Some(top_k);
        self
    }

    pub fn similarity_keywords(mut self, keywords: Vec<String>) -> Self {
        self.similarity_keywords = Some(keywords);
        self
    }

    pub fn prompts(mut self, system_prompt: Option<String>, user_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self.user_prompt = user_prompt;
        self
    }

    pub fn build(self) -> Result<QueryPipeline, PromptError> {
        let ai_provider: Arc<dyn AiProvider> = Arc::from(self.ai_provider.ok_or_else(|| {
            PromptError::MissingAiProvider("no NL-to-SQL provider was supplied".to_string())
        })?);
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::from(
            self.embedding_provider
                .ok_or(PromptError::MissingEmbeddingProvider)?,
        );
        let storage: Arc<dyn Storage> =
            Arc::from(self.storage.ok_or(PromptError::MissingStorageProvider)?);

        let default_top_k = self.default_top_k.filter(|k| *k > 0).unwrap_or(DEFAULT_TOP_K);
        let classifier = self
            .similarity_keywords
            .map(IntentClassifier::new)
            .unwrap_or_default();
        let synthesizer = QuerySynthesizer::new(
            ai_provider,
            self.schema.unwrap_or_else(|| SCHEMA_DESCRIPTION.to_string()),
        )
        .with_dialect(storage.language(), storage.name())
        .with_prompts(self.system_prompt, self.user_prompt)
        .with_default_top_k(default_top_k);

        Ok(QueryPipeline {
            classifier,
            embedding_client: EmbeddingClient::new(embedding_provider),
            synthesizer,
            executor: QueryExecutor::new(storage),
        })
    }
}
