//! # Embeddings Provider
//!
//! This module provides functionality for generating vector embeddings by calling
//! an external embeddings API, either Gemini's `embedContent` or any
//! OpenAI-compatible `/embeddings` endpoint.

use crate::{errors::PromptError, providers::ai::EmbeddingProvider, types::EmbeddingVector};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use tracing::debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

// --- Gemini-specific request and response structures ---

#[derive(Serialize, Debug)]
struct GeminiEmbeddingRequest<'a> {
    model: String,
    content: GeminiEmbeddingContent<'a>,
    #[serde(rename = "taskType", skip_serializing_if = "Option::is_none")]
    task_type: Option<&'a str>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingContent<'a> {
    parts: Vec<GeminiEmbeddingPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingResponse {
    embedding: GeminiEmbeddingValue,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingValue {
    values: Vec<f32>,
}

fn is_gemini_url(api_url: &str) -> bool {
    api_url.contains("generativelanguage.googleapis.com") || api_url.contains(":embedContent")
}

/// Generates a vector embedding for a given text input using an external API.
///
/// This function dynamically constructs the correct JSON payload based on whether
/// the `api_url` is for a Gemini or an OpenAI-compatible endpoint. `task_type`
/// is only sent to Gemini.
pub async fn generate_embedding(
    client: &ReqwestClient,
    api_url: &str,
    model: &str,
    input: &str,
    api_key: Option<&str>,
    task_type: Option<&str>,
) -> Result<Vec<f32>, PromptError> {
    let mut request_builder = client.post(api_url);
    let is_gemini = is_gemini_url(api_url);

    // --- 1. Construct the appropriate request body and apply auth ---
    if is_gemini {
        // Gemini requires the model name to be prefixed with "models/" in the payload.
        let gemini_model_name = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };

        let request_body = GeminiEmbeddingRequest {
            model: gemini_model_name,
            content: GeminiEmbeddingContent {
                parts: vec![GeminiEmbeddingPart { text: input }],
            },
            task_type,
        };
        debug!(model = %request_body.model, "--> Sending request to Gemini Embeddings API");
        request_builder = request_builder.json(&request_body);
        if let Some(key) = api_key {
            request_builder = request_builder.header("x-goog-api-key", key);
        }
    } else {
        let request_body = OpenAIEmbeddingRequest { model, input };
        debug!(model = %model, "--> Sending request to OpenAI-compatible Embeddings API");
        request_builder = request_builder.json(&request_body);
        if let Some(key) = api_key {
            request_builder = request_builder.bearer_auth(key);
        }
    }

    // --- 2. Send the request and handle the response ---
    let response = request_builder
        .send()
        .await
        .map_err(PromptError::AiRequest)?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(PromptError::AiApi(error_text));
    }

    if is_gemini {
        let gemini_response: GeminiEmbeddingResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;
        Ok(gemini_response.embedding.values)
    } else {
        let openai_response: OpenAIEmbeddingResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        openai_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                PromptError::AiApi("OpenAI-compatible API returned no embeddings".to_string())
            })
    }
}

/// An `EmbeddingProvider` backed by a remote embeddings API.
#[derive(Clone)]
pub struct RemoteEmbeddingProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
    task_type: Option<String>,
}

impl RemoteEmbeddingProvider {
    pub fn new(
        api_url: String,
        model: String,
        api_key: Option<String>,
        dimension: usize,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
            api_key,
            dimension,
            task_type: None,
        })
    }

    /// Sets the Gemini task type, e.g. `RETRIEVAL_QUERY` or `RETRIEVAL_DOCUMENT`.
    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }
}

impl Debug for RemoteEmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEmbeddingProvider")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("task_type", &self.task_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, PromptError> {
        let values = generate_embedding(
            &self.client,
            &self.api_url,
            &self.model,
            text,
            self.api_key.as_deref(),
            self.task_type.as_deref(),
        )
        .await?;

        if values.len() != self.dimension {
            return Err(PromptError::EmbeddingDimensionMismatch {
                expected: self.dimension,
                actual: values.len(),
            });
        }
        Ok(EmbeddingVector::new(values))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
