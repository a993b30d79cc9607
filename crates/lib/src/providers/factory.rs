//! # Provider Factory
//!
//! Turns the collaborator sections of a `PipelineConfig` into live provider
//! instances. Any consumer (server, cli) builds its providers through here so
//! that URL derivation and key handling stay consistent.

use crate::{
    errors::PromptError,
    providers::ai::{
        gemini::GeminiProvider, local::LocalAiProvider, AiProvider, EmbeddingProvider,
        RemoteEmbeddingProvider,
    },
    types::{EmbeddingSettings, LlmSettings},
};
use tracing::info;

/// Creates the NL-to-SQL provider described by `settings`.
pub fn create_ai_provider(
    settings: &LlmSettings,
    api_key: Option<&str>,
) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match settings.provider.as_str() {
        "gemini" => {
            let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "llm_api_key is required for the gemini provider".to_string(),
                )
            })?;
            let api_url = settings
                .api_url
                .clone()
                .unwrap_or_else(|| GeminiProvider::url_for_model(&settings.model_name));
            info!("Configuring Gemini provider with URL: {}", api_url);
            Box::new(GeminiProvider::new(api_url, api_key.to_string())?)
        }
        "local" => {
            let api_url = settings.api_url.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "llm.api_url is required for the local provider".to_string(),
                )
            })?;
            info!("Configuring local AI provider with URL: {}", api_url);
            Box::new(LocalAiProvider::new(
                api_url,
                api_key.map(String::from),
                Some(settings.model_name.clone()),
            )?)
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "unsupported AI provider type '{other}'"
            )))
        }
    };
    Ok(provider)
}

/// Creates the embedding provider described by `settings`.
pub fn create_embedding_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
    task_type: Option<&str>,
) -> Result<Box<dyn EmbeddingProvider>, PromptError> {
    if settings.api_url.trim().is_empty() {
        return Err(PromptError::MissingEmbeddingProvider);
    }
    info!(
        "Configuring embedding provider '{}' with URL: {}",
        settings.model_name, settings.api_url
    );
    let mut provider = RemoteEmbeddingProvider::new(
        settings.api_url.clone(),
        settings.model_name.clone(),
        api_key.filter(|k| !k.is_empty()).map(String::from),
        settings.dimension,
    )?;
    if let Some(task_type) = task_type {
        provider = provider.with_task_type(task_type);
    }
    Ok(Box::new(provider))
}
