pub mod embedding;
pub mod gemini;
pub mod local;

use crate::{errors::PromptError, types::EmbeddingVector};
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{generate_embedding, RemoteEmbeddingProvider};
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// This is the NL-to-SQL collaborator boundary: a system prompt and a user prompt
/// go in, free text comes out.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// A trait for the embedding collaborator: text in, fixed-length vector out.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug + DynClone {
    /// Returns the embedding for `text`.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, PromptError>;

    /// The number of components every returned vector must have.
    fn dimension(&self) -> usize;
}

dyn_clone::clone_trait_object!(EmbeddingProvider);
