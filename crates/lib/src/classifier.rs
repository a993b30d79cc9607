//! # Intent Classification
//!
//! Decides whether a user query asks for a similarity search or a structured
//! filter. This is a lowercase substring test against a keyword list, not a
//! semantic judgment: "like" in unrelated wording ("looks like") still routes
//! the query to vector search.

use crate::types::QueryIntent;

/// Terms that mark a query as a similarity search.
pub const SIMILARITY_KEYWORDS: [&str; 5] = ["similar", "like", "related", "matching", "relevant"];

/// Classifies `text` against the default keyword set.
pub fn classify(text: &str) -> QueryIntent {
    classify_with(text, &SIMILARITY_KEYWORDS)
}

fn classify_with<S: AsRef<str>>(text: &str, keywords: &[S]) -> QueryIntent {
    let lowered = text.to_lowercase();
    let matched = keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .any(|k| lowered.contains(&k));

    if matched {
        QueryIntent::SimilarityQuery
    } else {
        QueryIntent::StructuredQuery
    }
}

/// A classifier with a configurable keyword list.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    keywords: Vec<String>,
}

impl IntentClassifier {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn classify(&self, text: &str) -> QueryIntent {
        classify_with(text, &self.keywords)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(SIMILARITY_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}
