use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vecsql::errors::PromptError;
use vecsql::providers::ai::{AiProvider, EmbeddingProvider};
use vecsql::providers::db::{
    sqlite::SqliteProvider,
    storage::{EmbeddingStore, Storage},
};
use vecsql::types::{BoundStatement, EmbeddingVector, QueryRows, EMBEDDING_DIMENSION};

// --- Test Setup ---

/// Rows for the demo schema. Product names line up with `DEMO_AXES`.
pub const DEMO_DATA_SQL: &str = "
    INSERT INTO departments (id, name) VALUES (1, 'Sales'), (2, 'Engineering');
    INSERT INTO employees (id, name, department_id, email, salary) VALUES
        (1, 'Alice', 1, 'alice@example.com', 72000.0),
        (2, 'Bob', 1, 'bob@example.com', 65000.0),
        (3, 'Carol', 2, 'carol@example.com', 98000.0);
    INSERT INTO orders (id, customer_name, employee_id, order_total, order_date) VALUES
        (1, 'Acme Corp', 1, 1200.5, '2024-03-01'),
        (2, 'Globex', 2, 310.0, '2024-03-04');
    INSERT INTO products (id, name, price) VALUES
        (1, 'Spiral Notebook', 3.5),
        (2, 'Office Chair', 149.0),
        (3, 'Desk Lamp', 39.9),
        (4, 'Notebook Cover', 7.25),
        (5, 'Standing Desk', 420.0),
        (6, 'Chair Cushion', 19.0);
";

/// Keywords `MockEmbeddingProvider::demo()` maps onto their own vector axis.
pub const DEMO_AXES: &[&str] = &["notebook", "chair", "lamp", "desk"];

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub provider: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database with the demo schema and rows.
    pub async fn new() -> Result<Self> {
        let provider = SqliteProvider::new(":memory:").await?;
        provider.initialize_schema().await?;
        provider.initialize_with_data(DEMO_DATA_SQL).await?;
        Ok(Self { provider })
    }

    /// Writes an embedding for every product using `embedder`.
    pub async fn embed_products(&self, embedder: &MockEmbeddingProvider) -> Result<()> {
        for (id, name) in self.provider.embedding_sources("products", false).await? {
            let vector = embedder.embed(&name).await?;
            self.provider.write_embedding("products", id, &vector).await?;
        }
        Ok(())
    }
}

// --- Mock AI Provider ---

/// An NL-to-SQL stand-in that returns a fixed answer (or error) and records calls.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    response: Result<String, String>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Retrieves the recorded `(system_prompt, user_prompt)` pairs.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.response.clone().map_err(PromptError::AiApi)
    }
}

// --- Mock Embedding Provider ---

/// A deterministic embedding stand-in.
///
/// Each configured axis keyword found in the text sets its own component to 1.0;
/// the last component always carries a small baseline so no vector is zero.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
    axes: Vec<String>,
    fail_with: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize, axes: &[&str]) -> Self {
        Self {
            dimension,
            axes: axes.iter().map(|a| a.to_lowercase()).collect(),
            fail_with: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A 768-dimension provider keyed on `DEMO_AXES`.
    pub fn demo() -> Self {
        Self::new(EMBEDDING_DIMENSION, DEMO_AXES)
    }

    /// A provider whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        let mut provider = Self::demo();
        provider.fail_with = Some(message.to_string());
        provider
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let mut values = vec![0.0; self.dimension];
        for (i, axis) in self.axes.iter().enumerate() {
            if i + 1 < self.dimension && lowered.contains(axis.as_str()) {
                values[i] = 1.0;
            }
        }
        if let Some(last) = values.last_mut() {
            *last = 0.01;
        }
        values
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, PromptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(PromptError::AiApi(message.clone()));
        }
        Ok(EmbeddingVector::new(self.vector_for(text)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// --- Counting Storage ---

/// A store that records every statement it receives and returns canned rows.
#[derive(Clone, Debug)]
pub struct CountingStorage {
    response: Result<QueryRows, String>,
    statements: Arc<Mutex<Vec<BoundStatement>>>,
}

impl CountingStorage {
    pub fn returning(rows: QueryRows) -> Self {
        Self {
            response: Ok(rows),
            statements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty() -> Self {
        Self::returning(QueryRows::default())
    }

    /// A store whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            statements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.statements.lock().unwrap().len()
    }

    pub fn statements(&self) -> Vec<BoundStatement> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for CountingStorage {
    fn name(&self) -> &str {
        "MockDB"
    }

    fn language(&self) -> &str {
        "SQLite"
    }

    async fn execute(&self, statement: &BoundStatement) -> Result<QueryRows, PromptError> {
        self.statements.lock().unwrap().push(statement.clone());
        self.response
            .clone()
            .map_err(PromptError::StorageOperationFailed)
    }
}
