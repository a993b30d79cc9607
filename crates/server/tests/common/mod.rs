//! # Common Test Utilities
//!
//! `TestApp` spawns a real server on a random port, backed by a temporary
//! database seeded with the demo rows and configured to call an
//! `httpmock::MockServer` for both embeddings and chat completions.

#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};
use vecsql_server::{
    config, router,
    state::{build_app_state, AppState},
};
use vecsql_test_utils::DEMO_DATA_SQL;

pub const EMBEDDINGS_PATH: &str = "/v1/embeddings";
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _db_file: NamedTempFile,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let db_file = NamedTempFile::new()?;
        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
default_top_k: 5
db_name: "{}"
embedding:
  api_url: "{}"
  model_name: "mock-embedding-model"
  dimension: 768
llm:
  provider: "local"
  api_url: "{}"
  model_name: "mock-chat-model"
"#,
            db_file.path().display(),
            mock_server.url(EMBEDDINGS_PATH),
            mock_server.url(CHAT_PATH)
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config_path = config_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non utf-8 temp path"))?;
        let config = config::get_config(Some(config_path))?;
        let app_state = build_app_state(config).await?;
        app_state
            .sqlite_provider
            .initialize_with_data(DEMO_DATA_SQL)
            .await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let router_state = app_state.clone();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(router_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state,
            _db_file: db_file,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A 768-dimension embedding that is the same for every input.
pub fn constant_embedding() -> serde_json::Value {
    serde_json::json!({ "data": [{ "embedding": vec![0.1f32; 768] }] })
}

/// An OpenAI-compatible chat completion whose answer is `content`.
pub fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}
