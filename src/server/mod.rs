//! HTTP API over document extraction and the submission store.

pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::llm::{ContactExtractor, DocumentExtractor, GeminiClient};
use crate::store::SubmissionStore;

pub use error::ApiError;
pub use routes::create_router;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn DocumentExtractor>,
    pub store: Arc<SubmissionStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, store: Arc<SubmissionStore>) -> Self {
        Self {
            extractor,
            store,
            max_upload_bytes: crate::config::MAX_UPLOAD_BYTES,
        }
    }

    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let mut client = GeminiClient::with_optional_key(config.api_key.clone());
        if let Some(base_url) = &config.gemini_base_url {
            client = client.with_base_url(base_url.clone());
        }

        let store = match &config.journal_path {
            Some(path) => SubmissionStore::open(path)
                .await
                .with_context(|| format!("failed to open journal {}", path.display()))?,
            None => SubmissionStore::in_memory(),
        };

        Ok(Self {
            extractor: Arc::new(ContactExtractor::new(client, config.model.clone())),
            store: Arc::new(store),
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

/// Binds `config.listen_addr` and serves until the process is stopped.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; extraction requests will fail");
    }

    let state = AppState::from_config(&config).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
