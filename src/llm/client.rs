use crate::error::{ContextFillError, Result};
use crate::llm::types::*;
use log::debug;
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The value shipped in the sample `.env`; treated as "not configured".
const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

/// Thin client for the Gemini `generateContent` endpoint.
///
/// The API key is only checked when a request is made, so a server can start
/// without one and report the misconfiguration on the first extraction.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_optional_key(Some(api_key.into()))
    }

    /// Reads `GEMINI_API_KEY` from the environment, if set.
    pub fn from_env() -> Self {
        Self::with_optional_key(std::env::var("GEMINI_API_KEY").ok())
    }

    pub fn with_optional_key(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Points the client at another endpoint, e.g. a proxy or a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
            .ok_or(ContextFillError::MissingApiKey)
    }

    /// Sends one `generateContent` request and returns the text of the first
    /// candidate. No retries.
    pub async fn generate_content(
        &self,
        model: &str,
        contents: Vec<Content>,
        generation_config: Option<GenerationConfig>,
    ) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        );

        let payload = GenerateContentRequest {
            contents,
            generation_config,
        };

        debug!("Calling Gemini model {}", model);
        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(ContextFillError::ExtractionFailed(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;

        let candidates = body.candidates.unwrap_or_default();
        let Some(candidate) = candidates.first() else {
            let reason = body
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .map(|reason| format!(" (blocked: {})", reason))
                .unwrap_or_default();
            return Err(ContextFillError::ExtractionFailed(format!(
                "No candidates returned{}",
                reason
            )));
        };

        let content = candidate.content.as_ref().ok_or_else(|| {
            ContextFillError::ExtractionFailed(format!(
                "Candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        Ok(content.text())
    }
}
