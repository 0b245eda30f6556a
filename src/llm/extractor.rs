use crate::error::Result;
use crate::llm::client::GeminiClient;
use crate::llm::prompts::extraction_prompt;
use crate::llm::types::{Content, DocumentKind, GenerationConfig};
use crate::parser::parse_response;
use crate::record::ExtractedRecord;
use async_trait::async_trait;
use log::info;

/// Turns a document into an [`ExtractedRecord`].
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extracts contact fields from `document`. Fails with
    /// `UnsupportedMimeType` for anything other than a PDF or an image,
    /// without doing any work.
    async fn extract(&self, document: &[u8], mime_type: &str) -> Result<ExtractedRecord>;
}

/// Extracts contact fields by sending the document inline to Gemini.
#[derive(Clone)]
pub struct ContactExtractor {
    client: GeminiClient,
    model: String,
}

impl ContactExtractor {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl DocumentExtractor for ContactExtractor {
    async fn extract(&self, document: &[u8], mime_type: &str) -> Result<ExtractedRecord> {
        let kind = DocumentKind::from_mime_type(mime_type)?;
        let mime_type = match kind {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Image => mime_type,
        };

        info!(
            "Extracting contact fields from {} ({} bytes) with {}",
            mime_type,
            document.len(),
            self.model
        );

        let content = Content::user_with_document(extraction_prompt(kind), mime_type, document);
        let raw = self
            .client
            .generate_content(
                &self.model,
                vec![content],
                Some(GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                }),
            )
            .await?;

        let record = parse_response(&raw)?;
        info!("Extracted {} field(s)", record.len());
        Ok(record)
    }
}
