use crate::error::{ContextFillError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// The document families the extraction prompt distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Classifies a MIME type, rejecting anything that is neither a PDF nor
    /// an image.
    pub fn from_mime_type(mime_type: &str) -> Result<Self> {
        let normalized = mime_type.trim().to_ascii_lowercase();
        if normalized == "application/pdf" {
            Ok(DocumentKind::Pdf)
        } else if normalized.starts_with("image/") {
            Ok(DocumentKind::Image)
        } else {
            Err(ContextFillError::UnsupportedMimeType(mime_type.to_string()))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    /// Base64 encoded bytes.
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// A user turn carrying a prompt followed by an inline document.
    pub fn user_with_document(text: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        let mut content = Self::user(text);
        content.parts.push(Part::InlineData {
            inline_data: Blob {
                mime_type: mime_type.to_string(),
                data: STANDARD.encode(bytes),
            },
        });
        content
    }

    /// Concatenation of every text part, which is what the model "said".
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind() {
        assert_eq!(
            DocumentKind::from_mime_type("application/pdf").unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::from_mime_type("image/webp").unwrap(),
            DocumentKind::Image
        );
        assert!(matches!(
            DocumentKind::from_mime_type("text/plain"),
            Err(ContextFillError::UnsupportedMimeType(m)) if m == "text/plain"
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let request = GenerateContentRequest {
            contents: vec![Content::user_with_document("Read this", "image/png", &[0, 0, 0])],
            generation_config: None,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Read this");
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "AAAA");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "{\"firstName\": " },
                        { "thoughtSignature": "abc" },
                        { "text": "\"Ada\"}" }
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let candidate = &response.candidates.unwrap()[0];
        assert_eq!(
            candidate.content.as_ref().unwrap().text(),
            "{\"firstName\": \"Ada\"}"
        );
    }
}
