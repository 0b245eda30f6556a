use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextFillError {
    #[error("Unsupported file type: {0}")]
    UnsupportedMimeType(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("{0}")]
    NotFound(String),

    #[error("GEMINI_API_KEY is not configured. Please set it in your .env file.")]
    MissingApiKey,

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Model returned malformed JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "gemini")]
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ContextFillError {
    /// True for errors caused by the caller's input rather than by the
    /// pipeline or the upstream model.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::UnsupportedMimeType(_) | Self::InvalidInput(_) | Self::PayloadTooLarge { .. } => {
                true
            }
            #[cfg(feature = "gemini")]
            Self::InvalidBase64(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContextFillError>;
