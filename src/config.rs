use serde::Serialize;
use std::path::PathBuf;

/// Largest document accepted for extraction.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// MIME types accepted by the upload endpoints.
pub const ALLOWED_UPLOAD_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Gemini API key. Checked on first extraction, not at startup.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    /// Overrides the Gemini endpoint, e.g. for a proxy.
    pub gemini_base_url: Option<String>,
    pub max_upload_bytes: usize,
    /// Append-only journal for form submissions. `None` keeps them in memory.
    pub journal_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: None,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            journal_path: None,
        }
    }
}
