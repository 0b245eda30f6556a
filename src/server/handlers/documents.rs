//! Document extraction endpoints.

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::super::error::ApiError;
use super::super::AppState;
use crate::config::ALLOWED_UPLOAD_TYPES;
use crate::error::ContextFillError;
use crate::record::ExtractedRecord;

/// Multipart field carrying the upload.
const DOCUMENT_FIELD: &str = "document";

const DEFAULT_FILENAME: &str = "uploaded-document";

/// Standard alphabet, padding optional.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub success: bool,
    pub data: ExtractedRecord,
    pub filename: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64ExtractionRequest {
    pub data: Option<String>,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
}

/// `POST /documents/extract`: multipart upload in the `document` field.
pub async fn extract_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResponse>, ApiError> {
    let mut multipart = multipart?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or(DEFAULT_FILENAME).to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        if !ALLOWED_UPLOAD_TYPES.contains(&mime_type.as_str()) {
            return Err(ApiError::bad_request(format!(
                "Invalid file type: {}. Allowed types: {}",
                mime_type,
                ALLOWED_UPLOAD_TYPES.join(", ")
            )));
        }

        let bytes = read_capped(&mut field, state.max_upload_bytes).await?;
        tracing::info!("Processing document: {} ({})", filename, mime_type);

        let data = state.extractor.extract(&bytes, &mime_type).await?;

        return Ok(Json(ExtractionResponse {
            success: true,
            data,
            filename,
            mime_type,
        }));
    }

    Err(ApiError::bad_request("No file uploaded"))
}

/// `POST /documents/extract-base64`: JSON body with a base64 document.
pub async fn extract_base64(
    State(state): State<AppState>,
    payload: Result<Json<Base64ExtractionRequest>, JsonRejection>,
) -> Result<Json<ExtractionResponse>, ApiError> {
    let Json(request) = payload?;

    let (Some(data), Some(mime_type)) = (
        request.data.filter(|d| !d.is_empty()),
        request.mime_type.filter(|m| !m.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Missing required fields: data, mimeType",
        ));
    };

    let filename = request
        .filename
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

    let bytes = decode_document(&data)?;
    if bytes.len() > state.max_upload_bytes {
        return Err(ContextFillError::PayloadTooLarge {
            size: bytes.len(),
            limit: state.max_upload_bytes,
        }
        .into());
    }

    tracing::info!("Processing base64 document: {} ({})", filename, mime_type);
    let data = state.extractor.extract(&bytes, &mime_type).await?;

    Ok(Json(ExtractionResponse {
        success: true,
        data,
        filename,
        mime_type,
    }))
}

/// Reads a multipart field, giving up as soon as it grows past `limit`.
async fn read_capped(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field.chunk().await? {
        if bytes.len() + chunk.len() > limit {
            return Err(ContextFillError::PayloadTooLarge {
                size: bytes.len() + chunk.len(),
                limit,
            }
            .into());
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Removes a leading `data:<mime>;base64,` prefix, if present.
pub fn strip_data_url_prefix(data: &str) -> &str {
    let Some(rest) = data.strip_prefix("data:") else {
        return data;
    };

    match rest.find(';') {
        Some(semi) if semi > 0 => rest[semi..].strip_prefix(";base64,").unwrap_or(data),
        _ => data,
    }
}

pub fn decode_document(data: &str) -> Result<Vec<u8>, ContextFillError> {
    Ok(BASE64.decode(strip_data_url_prefix(data).trim())?)
}
