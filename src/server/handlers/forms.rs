//! Form submission CRUD endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::super::error::ApiError;
use super::super::AppState;
use crate::store::{FormSubmission, SubmissionDraft};

const NOT_FOUND: &str = "Form submission not found";

/// `{success, data?, count?, message?}` envelope shared by the form routes.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }

    fn message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

pub async fn create_form(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<FormSubmission>>), ApiError> {
    let Json(draft) = payload?;
    let submission = state.store.create(draft).await?;
    tracing::info!("Created form submission {}", submission.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(submission).message("Form submitted successfully")),
    ))
}

pub async fn list_forms(State(state): State<AppState>) -> Json<ApiResponse<Vec<FormSubmission>>> {
    let submissions = state.store.list().await;
    let count = submissions.len();

    Json(ApiResponse {
        count: Some(count),
        ..ApiResponse::data(submissions)
    })
}

pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormSubmission>>, ApiError> {
    state
        .store
        .get(&id)
        .await
        .map(|submission| Json(ApiResponse::data(submission)))
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, NOT_FOUND))
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SubmissionDraft>, JsonRejection>,
) -> Result<Json<ApiResponse<FormSubmission>>, ApiError> {
    let Json(draft) = payload?;
    let submission = state.store.update(&id, draft).await?;
    tracing::info!("Updated form submission {}", submission.id);

    Ok(Json(
        ApiResponse::data(submission).message("Form updated successfully"),
    ))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete(&id).await?;
    tracing::info!("Deleted form submission {}", id);

    Ok(Json(ApiResponse {
        success: true,
        data: None,
        count: None,
        message: Some("Form deleted successfully"),
    }))
}
