use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Multipart framing and base64 inflate a document past its raw size, so the
/// transport limit sits well above the per-document cap. Oversized documents
/// are rejected by the handlers with a JSON error.
const BODY_LIMIT_FACTOR: usize = 3;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_mul(BODY_LIMIT_FACTOR);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/documents/extract", post(handlers::extract_document))
        .route("/documents/extract-base64", post(handlers::extract_base64))
        .route(
            "/forms",
            post(handlers::create_form).get(handlers::list_forms),
        )
        .route(
            "/forms/:id",
            get(handlers::get_form)
                .put(handlers::update_form)
                .delete(handlers::delete_form),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
