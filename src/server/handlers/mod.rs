pub mod documents;
pub mod forms;

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

pub use documents::*;
pub use forms::*;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
