use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use context_fill::llm::DocumentExtractor;
use context_fill::server::{create_router, AppState};
use context_fill::{ExtractedRecord, FieldKey, SubmissionStore};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "context-fill-test-boundary";

/// Counts calls and echoes the document size back in `notes`.
#[derive(Default)]
struct CountingExtractor {
    calls: AtomicUsize,
}

#[async_trait]
impl DocumentExtractor for CountingExtractor {
    async fn extract(
        &self,
        document: &[u8],
        _mime_type: &str,
    ) -> context_fill::Result<ExtractedRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExtractedRecord::new()
            .with(FieldKey::FirstName, "Jane")
            .with(FieldKey::Email, "jane@example.com")
            .with(FieldKey::Notes, document.len().to_string()))
    }
}

fn app_with(extractor: Arc<CountingExtractor>, store: Arc<SubmissionStore>) -> Router {
    create_router(AppState::new(extractor, store))
}

fn app() -> (Router, Arc<CountingExtractor>) {
    let extractor = Arc::new(CountingExtractor::default());
    let app = app_with(extractor.clone(), Arc::new(SubmissionStore::in_memory()));
    (app, extractor)
}

fn multipart_upload(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/documents/extract")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_is_extracted() {
    let (app, extractor) = app();

    let response = app
        .oneshot(multipart_upload("card.png", "image/png", b"\x89PNG\r\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "card.png");
    assert_eq!(body["mimeType"], "image/png");
    assert_eq!(body["data"]["firstName"], "Jane");
    assert_eq!(body["data"]["notes"], "6");
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_before_extraction() {
    let (app, extractor) = app();
    let document = vec![0u8; 15 * 1024 * 1024];

    let response = app
        .oneshot(multipart_upload("scan.pdf", "application/pdf", &document))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("File too large"));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_with_disallowed_type_is_rejected() {
    let (app, extractor) = app();

    let response = app
        .oneshot(multipart_upload("notes.txt", "text/plain", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid file type: text/plain. Allowed types:"));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_without_document_field() {
    let (app, _) = app();

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::post("/documents/extract")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn test_base64_extraction_keeps_filename() {
    let (app, extractor) = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/documents/extract-base64",
            json!({
                "data": "data:application/pdf;base64,JVBERi0xLjQ=",
                "mimeType": "application/pdf",
                "filename": "resume.pdf"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["filename"], "resume.pdf");
    assert_eq!(body["data"]["notes"], "8");
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_base64_garbage_is_a_client_error() {
    let (app, extractor) = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/documents/extract-base64",
            json!({"data": "%%%not-base64%%%", "mimeType": "image/png"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_form_crud_lifecycle() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/forms",
            json!({
                "firstName": "Jane",
                "email": "jane@example.com",
                "sourceDocument": "card.png",
                "id": "client-chosen",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], "Form submitted successfully");
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_ne!(id, "client-chosen");
    assert_eq!(created["data"]["firstName"], "Jane");
    assert_eq!(created["data"]["sourceDocument"], "card.png");

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/forms/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["email"], "jane@example.com");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/forms/{id}"),
            json!({"lastName": "Doe", "email": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["message"], "Form updated successfully");
    assert_eq!(updated["data"]["firstName"], "Jane");
    assert_eq!(updated["data"]["lastName"], "Doe");
    assert!(updated["data"].get("email").is_none());
    assert_eq!(updated["data"]["createdAt"], created["data"]["createdAt"]);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/forms"))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["data"][0]["id"], id.as_str());

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/forms/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted = body_json(response).await;
    assert_eq!(deleted["message"], "Form deleted successfully");
    assert!(deleted.get("data").is_none());

    for method in ["GET", "DELETE"] {
        let response = app
            .clone()
            .oneshot(empty_request(method, &format!("/forms/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Form submission not found");
    }

    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/forms/{id}"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Form submission not found");

    let response = app.oneshot(empty_request("GET", "/forms")).await.unwrap();
    assert_eq!(body_json(response).await["count"], 0);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let (app, _) = app();

    for name in ["First", "Second", "Third"] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/forms", json!({"firstName": name})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.oneshot(empty_request("GET", "/forms")).await.unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["count"], 3);
    let names: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Third", "Second", "First"]);
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let (app, _) = app();

    let request = Request::post("/forms")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_submissions_survive_restart_with_journal() {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("submissions.jsonl");
    let extractor = Arc::new(CountingExtractor::default());

    let store = Arc::new(SubmissionStore::open(&journal).await.unwrap());
    let response = app_with(extractor.clone(), store)
        .oneshot(json_request(
            "POST",
            "/forms",
            json!({"firstName": "Jane", "company": "Acme"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let reopened = Arc::new(SubmissionStore::open(&journal).await.unwrap());
    let response = app_with(extractor, reopened)
        .oneshot(empty_request("GET", &format!("/forms/{id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["company"], "Acme");
}
