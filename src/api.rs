//! HTTP surface for docdigest.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /upload` – Multipart form with one or more `files` parts (format implied by the
//!   filename extension) and an optional `summary_length` field. Returns per-document
//!   summaries, the extracted texts, and the pairwise similarity matrix.
//! - `POST /summarize-text` – Urlencoded form with a raw `text` field and an optional
//!   `summary_length`. Returns a single summary with `similarity_matrix: null`.
//! - `GET /metrics` – Observe pipeline counters.
//! - `GET /`, `GET /script.js`, `GET /favicon.ico` – Static UI assets.
//!
//! Any processing failure surfaces as HTTP 500 with a `{"detail": ...}` body; unsupported
//! file extensions included, so callers distinguish failure kinds by the detail text.

use crate::config::get_config;
use crate::metrics::MetricsSnapshot;
use crate::processing::{BatchResult, DocumentInput, PipelineApi, PipelineError};
use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeFile};

/// Build the HTTP router exposing the document pipeline.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PipelineApi + 'static,
{
    let static_dir = Path::new(&get_config().static_dir);
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/script.js", ServeFile::new(static_dir.join("script.js")))
        .route_service("/favicon.ico", ServeFile::new(static_dir.join("favicon.ico")))
        .route("/upload", post(upload_documents::<S>))
        .route("/summarize-text", post(summarize_text::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Process a multipart batch of documents: extract, summarize, and score similarity.
async fn upload_documents<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResult>, AppError>
where
    S: PipelineApi,
{
    let mut documents = Vec::new();
    let mut summary_length = get_config().summary_default_length;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(AppError::from_display)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(AppError::from_display)?.to_vec();
                documents.push(DocumentInput { filename, content });
            }
            "summary_length" => {
                let raw = field.text().await.map_err(AppError::from_display)?;
                summary_length = raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError(format!("Invalid summary_length: {raw}")))?;
            }
            _ => {}
        }
    }

    tracing::info!(
        files = documents.len(),
        summary_length,
        "Received upload request"
    );
    let result = service.process_batch(documents, summary_length).await?;
    tracing::info!(summaries = result.summaries.len(), "Upload request completed");
    Ok(Json(result))
}

/// Request body for the `POST /summarize-text` endpoint.
#[derive(Deserialize)]
struct SummarizeTextRequest {
    /// Raw text to summarize.
    text: String,
    /// Requested summary length (defaults to the configured value).
    #[serde(default = "default_summary_length")]
    summary_length: usize,
}

fn default_summary_length() -> usize {
    get_config().summary_default_length
}

/// Summarize a single raw text, bypassing extraction and similarity.
async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    Form(request): Form<SummarizeTextRequest>,
) -> Json<BatchResult>
where
    S: PipelineApi,
{
    tracing::info!(
        characters = request.text.len(),
        summary_length = request.summary_length,
        "Received text summarization request"
    );
    let result = service
        .summarize_text(request.text, request.summary_length)
        .await;
    Json(result)
}

/// Return a concise counters snapshot for observability.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: PipelineApi,
{
    Json(service.metrics_snapshot())
}

/// Request-boundary error: every failure becomes a 500 with a descriptive `detail` body.
struct AppError(String);

impl AppError {
    fn from_display(error: impl std::fmt::Display) -> Self {
        Self(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "An error occurred during processing");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "detail": format!("An error occurred during processing: {}", self.0)
            })),
        )
            .into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self(inner.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::config::{CONFIG, Config, SummarizerProvider};
    use crate::metrics::MetricsSnapshot;
    use crate::processing::{BatchResult, DocumentInput, PipelineApi, PipelineError};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use std::sync::{Arc, Once};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn summarize_text_route_passes_form_fields_through() {
        ensure_test_config();
        let service = Arc::new(StubPipelineService::new());
        let app = create_router(service.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize-text")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("text=short&summary_length=50"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert!(json["similarity_matrix"].is_null());

        let calls = service.text_calls.lock().await.clone();
        assert_eq!(calls, vec![("short".to_string(), 50)]);
    }

    #[tokio::test]
    async fn summarize_text_route_defaults_summary_length() {
        ensure_test_config();
        let service = Arc::new(StubPipelineService::new());
        let app = create_router(service.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize-text")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("text=hello"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let calls = service.text_calls.lock().await.clone();
        assert_eq!(calls, vec![("hello".to_string(), 150)]);
    }

    #[tokio::test]
    async fn upload_route_parses_multipart_files_and_length() {
        ensure_test_config();
        let service = Arc::new(StubPipelineService::new());
        let app = create_router(service.clone());

        let boundary = "X-DOCDIGEST-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             first file body\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"summary_length\"\r\n\r\n\
             60\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/upload")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let calls = service.batch_calls.lock().await.clone();
        assert_eq!(calls.len(), 1);
        let (documents, length) = &calls[0];
        assert_eq!(*length, 60);
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].filename, "a.txt");
        assert_eq!(documents[0].content, b"first file body");
    }

    #[tokio::test]
    async fn pipeline_error_maps_to_500_with_detail() {
        ensure_test_config();
        let service = Arc::new(StubPipelineService::failing());
        let app = create_router(service);

        let boundary = "X-DOCDIGEST-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"a.xyz\"\r\n\r\n\
             body\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/upload")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        let detail = json["detail"].as_str().expect("detail string");
        assert!(detail.starts_with("An error occurred during processing: "));
        assert!(detail.contains("Unsupported file format"));
    }

    #[tokio::test]
    async fn metrics_route_returns_counters() {
        ensure_test_config();
        let service = Arc::new(StubPipelineService::new());
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["batches_completed"], 0);
        assert_eq!(json["documents_processed"], 0);
        assert_eq!(json["summaries_degraded"], 0);
    }

    struct StubPipelineService {
        batch_calls: Mutex<Vec<(Vec<DocumentInput>, usize)>>,
        text_calls: Mutex<Vec<(String, usize)>>,
        fail: bool,
    }

    impl StubPipelineService {
        fn new() -> Self {
            Self {
                batch_calls: Mutex::new(Vec::new()),
                text_calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl PipelineApi for StubPipelineService {
        async fn process_batch(
            &self,
            documents: Vec<DocumentInput>,
            max_length: usize,
        ) -> Result<BatchResult, PipelineError> {
            if self.fail {
                return Err(PipelineError::Extraction(
                    crate::processing::ExtractionError::UnsupportedFormat(".xyz".into()),
                ));
            }
            let texts: Vec<String> = documents
                .iter()
                .map(|doc| String::from_utf8_lossy(&doc.content).into_owned())
                .collect();
            self.batch_calls.lock().await.push((documents, max_length));
            let n = texts.len();
            Ok(BatchResult {
                summaries: vec!["stub summary".into(); n],
                original_texts: texts,
                similarity_matrix: Some(vec![vec![1.0; n]; n]),
            })
        }

        async fn summarize_text(&self, text: String, max_length: usize) -> BatchResult {
            self.text_calls.lock().await.push((text.clone(), max_length));
            BatchResult {
                summaries: vec!["stub summary".into()],
                original_texts: vec![text],
                similarity_matrix: None,
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                batches_completed: 0,
                documents_processed: 0,
                summaries_degraded: 0,
            }
        }
    }

    fn ensure_test_config() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = CONFIG.set(Config {
                server_port: None,
                summarizer_provider: SummarizerProvider::None,
                summarizer_model: None,
                ollama_url: None,
                static_dir: "static".into(),
                summary_default_length: 150,
            });
        });
    }
}
