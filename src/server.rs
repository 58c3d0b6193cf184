//! HTTP front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/status` | `{"status": "ready" \| "not_ready"}` |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/ask` | Answer `{"query": "..."}` from the loaded document |
//! | `POST` | `/upload` | Replace the document with an uploaded PDF (multipart field `file`) |
//! | `GET`  | `/*` | Static front end, when `[server].static_dir` is set |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `unprocessable` (422),
//! `not_ready` (503), `init_failed` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser front end
//! can be served from anywhere.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use askdoc_core::models::ResponseRecord;

use crate::config::Config;
use crate::embedding::create_provider;
use crate::engine::{EngineSettings, QaEngine, Readiness};
use crate::error::AskError;

/// File name uploaded documents are stored under.
pub const UPLOAD_FILE_NAME: &str = "uploaded.pdf";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QaEngine>,
    /// Document ingested lazily when a question arrives before any index.
    pub default_document: PathBuf,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(engine: Arc<QaEngine>, config: &Config) -> Self {
        Self {
            engine,
            default_document: config.document.path.clone(),
            upload_dir: config.document.upload_dir.clone(),
        }
    }
}

/// Starts the HTTP server.
///
/// Builds the embedding provider and engine from `config`, kicks off
/// ingestion of the default document in the background, and serves until
/// the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let provider = create_provider(&config.embedding)?;
    let engine = Arc::new(QaEngine::new(provider, EngineSettings::from_config(config)));
    let state = AppState::new(engine.clone(), config);

    let startup_doc = config.document.path.clone();
    tokio::spawn(async move {
        // Failure is logged by the engine; /ask retries lazily.
        let _ = engine.ensure_ready(&startup_doc).await;
    });

    let app = build_router(state, config);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("askdoc listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router for `state`. Exposed for embedding in tests and other
/// binaries.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/status", get(handle_status))
        .route("/health", get(handle_health))
        .route("/ask", post(handle_ask))
        .route("/upload", post(handle_upload))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes));

    if let Some(dir) = &config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(cors).with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error type that converts into a JSON HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn internal(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

impl From<AskError> for AppError {
    fn from(err: AskError) -> Self {
        let message = err.to_string();
        match err {
            AskError::NotFound(_) => AppError::new(StatusCode::NOT_FOUND, "not_found", message),
            AskError::Extraction(_) => {
                AppError::new(StatusCode::UNPROCESSABLE_ENTITY, "unprocessable", message)
            }
            AskError::NotReady => AppError::new(StatusCode::SERVICE_UNAVAILABLE, "not_ready", message),
            AskError::Ingestion(_) | AskError::Query(_) => internal(message),
        }
    }
}

// ============ GET /status, GET /health ============

#[derive(Serialize)]
struct StatusResponse {
    status: Readiness,
}

async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.engine.status(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ask ============

#[derive(Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// Answers a question, ingesting the default document first if nothing is
/// loaded yet.
async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<ResponseRecord>, AppError> {
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    if !state.engine.is_ready() {
        state
            .engine
            .ensure_ready(&state.default_document)
            .await
            .map_err(|e| {
                AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "init_failed",
                    format!("failed to initialize: {}", e),
                )
            })?;
    }

    let record = state.engine.ask(&req.query).await?;
    Ok(Json(record))
}

// ============ POST /upload ============

#[derive(Serialize)]
struct UploadResponse {
    status: String,
    message: String,
}

/// Stores the uploaded PDF under the upload directory and re-ingests it.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("failed to read upload: {}", e)))?;
            bytes = Some(data);
            break;
        }
    }
    let bytes = bytes.ok_or_else(|| bad_request("missing multipart field 'file'"))?;

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| internal(format!("failed to create upload directory: {}", e)))?;
    let path = state.upload_dir.join(UPLOAD_FILE_NAME);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| internal(format!("failed to store upload: {}", e)))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "document uploaded");

    let chunks = state.engine.ingest_path(&path).await?;

    Ok(Json(UploadResponse {
        status: "success".to_string(),
        message: format!("Document uploaded and processed into {} chunks", chunks),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_errors_map_to_status_codes() {
        let cases = [
            (AskError::NotFound(PathBuf::from("x.pdf")), StatusCode::NOT_FOUND, "not_found"),
            (AskError::NotReady, StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
            (
                AskError::Ingestion("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
            ),
            (
                AskError::Query("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
            ),
        ];
        for (err, status, code) in cases {
            let app_err = AppError::from(err);
            assert_eq!(app_err.status, status);
            assert_eq!(app_err.code, code);
        }
    }

    #[test]
    fn readiness_serializes_snake_case() {
        let json = serde_json::to_value(StatusResponse {
            status: Readiness::NotReady,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "status": "not_ready" }));
    }
}
