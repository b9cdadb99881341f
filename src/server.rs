//! HTTP API.
//!
//! A single endpoint, `POST /procesar-pdf`, takes a multipart upload with a
//! `file` field holding the timetable PDF and answers with the room schedule
//! as JSON. Error bodies are `{"detail": "..."}`.

use crate::{check_pdf_filename, ExtractorConfig, ResultSet, ScheduleLayout, TimetableDocument};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

/// Multipart field carrying the PDF.
pub const UPLOAD_FIELD: &str = "file";

// ============================================================================
// Configuration / state
// ============================================================================

/// Settings of the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    pub extractor: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_upload_bytes: 20 * 1024 * 1024,
            extractor: ExtractorConfig::default(),
        }
    }
}

#[derive(Clone)]
struct AppState {
    extractor: Arc<ExtractorConfig>,
    layout: Arc<ScheduleLayout>,
}

// ============================================================================
// Error type
// ============================================================================

struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "detail": self.1 }))).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError(e.status(), e.body_text())
    }
}

fn processing_failed(reason: impl std::fmt::Display) -> AppError {
    AppError(StatusCode::INTERNAL_SERVER_ERROR, format!("Error al procesar el PDF: {reason}"))
}

// ============================================================================
// Handlers
// ============================================================================

// POST /procesar-pdf
async fn process_pdf_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResultSet>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_owned) else {
            warn!("rejected upload: '{UPLOAD_FIELD}' is not a file");
            return Err(AppError(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("multipart field '{UPLOAD_FIELD}' must be a file upload"),
            ));
        };
        if check_pdf_filename(&filename).is_err() {
            warn!(filename = %filename, "rejected upload: not a .pdf file");
            return Err(AppError(StatusCode::BAD_REQUEST, "El archivo debe ser un PDF.".into()));
        }

        let data = field.bytes().await?;
        info!(filename = %filename, bytes = data.len(), "processing upload");

        let AppState { extractor, layout } = state.clone();
        let outcome = tokio::task::spawn_blocking(move || -> crate::Result<ResultSet> {
            let document = TimetableDocument::from_bytes(&data)?.with_config((*extractor).clone());
            layout.reshape(&document.extract_rows()?)
        })
        .await
        .map_err(processing_failed)?;

        return match outcome {
            Ok(schedule) => {
                info!(filename = %filename, rooms = schedule.len(), "processed upload");
                Ok(Json(schedule))
            }
            Err(e) => {
                error!(filename = %filename, error = %e, "failed to process upload");
                Err(processing_failed(e))
            }
        };
    }

    Err(AppError(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("missing multipart field '{UPLOAD_FIELD}'"),
    ))
}

// ============================================================================
// Router / serve
// ============================================================================

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        extractor: Arc::new(config.extractor.clone()),
        layout: Arc::new(ScheduleLayout::default()),
    };

    Router::new()
        .route("/procesar-pdf", post(process_pdf_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(CorsLayer::very_permissive())
}

/// Serve on an already bound listener until the process receives Ctrl-C.
pub async fn serve_on(listener: TcpListener, config: &ServerConfig) -> crate::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Bind `config.bind` and serve.
pub async fn serve(config: &ServerConfig) -> crate::Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    serve_on(listener, config).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
