//! Public HTTP front-end.
//!
//! Serves three things on HTTP_PORT (default 8000):
//! - `/` and `/health`: liveness plus JS runtime status
//! - `POST /cookies`: cookie file upload
//! - `GET /download`: runs yt-dlp and streams the produced file back

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};

use crate::core::config::ServerConfig;
use crate::core::error::{AppError, AppResult};
use crate::core::runtime::JsRuntime;
use crate::core::utils::{content_type_for_path, format_duration};
use crate::download::cookies::{resolve_cookie_file, store_cookie_file};
use crate::download::{download_media, DownloadQuery, DownloadRequest, ProducedFile};

/// Room for multipart boundaries and part headers on top of the cookie payload.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state for the web server.
pub struct AppState {
    pub config: ServerConfig,
    pub js_runtime: Option<JsRuntime>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, js_runtime: Option<JsRuntime>) -> Self {
        Self {
            config,
            js_runtime,
            start_time: Instant::now(),
        }
    }
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_cookie_bytes + MULTIPART_OVERHEAD_BYTES;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route(
            "/cookies",
            post(upload_cookies_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/download", get(download_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the public web server and run until Ctrl-C / SIGTERM.
pub async fn start_web_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_addr();
    let app = build_router(Arc::new(state));

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /           - Health check");
    log::info!("  /health     - Health check");
    log::info!("  /cookies    - Cookie file upload (POST, multipart field 'file')");
    log::info!("  /download   - Download (?url=&format=audio|video&cookie_id=)");

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received");
}

/// GET / and GET /health: liveness and JS runtime status.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed();

    let health_status = json!({
        "status": "ok",
        "service": "ytgate",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime.as_secs(),
        "uptime_human": format_duration(uptime),
        "js_runtime_installed": state.js_runtime.is_some(),
        "js_runtime": state.js_runtime,
    });

    (StatusCode::OK, Json(health_status))
}

/// POST /cookies: stores the multipart `file` field verbatim.
async fn upload_cookies_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e.body_text())))?
    {
        let is_file_field = field.name() == Some("file") || field.file_name().is_some();
        if !is_file_field {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {}", e.body_text())))?;

        let stored = store_cookie_file(&state.config.cookies_dir, &data, state.config.max_cookie_bytes).await?;
        return Ok((StatusCode::OK, Json(stored)).into_response());
    }

    Err(AppError::Validation(
        "Missing file: send the cookie file as multipart field 'file'".to_string(),
    ))
}

/// GET /download: runs yt-dlp and streams the produced file.
async fn download_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<Response> {
    let request = DownloadRequest::from_query(query)?;

    let cookies = match &request.cookie_id {
        Some(id) => Some(resolve_cookie_file(&state.config.cookies_dir, id).await?),
        None => None,
    };

    let file = download_media(&state.config, state.js_runtime.as_ref(), &request, cookies.as_deref()).await?;
    stream_file(file).await
}

/// Streams a file from disk as an attachment.
async fn stream_file(file: ProducedFile) -> AppResult<Response> {
    let handle = tokio::fs::File::open(&file.path).await?;
    let content_type = content_type_for_path(&file.path);
    let body = Body::from_stream(ReaderStream::new(handle));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, file.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        )
        .body(body)
        .map_err(|e| AppError::Anyhow(e.into()))
}
