use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::download::error::DownloadError;

/// Centralized error types for the application
///
/// Every handler returns `AppResult`, so this enum is also the single place
/// where failures turn into HTTP responses (`{"detail": "..."}` bodies).
///
/// # Example
///
/// ```no_run
/// use ytgate::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Download/yt-dlp errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors (bad query parameters, bad uploads)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Download(err) => err.status_code(),
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Io(_) | AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `detail` field of the error body.
    pub fn detail(&self) -> String {
        match self {
            AppError::Download(err) => err.detail(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Io(err) => err.to_string(),
            AppError::Anyhow(err) => err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed ({}): {}", status.as_u16(), self);
        } else {
            log::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
