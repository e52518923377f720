use std::fmt;
use std::time::Duration;

use axum::http::StatusCode;

use crate::download::ytdlp_errors::{analyze_ytdlp_error, summarize_stderr};

/// Structured error type for download operations.
///
/// Categorized variants keep the HTTP mapping in one place: a failed yt-dlp
/// run is classified from its stderr, everything else maps directly.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp could not be started (binary missing, permissions)
    Spawn(String),
    /// yt-dlp did not exit before the configured timeout
    Timeout(Duration),
    /// yt-dlp exited with a non-zero status
    Failed { exit_code: Option<i32>, stderr: String },
    /// yt-dlp reported success but no output file was found
    FileNotFound(String),
    /// The download directory could not be created or listed
    Storage(String),
    /// `cookie_id` is not a well-formed identifier
    InvalidCookieId(String),
    /// `cookie_id` does not name an uploaded cookie file
    UnknownCookieId(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Spawn(msg) => write!(f, "Failed to start yt-dlp: {}", msg),
            DownloadError::Timeout(timeout) => write!(f, "yt-dlp timed out after {}s", timeout.as_secs()),
            DownloadError::Failed { exit_code, stderr } => write!(
                f,
                "yt-dlp exited with code {}: {}",
                exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                summarize_stderr(stderr)
            ),
            DownloadError::FileNotFound(msg) => write!(f, "{}", msg),
            DownloadError::Storage(msg) => write!(f, "Download storage error: {}", msg),
            DownloadError::InvalidCookieId(id) => write!(f, "Invalid cookie_id: {}", id),
            DownloadError::UnknownCookieId(id) => write!(f, "Unknown cookie_id: {}", id),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Spawn(_) => "spawn",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Failed { .. } => "ytdlp",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Storage(_) => "storage",
            DownloadError::InvalidCookieId(_) => "invalid_cookie_id",
            DownloadError::UnknownCookieId(_) => "unknown_cookie_id",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DownloadError::Spawn(_) | DownloadError::FileNotFound(_) | DownloadError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DownloadError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DownloadError::Failed { stderr, .. } => analyze_ytdlp_error(stderr).status_code(),
            DownloadError::InvalidCookieId(_) => StatusCode::BAD_REQUEST,
            DownloadError::UnknownCookieId(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message returned to the client.
    pub fn detail(&self) -> String {
        match self {
            DownloadError::Failed { stderr, .. } => summarize_stderr(stderr),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_display() {
        let err = DownloadError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "yt-dlp timed out after 30s");
    }

    #[test]
    fn test_download_error_subcategory() {
        assert_eq!(DownloadError::Spawn("".into()).subcategory(), "spawn");
        assert_eq!(DownloadError::Timeout(Duration::ZERO).subcategory(), "timeout");
        assert_eq!(
            DownloadError::Failed {
                exit_code: Some(1),
                stderr: String::new()
            }
            .subcategory(),
            "ytdlp"
        );
        assert_eq!(DownloadError::FileNotFound("".into()).subcategory(), "file_not_found");
        assert_eq!(DownloadError::Storage("".into()).subcategory(), "storage");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DownloadError::Timeout(Duration::from_secs(1)).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            DownloadError::Spawn("No such file or directory".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DownloadError::Storage("read-only file system".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DownloadError::InvalidCookieId("../etc".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_failed_is_classified_from_stderr() {
        let err = DownloadError::Failed {
            exit_code: Some(1),
            stderr: "ERROR: [youtube] abc: Private video. Sign in if you've been granted access".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.detail(),
            "ERROR: [youtube] abc: Private video. Sign in if you've been granted access"
        );
    }

    #[test]
    fn test_failed_display_without_exit_code() {
        let err = DownloadError::Failed {
            exit_code: None,
            stderr: "killed".to_string(),
        };
        assert_eq!(err.to_string(), "yt-dlp exited with code signal: killed");
    }
}
