//! Classification of yt-dlp failures
//!
//! yt-dlp reports every failure as free-form text on stderr with a generic
//! exit code, so the HTTP status is picked by literal substring matching on
//! that text. Checks run in a fixed order; the first matching class wins.

use axum::http::StatusCode;

use crate::core::config::validation::MAX_ERROR_DETAIL_BYTES;
use crate::core::utils::{truncate_utf8, truncate_utf8_tail};

/// Types of yt-dlp errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// No extractor accepts the URL
    UnsupportedUrl,
    /// Video is private, removed or does not exist
    VideoUnavailable,
    /// Site demands a signed-in session or fresh cookies
    AuthRequired,
    /// Site throttled the request
    RateLimited,
    /// DNS, connection or socket failures
    NetworkError,
    /// Unknown error
    Unknown,
}

const UNSUPPORTED_URL_PATTERNS: &[&str] = &["unsupported url", "is not a valid url"];

const UNAVAILABLE_PATTERNS: &[&str] = &[
    "private video",
    "video unavailable",
    "this video is not available",
    "video has been removed",
    "does not exist",
    "http error 404",
];

const AUTH_PATTERNS: &[&str] = &[
    "sign in to confirm",
    "cookies are no longer valid",
    "login required",
    "use --cookies",
    "members-only",
    "http error 403",
];

const RATE_LIMIT_PATTERNS: &[&str] = &["http error 429", "too many requests", "rate limit"];

const NETWORK_PATTERNS: &[&str] = &[
    "timed out",
    "connection reset",
    "name or service not known",
    "failed to resolve",
    "network is unreachable",
];

/// Analyzes yt-dlp stderr and determines the error type
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();
    let matches_any = |patterns: &[&str]| patterns.iter().any(|p| stderr_lower.contains(p));

    if matches_any(UNSUPPORTED_URL_PATTERNS) {
        YtDlpErrorType::UnsupportedUrl
    } else if matches_any(UNAVAILABLE_PATTERNS) {
        YtDlpErrorType::VideoUnavailable
    } else if matches_any(AUTH_PATTERNS) {
        YtDlpErrorType::AuthRequired
    } else if matches_any(RATE_LIMIT_PATTERNS) {
        YtDlpErrorType::RateLimited
    } else if matches_any(NETWORK_PATTERNS) {
        YtDlpErrorType::NetworkError
    } else {
        YtDlpErrorType::Unknown
    }
}

impl YtDlpErrorType {
    pub fn status_code(self) -> StatusCode {
        match self {
            YtDlpErrorType::UnsupportedUrl => StatusCode::BAD_REQUEST,
            YtDlpErrorType::VideoUnavailable => StatusCode::NOT_FOUND,
            YtDlpErrorType::AuthRequired => StatusCode::FORBIDDEN,
            YtDlpErrorType::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            YtDlpErrorType::NetworkError => StatusCode::BAD_GATEWAY,
            YtDlpErrorType::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            YtDlpErrorType::UnsupportedUrl => "unsupported_url",
            YtDlpErrorType::VideoUnavailable => "video_unavailable",
            YtDlpErrorType::AuthRequired => "auth_required",
            YtDlpErrorType::RateLimited => "rate_limited",
            YtDlpErrorType::NetworkError => "network_error",
            YtDlpErrorType::Unknown => "unknown",
        }
    }
}

/// Picks the line worth showing to a client.
///
/// Prefers the last `ERROR:` line; otherwise falls back to the tail of the
/// trimmed stderr, where tracebacks put the exception. Either way the result
/// is capped at `MAX_ERROR_DETAIL_BYTES`.
pub fn summarize_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return "yt-dlp failed without error output".to_string();
    }

    match trimmed
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with("ERROR:"))
    {
        Some(line) => truncate_utf8(line, MAX_ERROR_DETAIL_BYTES).to_string(),
        None => truncate_utf8_tail(trimmed, MAX_ERROR_DETAIL_BYTES).to_string(),
    }
}
