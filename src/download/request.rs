//! Download request parsing and validation.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::core::config::validation::MAX_URL_LENGTH;
use crate::core::error::AppError;

/// Output flavour requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFormat {
    /// Best audio stream, extracted to mp3
    #[default]
    Audio,
    /// Best video + audio, merged into mp4
    Video,
}

impl MediaFormat {
    /// Extension of the file yt-dlp is asked to produce.
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Audio => "mp3",
            MediaFormat::Video => "mp4",
        }
    }
}

impl FromStr for MediaFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" | "mp3" => Ok(MediaFormat::Audio),
            "video" | "mp4" => Ok(MediaFormat::Video),
            other => Err(AppError::Validation(format!(
                "Unsupported format '{}': expected one of audio, mp3, video, mp4",
                other
            ))),
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFormat::Audio => write!(f, "audio"),
            MediaFormat::Video => write!(f, "video"),
        }
    }
}

/// Raw query string of `GET /download`.
///
/// Every field is optional so missing parameters produce our own 400 body
/// instead of the framework's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
    pub format: Option<String>,
    pub cookie_id: Option<String>,
}

/// A validated download request.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub format: MediaFormat,
    pub cookie_id: Option<String>,
}

impl DownloadRequest {
    pub fn from_query(query: DownloadQuery) -> Result<Self, AppError> {
        let raw_url = query
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Validation("Missing required query parameter 'url'".to_string()))?;

        let url = validate_url(raw_url)?;

        let format = match query.format.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            Some(f) => f.parse()?,
            None => MediaFormat::default(),
        };

        let cookie_id = query
            .cookie_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(Self { url, format, cookie_id })
    }
}

/// Checks length, syntax and scheme of a user-supplied URL.
pub fn validate_url(raw: &str) -> Result<Url, AppError> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(AppError::Validation(format!(
            "URL is too long ({} bytes, max {})",
            raw.len(),
            MAX_URL_LENGTH
        )));
    }

    let url = Url::parse(raw).map_err(|e| AppError::Validation(format!("Invalid URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::Validation(format!(
                "Unsupported URL scheme '{}': only http and https are allowed",
                scheme
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(AppError::Validation(format!("URL has no host: {}", raw)));
    }

    Ok(url)
}
