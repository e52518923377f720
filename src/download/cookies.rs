//! Uploaded cookie files for yt-dlp
//!
//! This module provides functionality to:
//! - Store an uploaded cookie file verbatim under a generated id
//! - Resolve a `cookie_id` back to a file path for `--cookies`
//! - Produce a light Netscape-format diagnostic for logs and the upload response
//!
//! Cookie content is opaque: it is never rejected for its format, only for
//! being empty or oversized.

use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::download::error::DownloadError;

const COOKIE_FILE_EXTENSION: &str = "txt";
const NETSCAPE_HEADER: &str = "Netscape HTTP Cookie File";

/// Quick look at a cookie file's structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookiesDiagnostic {
    /// `# Netscape HTTP Cookie File` (or `# HTTP Cookie File`) header present
    pub netscape_header: bool,
    /// Lines with the 7 tab-separated Netscape fields
    pub cookie_count: usize,
}

/// Result of a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct StoredCookies {
    pub cookie_id: String,
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(flatten)]
    pub diagnostic: CookiesDiagnostic,
}

/// Parse Netscape cookie file content and count well-formed entries
pub fn diagnose_cookies_content(content: &str) -> CookiesDiagnostic {
    let netscape_header = content
        .lines()
        .take(5)
        .any(|l| l.contains(NETSCAPE_HEADER) || l.trim() == "# HTTP Cookie File");

    let cookie_count = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        // `#HttpOnly_` prefixed lines are real cookies, other `#` lines are comments
        .map(|line| line.strip_prefix("#HttpOnly_").unwrap_or(line))
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter(|line| line.split('\t').count() >= 7)
        .count();

    CookiesDiagnostic {
        netscape_header,
        cookie_count,
    }
}

/// Writes an uploaded cookie file into `dir` under a fresh id.
///
/// The bytes are stored verbatim. The write goes to a temp file first and is
/// renamed into place so a concurrent download never sees a half-written file.
pub async fn store_cookie_file(dir: &Path, data: &[u8], max_bytes: usize) -> Result<StoredCookies, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded cookie file is empty".to_string()));
    }
    if data.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "Uploaded cookie file is too large ({} bytes, max {})",
            data.len(),
            max_bytes
        )));
    }

    tokio::fs::create_dir_all(dir).await?;

    let id = Uuid::new_v4();
    let path = cookie_path_for(dir, &id);
    let temp_path = dir.join(format!(".{}.{}.tmp", id, std::process::id()));

    tokio::fs::write(&temp_path, data).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    let diagnostic = diagnose_cookies_content(&String::from_utf8_lossy(data));
    if !diagnostic.netscape_header {
        log::warn!(
            "⚠️  Cookie file {} has no Netscape header; yt-dlp may refuse it",
            id
        );
    }
    log::info!(
        "🍪 Stored cookie file {} ({} bytes, {} cookies)",
        id,
        data.len(),
        diagnostic.cookie_count
    );

    Ok(StoredCookies {
        cookie_id: id.to_string(),
        path,
        diagnostic,
    })
}

/// Maps a `cookie_id` to its path without touching the filesystem.
///
/// The id must be a UUID, which also keeps it from escaping `dir`.
pub fn cookie_file_path(dir: &Path, cookie_id: &str) -> Result<PathBuf, DownloadError> {
    let id = Uuid::parse_str(cookie_id).map_err(|_| DownloadError::InvalidCookieId(cookie_id.to_string()))?;
    Ok(cookie_path_for(dir, &id))
}

/// Resolves a `cookie_id` to an existing cookie file.
pub async fn resolve_cookie_file(dir: &Path, cookie_id: &str) -> Result<PathBuf, DownloadError> {
    let path = cookie_file_path(dir, cookie_id)?;
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok(path),
        _ => Err(DownloadError::UnknownCookieId(cookie_id.to_string())),
    }
}

fn cookie_path_for(dir: &Path, id: &Uuid) -> PathBuf {
    dir.join(format!("{}.{}", id.hyphenated(), COOKIE_FILE_EXTENSION))
}
