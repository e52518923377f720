//! ytgate - HTTP front-end for yt-dlp
//!
//! A client submits a URL and a format; the service runs yt-dlp, waits for
//! the file it writes and streams that file back as the response body.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, process helpers, the web server
//! - `download`: request validation, cookie files, yt-dlp invocation and error classification
//! - `cli`: command-line interface

pub mod cli;
pub mod core;
pub mod download;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, ServerConfig};
pub use download::{download_media, DownloadError, DownloadRequest, MediaFormat};
