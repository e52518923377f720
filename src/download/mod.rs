//! Download pipeline: request validation, cookie files, yt-dlp invocation,
//! output discovery and error classification

pub mod cookies;
pub mod error;
pub mod output;
pub mod request;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use error::DownloadError;
pub use output::ProducedFile;
pub use request::{DownloadQuery, DownloadRequest, MediaFormat};
pub use ytdlp::download_media;
