//! yt-dlp invocation: argument building and the download run itself.
//!
//! One request maps to one yt-dlp process. The process writes
//! `<download_dir>/<uuid>.<ext>`; the caller streams that file back.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use url::Url;
use uuid::Uuid;

use crate::core::config::{self, ServerConfig};
use crate::core::process::{probe_version, run_with_timeout};
use crate::core::runtime::JsRuntime;
use crate::download::error::DownloadError;
use crate::download::output::{find_produced_file, ProducedFile};
use crate::download::request::{DownloadRequest, MediaFormat};
use crate::download::ytdlp_errors::analyze_ytdlp_error;

/// Format selector for audio: best audio-only stream, any container.
const AUDIO_FORMAT_SELECTOR: &str = "bestaudio/best";

/// Format selector for video: prefer mp4+m4a so the merge needs no re-encode.
const VIDEO_FORMAT_SELECTOR: &str = "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/bv*+ba/b";

/// Builder for a yt-dlp command line.
///
/// # Example
///
/// ```ignore
/// let args = YtDlpCommand::new(url, "downloads/1234.%(ext)s")
///     .format(MediaFormat::Video)
///     .cookies(Some(Path::new("cookies/abcd.txt")))
///     .js_runtime(Some("deno"))
///     .build_args();
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpCommand {
    url: Url,
    output_template: String,
    format: MediaFormat,
    user_agent: String,
    cookies: Option<PathBuf>,
    js_runtime: Option<String>,
}

impl YtDlpCommand {
    /// Create a new builder for the given URL and output template.
    pub fn new(url: Url, output_template: impl Into<String>) -> Self {
        Self {
            url,
            output_template: output_template.into(),
            format: MediaFormat::default(),
            user_agent: config::download::DEFAULT_USER_AGENT.to_string(),
            cookies: None,
            js_runtime: None,
        }
    }

    /// Set the requested output format.
    pub fn format(mut self, format: MediaFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the User-Agent header sent to the site.
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Pass a Netscape cookie file via `--cookies`.
    pub fn cookies(mut self, path: Option<&Path>) -> Self {
        self.cookies = path.map(Path::to_path_buf);
        self
    }

    /// Let yt-dlp use the given JS runtime for challenge solving.
    pub fn js_runtime(mut self, runtime: Option<&str>) -> Self {
        self.js_runtime = runtime.map(str::to_string);
        self
    }

    /// Produces the argument vector (without the binary name).
    pub fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::with_capacity(32);

        match self.format {
            MediaFormat::Audio => {
                args.extend(
                    [
                        "-f",
                        AUDIO_FORMAT_SELECTOR,
                        "--extract-audio",
                        "--audio-format",
                        "mp3",
                        "--audio-quality",
                        "0",
                    ]
                    .map(String::from),
                );
            }
            MediaFormat::Video => {
                args.extend(["-f", VIDEO_FORMAT_SELECTOR, "--merge-output-format", "mp4"].map(String::from));
            }
        }

        args.extend(["--no-playlist", "--no-progress", "--newline", "--force-overwrites"].map(String::from));

        // Browser-like headers; bare python-requests headers trip bot checks
        args.push("--add-header".to_string());
        args.push(format!("User-Agent:{}", self.user_agent));
        args.push("--add-header".to_string());
        args.push(format!("Accept-Language:{}", config::download::ACCEPT_LANGUAGE));
        args.push("--add-header".to_string());
        args.push(format!("Referer:{}/", self.url.origin().ascii_serialization()));

        if let Some(cookies) = &self.cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().to_string());
        }

        if let Some(runtime) = &self.js_runtime {
            args.push("--js-runtimes".to_string());
            args.push(runtime.clone());
        }

        args.push("-o".to_string());
        args.push(self.output_template.clone());

        // `--` keeps a URL starting with '-' from being read as an option
        args.push("--".to_string());
        args.push(self.url.to_string());

        args
    }
}

/// Runs yt-dlp for one request and returns the file it produced.
///
/// Blocks (asynchronously) until yt-dlp exits or the configured timeout
/// fires. Non-zero exits carry the captured stderr for classification.
pub async fn download_media(
    config: &ServerConfig,
    js_runtime: Option<&JsRuntime>,
    request: &DownloadRequest,
    cookies: Option<&Path>,
) -> Result<ProducedFile, DownloadError> {
    tokio::fs::create_dir_all(&config.download_dir).await.map_err(|e| {
        DownloadError::Storage(format!(
            "Cannot create download dir {}: {}",
            config.download_dir.display(),
            e
        ))
    })?;

    let file_id = Uuid::new_v4().to_string();
    let output_template = config
        .download_dir
        .join(format!("{}.%(ext)s", file_id))
        .to_string_lossy()
        .to_string();

    let args = YtDlpCommand::new(request.url.clone(), output_template)
        .format(request.format)
        .user_agent(&config.user_agent)
        .cookies(cookies)
        .js_runtime(js_runtime.map(|r| r.name.as_str()))
        .build_args();

    log::info!(
        "⬇️  [{}] {} ({}, cookies: {})",
        file_id,
        request.url,
        request.format,
        if cookies.is_some() { "yes" } else { "no" }
    );
    log::debug!("yt-dlp command: {} {}", config.ytdl_bin, args.join(" "));

    let started = std::time::Instant::now();
    let mut cmd = Command::new(&config.ytdl_bin);
    cmd.args(&args);
    let output = run_with_timeout(&mut cmd, config.download_timeout).await.map_err(|e| {
        log::error!("[{}] yt-dlp did not complete ({}): {}", file_id, e.subcategory(), e);
        e
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        log::error!(
            "[{}] yt-dlp failed (exit {:?}, class {}) after {:.1}s",
            file_id,
            output.status.code(),
            analyze_ytdlp_error(&stderr).as_str(),
            started.elapsed().as_secs_f64()
        );
        return Err(DownloadError::Failed {
            exit_code: output.status.code(),
            stderr,
        });
    }

    let file = find_produced_file(&config.download_dir, &file_id).await.map_err(|e| {
        log::error!("[{}] output lookup failed ({}): {}", file_id, e.subcategory(), e);
        e
    })?;
    let expected_ext = request.format.extension();
    if !file.file_name.ends_with(&format!(".{}", expected_ext)) {
        log::warn!(
            "[{}] expected a .{} file for {} but yt-dlp produced {}",
            file_id,
            expected_ext,
            request.format,
            file.file_name
        );
    }
    log::info!(
        "✅ [{}] {} ({} bytes) in {:.1}s",
        file_id,
        file.file_name,
        file.size,
        started.elapsed().as_secs_f64()
    );
    Ok(file)
}

/// Reports the installed yt-dlp version, `None` when it cannot be run.
pub async fn ytdlp_version(config: &ServerConfig) -> Option<String> {
    probe_version(&config.ytdl_bin, config::download::probe_timeout()).await
}
