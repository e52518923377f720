use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the service
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// JavaScript runtime handed to yt-dlp via `--js-runtimes`
/// Read from JS_RUNTIME environment variable
/// Supported by yt-dlp: deno, node, bun, quickjs
/// Default: deno
pub static JS_RUNTIME: Lazy<String> = Lazy::new(|| {
    env::var("JS_RUNTIME")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "deno".to_string())
});

/// Download folder path
/// Read from DOWNLOAD_DIR environment variable
/// Supports tilde (~) expansion for home directory
/// Default: downloads
pub static DOWNLOAD_DIR: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_string()));

/// Directory holding uploaded cookie files
/// Read from COOKIES_DIR environment variable
/// Default: cookies
pub static COOKIES_DIR: Lazy<String> = Lazy::new(|| env::var("COOKIES_DIR").unwrap_or_else(|_| "cookies".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: ytgate.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "ytgate.log".to_string()));

/// HTTP server configuration
pub mod http {
    use once_cell::sync::Lazy;
    use std::env;

    /// Bind address
    /// Read from HTTP_HOST environment variable
    /// Default: 0.0.0.0
    pub static HOST: Lazy<String> = Lazy::new(|| env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()));

    /// Port for the HTTP server
    /// Read from HTTP_PORT environment variable
    /// Default: 8000
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000)
    });
}

/// Download configuration
pub mod download {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Default timeout for yt-dlp downloads (in seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 600; // 10 minutes

    /// Timeout for a single yt-dlp invocation
    /// Read from DOWNLOAD_TIMEOUT environment variable (seconds)
    pub static TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("DOWNLOAD_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    });

    /// Timeout for `--version` probes of yt-dlp and the JS runtime
    pub const PROBE_TIMEOUT_SECS: u64 = 10;

    /// yt-dlp command timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*TIMEOUT_SECS)
    }

    /// Version probe timeout duration
    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }

    /// Desktop browser User-Agent sent through `--add-header`
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

    /// User-Agent override
    /// Read from USER_AGENT environment variable
    pub static USER_AGENT: Lazy<String> = Lazy::new(|| {
        env::var("USER_AGENT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    });

    /// Accept-Language sent through `--add-header`
    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
}

/// Cookie upload configuration
pub mod cookies {
    use once_cell::sync::Lazy;
    use std::env;

    /// Default upload cap (1 MB)
    pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

    /// Maximum accepted size of an uploaded cookie file
    /// Read from MAX_COOKIE_BYTES environment variable
    pub static MAX_BYTES: Lazy<usize> = Lazy::new(|| {
        env::var("MAX_COOKIE_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_BYTES)
    });
}

/// Validation configuration
pub mod validation {
    /// Maximum URL length (RFC 7230 recommends 8000, but we use 2048 for safety)
    pub const MAX_URL_LENGTH: usize = 2048;

    /// Maximum number of stderr bytes echoed back in an error response
    pub const MAX_ERROR_DETAIL_BYTES: usize = 2000;
}

/// Expands `~` and returns an owned path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Resolved runtime configuration for the HTTP server and the download pipeline.
///
/// Built from the environment statics above via [`ServerConfig::from_env`];
/// CLI flags and tests override individual fields.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub ytdl_bin: String,
    pub js_runtime: String,
    pub download_dir: PathBuf,
    pub cookies_dir: PathBuf,
    pub download_timeout: Duration,
    pub max_cookie_bytes: usize,
    pub user_agent: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: http::HOST.clone(),
            port: *http::PORT,
            ytdl_bin: YTDL_BIN.clone(),
            js_runtime: JS_RUNTIME.clone(),
            download_dir: expand_path(&DOWNLOAD_DIR),
            cookies_dir: expand_path(&COOKIES_DIR),
            download_timeout: download::timeout(),
            max_cookie_bytes: *cookies::MAX_BYTES,
            user_agent: download::USER_AGENT.clone(),
        }
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
