//! Test fixtures for HTTP tests
//!
//! Provides fake `yt-dlp` executables and a TestEnvironment that wires a
//! router to temp directories.
//!
//! All fake binaries are written once, before any test spawns a process:
//! exec'ing a script that another thread still holds open for writing fails
//! with ETXTBSY on Linux.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::Router;
use tempfile::TempDir;
use ytgate::core::runtime::JsRuntime;
use ytgate::core::web_server::{build_router, AppState};
use ytgate::ServerConfig;

/// Shell prologue shared by every fake: finds the `-o` template and records argv
/// next to the download directory.
const PROLOGUE: &str = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
if [ "$1" = "--version" ]; then echo "2025.01.15"; exit 0; fi
dir=$(dirname "$out")
printf '%s\n' "$@" > "$dir/../yt-dlp-args.log"
ext=mp3
for arg in "$@"; do
  if [ "$arg" = "--merge-output-format" ]; then ext=mp4; fi
done
target=$(printf '%s' "$out" | sed "s/%(ext)s/$ext/")
"#;

/// Behaviours of the fake yt-dlp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeBin {
    /// Writes `FAKE-<EXT>-DATA` to the target plus a leftover `.part` file
    Success,
    /// Exits 0 without writing anything
    NoOutput,
    /// Private video error
    PrivateVideo,
    /// Bot check error
    BotCheck,
    /// HTTP 429
    RateLimited,
    /// Unsupported URL
    UnsupportedUrl,
    /// Unclassified failure
    Crash,
    /// Sleeps longer than any test timeout
    Hang,
}

impl FakeBin {
    const ALL: [FakeBin; 8] = [
        FakeBin::Success,
        FakeBin::NoOutput,
        FakeBin::PrivateVideo,
        FakeBin::BotCheck,
        FakeBin::RateLimited,
        FakeBin::UnsupportedUrl,
        FakeBin::Crash,
        FakeBin::Hang,
    ];

    fn file_name(self) -> &'static str {
        match self {
            FakeBin::Success => "yt-dlp-success",
            FakeBin::NoOutput => "yt-dlp-no-output",
            FakeBin::PrivateVideo => "yt-dlp-private",
            FakeBin::BotCheck => "yt-dlp-bot-check",
            FakeBin::RateLimited => "yt-dlp-429",
            FakeBin::UnsupportedUrl => "yt-dlp-unsupported",
            FakeBin::Crash => "yt-dlp-crash",
            FakeBin::Hang => "yt-dlp-hang",
        }
    }

    fn body(self) -> &'static str {
        match self {
            FakeBin::Success => {
                "printf 'FAKE-%s-DATA' \"$ext\" | tr 'a-z' 'A-Z' > \"$target\"\n\
                 printf 'partial' > \"$target.part\"\n\
                 exit 0\n"
            }
            FakeBin::NoOutput => "exit 0\n",
            FakeBin::PrivateVideo => {
                "echo \"WARNING: [youtube] falling back to web client\" >&2\n\
                 echo \"ERROR: [youtube] dQw4w9WgXcQ: Private video. Sign in if you've been granted access to this video\" >&2\n\
                 exit 1\n"
            }
            FakeBin::BotCheck => {
                "echo \"ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm you're not a bot. Use --cookies-from-browser or --cookies for the authentication.\" >&2\n\
                 exit 1\n"
            }
            FakeBin::RateLimited => {
                "echo \"ERROR: [youtube] dQw4w9WgXcQ: HTTP Error 429: Too Many Requests\" >&2\n\
                 exit 1\n"
            }
            FakeBin::UnsupportedUrl => {
                "echo \"ERROR: Unsupported URL: https://example.com/\" >&2\n\
                 exit 1\n"
            }
            FakeBin::Crash => {
                "echo \"Traceback (most recent call last): KeyError: 'formats'\" >&2\n\
                 exit 2\n"
            }
            FakeBin::Hang => "exec sleep 30\n",
        }
    }
}

struct FakeBins {
    _dir: TempDir,
    paths: Vec<(FakeBin, PathBuf)>,
}

static FAKE_BINS: OnceLock<FakeBins> = OnceLock::new();

fn write_fake_bins() -> FakeBins {
    let dir = tempfile::tempdir().unwrap();
    let paths = FakeBin::ALL
        .iter()
        .map(|&kind| {
            let path = dir.path().join(kind.file_name());
            std::fs::write(&path, format!("{}{}", PROLOGUE, kind.body())).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            (kind, path)
        })
        .collect();
    FakeBins { _dir: dir, paths }
}

/// Path of the fake binary with the given behaviour.
pub fn fake_bin(kind: FakeBin) -> PathBuf {
    let bins = FAKE_BINS.get_or_init(write_fake_bins);
    bins.paths
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, p)| p.clone())
        .unwrap()
}

/// Complete test environment for HTTP tests
///
/// # Example
/// ```ignore
/// let env = TestEnvironment::new(FakeBin::Success);
/// let response = env.router().oneshot(get("/download?url=https://youtu.be/x")).await.unwrap();
/// ```
pub struct TestEnvironment {
    /// Root of downloads/, cookies/ and the argv log
    pub root: TempDir,
    pub config: ServerConfig,
    pub js_runtime: Option<JsRuntime>,
}

impl TestEnvironment {
    pub fn new(kind: FakeBin) -> Self {
        let root = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::from_env();
        config.ytdl_bin = fake_bin(kind).to_string_lossy().to_string();
        config.download_dir = root.path().join("downloads");
        config.cookies_dir = root.path().join("cookies");
        config.download_timeout = Duration::from_secs(20);
        config.max_cookie_bytes = 4096;
        config.user_agent = "ytgate-test/1.0".to_string();

        Self {
            root,
            config,
            js_runtime: None,
        }
    }

    pub fn with_binary(mut self, path: &str) -> Self {
        self.config.ytdl_bin = path.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = timeout;
        self
    }

    pub fn with_js_runtime(mut self, name: &str, version: &str) -> Self {
        self.js_runtime = Some(JsRuntime {
            name: name.to_string(),
            version: version.to_string(),
        });
        self
    }

    pub fn router(&self) -> Router {
        build_router(Arc::new(AppState::new(self.config.clone(), self.js_runtime.clone())))
    }

    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    /// Arguments the fake yt-dlp received on its last run, one per line.
    pub fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.root.path().join("yt-dlp-args.log"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
