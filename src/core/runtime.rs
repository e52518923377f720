//! JavaScript runtime detection
//!
//! yt-dlp shells out to a JS runtime (deno by default) to solve site
//! challenges. The runtime is probed once at startup; the result drives both
//! the health report and whether `--js-runtimes` is passed to yt-dlp.

use serde::Serialize;
use std::time::Duration;

use crate::core::process::probe_version;

/// Runtimes yt-dlp knows how to drive.
pub const SUPPORTED_RUNTIMES: &[&str] = &["deno", "node", "bun", "quickjs"];

/// An installed JS runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsRuntime {
    pub name: String,
    pub version: String,
}

/// Probes the configured runtime binary.
///
/// Unsupported names are reported and treated as absent.
pub async fn detect_js_runtime(name: &str, timeout: Duration) -> Option<JsRuntime> {
    if !SUPPORTED_RUNTIMES.contains(&name) {
        log::warn!(
            "JS runtime '{}' is not supported by yt-dlp (expected one of: {})",
            name,
            SUPPORTED_RUNTIMES.join(", ")
        );
        return None;
    }

    let version = probe_version(name, timeout).await?;
    Some(JsRuntime {
        name: name.to_string(),
        version: clean_version(name, &version),
    })
}

/// Strips the binary name prefix some runtimes print (`deno 2.1.4 (stable, ...)`).
fn clean_version(name: &str, raw: &str) -> String {
    let rest = raw.strip_prefix(name).map(str::trim_start).unwrap_or(raw);
    rest.split_whitespace().next().unwrap_or(rest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_version() {
        assert_eq!(
            clean_version("deno", "deno 2.1.4 (stable, release, x86_64-unknown-linux-gnu)"),
            "2.1.4"
        );
        assert_eq!(clean_version("node", "v20.11.1"), "v20.11.1");
        assert_eq!(clean_version("bun", "1.1.38"), "1.1.38");
    }

    #[tokio::test]
    async fn test_unsupported_runtime_is_absent() {
        assert_eq!(detect_js_runtime("python", Duration::from_secs(1)).await, None);
    }
}
