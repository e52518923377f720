//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup report of the resolved configuration, yt-dlp and JS runtime

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config::ServerConfig;
use crate::core::runtime::JsRuntime;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the configuration the server starts with
///
/// Reports:
/// - bind address, download and cookie directories, timeout
/// - detected yt-dlp version (or a loud error if it is missing)
/// - JS runtime status
pub fn log_startup_configuration(config: &ServerConfig, ytdlp_version: Option<&str>, js_runtime: Option<&JsRuntime>) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("ytgate {}", env!("CARGO_PKG_VERSION"));
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Listen address:   {}", config.bind_addr());
    log::info!("Download dir:     {}", config.download_dir.display());
    log::info!("Cookies dir:      {}", config.cookies_dir.display());
    log::info!("Download timeout: {}s", config.download_timeout.as_secs());

    match ytdlp_version {
        Some(version) => log::info!("✅ {}: {}", config.ytdl_bin, version),
        None => {
            log::error!("❌ {}: not found or not executable", config.ytdl_bin);
            log::error!("   Every /download request will fail until it is installed");
            log::error!("   Install: pip3 install -U yt-dlp (or set YTDL_BIN)");
        }
    }

    match js_runtime {
        Some(runtime) => log::info!("✅ JS runtime: {} {}", runtime.name, runtime.version),
        None => {
            log::warn!("⚠️  JS runtime '{}' not found", config.js_runtime);
            log::warn!("   Sites that need challenge solving (YouTube) may fail");
        }
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
