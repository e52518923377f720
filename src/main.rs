use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;

use ytgate::cli::{Cli, Commands};
use ytgate::core::runtime::detect_js_runtime;
use ytgate::core::web_server::{start_web_server, AppState};
use ytgate::core::{config, init_logger, log_startup_configuration, ServerConfig};
use ytgate::download::request::validate_url;
use ytgate::download::ytdlp::ytdlp_version;
use ytgate::download::{download_media, DownloadRequest, MediaFormat};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, binding the port) or
/// a one-shot command fails.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env before any config static is read
    let _ = dotenv();

    let cli = Cli::parse_args();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            download_dir,
            cookies_dir,
        }) => {
            let mut server_config = ServerConfig::from_env();
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(dir) = download_dir {
                server_config.download_dir = dir;
            }
            if let Some(dir) = cookies_dir {
                server_config.cookies_dir = dir;
            }
            run_server(server_config).await
        }
        Some(Commands::Download { url, format, cookies }) => run_cli_download(url, format, cookies).await,
        Some(Commands::Doctor) => run_doctor().await,
        None => {
            log::info!("No command specified, starting server with environment configuration");
            run_server(ServerConfig::from_env()).await
        }
    }
}

/// Prepares directories, probes the external tools and serves HTTP.
async fn run_server(server_config: ServerConfig) -> Result<()> {
    tokio::fs::create_dir_all(&server_config.download_dir).await?;
    tokio::fs::create_dir_all(&server_config.cookies_dir).await?;

    let version = ytdlp_version(&server_config).await;
    let js_runtime = detect_js_runtime(&server_config.js_runtime, config::download::probe_timeout()).await;
    log_startup_configuration(&server_config, version.as_deref(), js_runtime.as_ref());

    start_web_server(AppState::new(server_config, js_runtime)).await
}

/// `ytgate download <url>`: one pass through the HTTP pipeline without the server.
async fn run_cli_download(url: String, format: String, cookies: Option<PathBuf>) -> Result<()> {
    let server_config = ServerConfig::from_env();

    let request = DownloadRequest {
        url: validate_url(&url)?,
        format: format.parse::<MediaFormat>()?,
        cookie_id: None,
    };

    if let Some(path) = &cookies {
        if !path.is_file() {
            anyhow::bail!("Cookie file not found: {}", path.display());
        }
    }

    let js_runtime = detect_js_runtime(&server_config.js_runtime, config::download::probe_timeout()).await;
    let file = download_media(&server_config, js_runtime.as_ref(), &request, cookies.as_deref()).await?;

    println!("{}", file.path.display());
    Ok(())
}

/// `ytgate doctor`: reports what the server would detect at startup.
async fn run_doctor() -> Result<()> {
    let server_config = ServerConfig::from_env();

    let version = ytdlp_version(&server_config).await;
    let js_runtime = detect_js_runtime(&server_config.js_runtime, config::download::probe_timeout()).await;

    match &version {
        Some(v) => println!("yt-dlp ({}): {}", server_config.ytdl_bin, v),
        None => println!("yt-dlp ({}): NOT FOUND", server_config.ytdl_bin),
    }
    match &js_runtime {
        Some(rt) => println!("JS runtime: {} {}", rt.name, rt.version),
        None => println!("JS runtime ({}): NOT FOUND", server_config.js_runtime),
    }

    if version.is_none() {
        anyhow::bail!("yt-dlp is not installed or not executable");
    }
    Ok(())
}
