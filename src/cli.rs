use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytgate")]
#[command(author, version, about = "HTTP front-end that downloads media through yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Bind address (overrides HTTP_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides HTTP_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for downloaded files (overrides DOWNLOAD_DIR)
        #[arg(long)]
        download_dir: Option<PathBuf>,

        /// Directory for uploaded cookie files (overrides COOKIES_DIR)
        #[arg(long)]
        cookies_dir: Option<PathBuf>,
    },

    /// Download a single URL through the same pipeline and print the file path
    Download {
        /// URL to download
        url: String,

        /// Output format: audio (mp3) or video (mp4)
        #[arg(short, long, default_value = "audio")]
        format: String,

        /// Netscape cookie file passed to yt-dlp
        #[arg(short, long)]
        cookies: Option<PathBuf>,
    },

    /// Check yt-dlp and the JS runtime installation
    Doctor,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
