use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hls-sink")]
#[command(author, version, about = "Passive HLS segment and playlist ingest endpoint")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the ingest server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show where an origin URL would be stored
    Resolve {
        /// Origin URL of a segment or playlist
        #[arg(required = true)]
        url: String,
    },

    /// Merge the segments of a playlist file into an existing one
    Merge {
        /// Existing playlist to grow
        #[arg(required = true)]
        playlist: PathBuf,

        /// Playlist text to take new segments from
        #[arg(required = true)]
        incoming: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
