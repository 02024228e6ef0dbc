use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Directory for uploads and generated files
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },

    /// Transcribe a media file into <base>.srt and <base>.vtt
    Extract {
        /// Input media file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Translate a SubRip file, writing the .srt and a sibling .vtt
    Translate {
        /// Input SubRip file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language code
        #[arg(short, long)]
        target: String,

        /// Source language code, defaults to the configured one
        #[arg(short, long)]
        source: Option<String>,

        /// Output SubRip file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Embed a subtitle file into a video
    Mux {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Subtitle file
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },
}
