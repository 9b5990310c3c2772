use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt2md",
    about = "yt2md - Save YouTube video and playlist transcripts as Markdown files",
    version,
    long_about = "A CLI tool that fetches YouTube video transcripts and writes each one to a Markdown file. When a video has no transcript, the audio is downloaded with yt-dlp and transcribed locally with a Whisper model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch transcripts for a video or playlist and write Markdown files
    Fetch {
        /// URL of the YouTube video or playlist
        #[arg(value_name = "URL")]
        url: String,

        /// Directory to save the Markdown files (defaults to the current directory)
        #[arg(short = 'd', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Prefix for generated Markdown file names
        #[arg(short, long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Directory for intermediate audio files (a temporary directory if not set)
        #[arg(long, value_name = "DIR")]
        audio_dir: Option<PathBuf>,

        /// Preferred transcript language code (repeatable, in priority order)
        #[arg(short, long = "language", value_name = "LANG")]
        languages: Vec<String>,

        /// Maximum number of videos processed concurrently
        #[arg(short, long, value_name = "COUNT")]
        jobs: Option<usize>,

        /// Keep downloaded audio files after transcription
        #[arg(long)]
        keep_audio: bool,

        /// Skip the audio-transcription fallback when no transcript is available
        #[arg(long)]
        no_audio_fallback: bool,

        /// Path to a whisper ggml model file (overrides the configured model)
        #[arg(short, long, value_name = "FILE")]
        model: Option<PathBuf>,
    },

    /// Download or list local Whisper models
    Model {
        /// Download the named model (e.g. "base", "small.en")
        #[arg(long, value_name = "NAME")]
        download: Option<String>,

        /// List known models and whether they are installed
        #[arg(long)]
        list: bool,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
