//! yt2md - A Rust CLI tool for saving YouTube transcripts as Markdown
//!
//! This library resolves a YouTube video or playlist URL into its videos,
//! fetches each video's transcript via the caption API (falling back to
//! downloading the audio and running a local Whisper model), and writes one
//! Markdown file per video.

pub mod cli;
pub mod config;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod playlist;
pub mod sources;
pub mod utils;
pub mod whisper;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use pipeline::{MarkdownPipeline, PipelineOptions, Status, VideoOutcome};
pub use playlist::VideoEntry;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to yt2md
#[derive(thiserror::Error, Debug)]
pub enum Yt2mdError {
    #[error("Unsupported URL format: {0}")]
    UnsupportedUrl(String),

    #[error("No videos found at: {0}")]
    PlaylistEmpty(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Whisper model \"{name}\" not found at {}; run `yt2md model --download {name}` to fetch it", .path.display())]
    ModelMissing {
        name: String,
        path: std::path::PathBuf,
    },

    #[error("File operation failed: {0}")]
    FileError(String),
}
