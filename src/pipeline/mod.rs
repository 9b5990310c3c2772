use anyhow::Result;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::model;
use crate::output;
use crate::playlist::{VideoEntry, VideoResolver};
use crate::sources::{audio::AudioTranscriber, captions::CaptionFetcher, TextSource};

/// Options that only make sense per invocation, not in the config file
#[derive(Debug, Default)]
pub struct PipelineOptions {
    /// Skip the audio-transcription fallback entirely
    pub no_audio_fallback: bool,

    /// Whisper model path from the command line
    pub model_override: Option<PathBuf>,

    /// Suppress progress bars
    pub quiet: bool,
}

/// How a single video ended up
#[derive(Debug)]
pub enum Status {
    /// Transcript text was written
    Written {
        path: PathBuf,
        source: &'static str,
    },

    /// No source had text; the file carries the placeholder body
    Empty { path: PathBuf },

    /// A source or the file write failed
    Failed { reason: String },
}

/// Per-video result of a pipeline run
#[derive(Debug)]
pub struct VideoOutcome {
    pub entry: VideoEntry,
    pub status: Status,
}

/// Orchestrates playlist expansion, the per-video source walk, and Markdown
/// emission, processing videos concurrently with a bounded fan-out.
pub struct MarkdownPipeline {
    config: Config,
    resolver: VideoResolver,
    sources: Vec<Arc<dyn TextSource>>,
    quiet: bool,
}

impl MarkdownPipeline {
    /// Create a new pipeline from configuration
    pub fn new(config: Config, options: PipelineOptions) -> Result<Self> {
        let mut sources: Vec<Arc<dyn TextSource>> = Vec::new();

        sources.push(Arc::new(CaptionFetcher::new(
            config.transcript.languages.clone(),
        )?));

        if options.no_audio_fallback {
            tracing::info!("Audio-transcription fallback disabled");
        } else {
            let model_path =
                model::resolve_model(&config.whisper, options.model_override.as_deref())?;

            sources.push(Arc::new(AudioTranscriber::new(
                config.app.audio_dir.clone(),
                config.app.keep_audio,
                config.whisper.model.clone(),
                model_path,
                config.whisper.language.clone(),
                config.whisper.threads,
            )?));
        }

        Ok(Self {
            config,
            resolver: VideoResolver::new(),
            sources,
            quiet: options.quiet,
        })
    }

    /// Process every video behind `url`, returning one outcome per video in
    /// playlist order. Individual failures never abort sibling videos.
    pub async fn run(&self, url: &str) -> Result<Vec<VideoOutcome>> {
        let entries = self.resolver.resolve(url).await?;
        tracing::info!("Resolved {} video(s) from URL", entries.len());

        let progress = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(entries.len() as u64)
        };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        progress.set_message("Processing videos...");

        let jobs = self.config.app.max_concurrent_jobs.max(1);

        let mut outcomes: Vec<VideoOutcome> = futures_util::stream::iter(entries)
            .map(|entry| {
                let progress = progress.clone();
                async move {
                    let outcome = self.process_video(entry).await;
                    progress.inc(1);
                    outcome
                }
            })
            .buffer_unordered(jobs)
            .collect()
            .await;

        progress.finish_with_message("Done");

        // Completion order is arbitrary; report in playlist order.
        outcomes.sort_by_key(|o| o.entry.ordinal);

        Ok(outcomes)
    }

    async fn process_video(&self, entry: VideoEntry) -> VideoOutcome {
        let path = self
            .config
            .app
            .output_dir
            .join(output::file_name(&self.config.app.file_prefix, entry.ordinal));

        let (text, failure) = first_text(&self.sources, &entry).await;

        let body = text.as_ref().map(|(t, _)| t.as_str());
        if let Err(e) = output::write_markdown(&path, &entry.title, body).await {
            tracing::error!("Error processing video ID {}: {:#}", entry.id, e);
            return VideoOutcome {
                entry,
                status: Status::Failed {
                    reason: format!("write failed: {:#}", e),
                },
            };
        }

        tracing::info!("File created: {}", path.display());

        let status = match (text, failure) {
            (Some((_, source)), _) => Status::Written { path, source },
            (None, Some(reason)) => Status::Failed { reason },
            (None, None) => Status::Empty { path },
        };

        VideoOutcome { entry, status }
    }
}

/// Walk the sources in order and return the first text produced, along with
/// the last source error seen (if any).
async fn first_text(
    sources: &[Arc<dyn TextSource>],
    entry: &VideoEntry,
) -> (Option<(String, &'static str)>, Option<String>) {
    let mut failure = None;

    for source in sources {
        match source.fetch_text(entry).await {
            Ok(Some(text)) => return (Some((text, source.source_name())), failure),
            Ok(None) => {
                tracing::debug!(
                    "No text from {} for video {}",
                    source.source_name(),
                    entry.id
                );
            }
            Err(e) => {
                tracing::error!(
                    "{} failed for video {}: {:#}",
                    source.source_name(),
                    entry.id,
                    e
                );
                failure = Some(format!("{}: {:#}", source.source_name(), e));
            }
        }
    }

    (None, failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedSource {
        name: &'static str,
        result: Option<String>,
    }

    #[async_trait]
    impl TextSource for FixedSource {
        async fn fetch_text(&self, _entry: &VideoEntry) -> Result<Option<String>> {
            Ok(self.result.clone())
        }

        fn source_name(&self) -> &'static str {
            self.name
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TextSource for FailingSource {
        async fn fetch_text(&self, _entry: &VideoEntry) -> Result<Option<String>> {
            anyhow::bail!("network down")
        }

        fn source_name(&self) -> &'static str {
            "failing"
        }
    }

    fn entry() -> VideoEntry {
        VideoEntry {
            id: "pzo13OPXZS4".to_string(),
            title: "Test Title".to_string(),
            ordinal: 1,
        }
    }

    #[tokio::test]
    async fn test_first_text_prefers_earlier_sources() {
        let sources: Vec<Arc<dyn TextSource>> = vec![
            Arc::new(FixedSource {
                name: "captions",
                result: Some("from captions".to_string()),
            }),
            Arc::new(FixedSource {
                name: "audio",
                result: Some("from audio".to_string()),
            }),
        ];

        let (text, failure) = first_text(&sources, &entry()).await;
        assert_eq!(text, Some(("from captions".to_string(), "captions")));
        assert!(failure.is_none());
    }

    #[tokio::test]
    async fn test_first_text_falls_through_on_none() {
        let sources: Vec<Arc<dyn TextSource>> = vec![
            Arc::new(FixedSource {
                name: "captions",
                result: None,
            }),
            Arc::new(FixedSource {
                name: "audio",
                result: Some("from audio".to_string()),
            }),
        ];

        let (text, _) = first_text(&sources, &entry()).await;
        assert_eq!(text, Some(("from audio".to_string(), "audio")));
    }

    #[tokio::test]
    async fn test_first_text_falls_through_on_error() {
        let sources: Vec<Arc<dyn TextSource>> = vec![
            Arc::new(FailingSource),
            Arc::new(FixedSource {
                name: "audio",
                result: Some("recovered".to_string()),
            }),
        ];

        let (text, failure) = first_text(&sources, &entry()).await;
        assert_eq!(text, Some(("recovered".to_string(), "audio")));
        // The error was swallowed by a later success but still observed
        assert!(failure.is_some());
    }

    #[tokio::test]
    async fn test_first_text_reports_failure_when_nothing_produced() {
        let sources: Vec<Arc<dyn TextSource>> = vec![
            Arc::new(FixedSource {
                name: "captions",
                result: None,
            }),
            Arc::new(FailingSource),
        ];

        let (text, failure) = first_text(&sources, &entry()).await;
        assert!(text.is_none());
        let reason = failure.unwrap();
        assert!(reason.contains("failing"));
        assert!(reason.contains("network down"));
    }
}
