use async_trait::async_trait;
use yt_transcript_rs::api::YouTubeTranscriptApi;

use super::{join_fragments, TextSource};
use crate::playlist::VideoEntry;
use crate::Result;

/// Transcript fetcher backed by the YouTube caption API.
///
/// Videos without captions in any of the preferred languages yield
/// `Ok(None)` so the pipeline can fall back to audio transcription.
pub struct CaptionFetcher {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl CaptionFetcher {
    pub fn new(languages: Vec<String>) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| anyhow::anyhow!("Failed to create caption API client: {}", e))?;

        Ok(Self { api, languages })
    }
}

#[async_trait]
impl TextSource for CaptionFetcher {
    async fn fetch_text(&self, entry: &VideoEntry) -> Result<Option<String>> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        tracing::debug!("Fetching transcript for video: {}", entry.id);

        let transcript = match self.api.fetch_transcript(&entry.id, &languages, false).await {
            Ok(transcript) => transcript,
            Err(e) => {
                // The API does not distinguish "no captions" from transient
                // failures, so any error here falls through to the next source.
                tracing::warn!("No transcript for video {}: {}", entry.id, e);
                return Ok(None);
            }
        };

        let text = join_fragments(transcript.snippets.iter().map(|s| s.text.as_str()));

        if text.is_empty() {
            tracing::warn!("Transcript for video {} was empty", entry.id);
            Ok(None)
        } else {
            tracing::info!("Fetched transcript for video: {}", entry.id);
            Ok(Some(text))
        }
    }

    fn source_name(&self) -> &'static str {
        "caption API"
    }
}
