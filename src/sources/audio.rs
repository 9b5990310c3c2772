use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::TextSource;
use crate::playlist::VideoEntry;
use crate::whisper::WhisperEngine;
use crate::{Result, Yt2mdError};

/// Audio-transcription fallback: download the video's audio with yt-dlp and
/// run it through a local Whisper model.
pub struct AudioTranscriber {
    yt_dlp_path: String,
    audio_dir: PathBuf,
    keep_audio: bool,
    model_name: String,
    model_path: PathBuf,
    language: Option<String>,
    threads: Option<usize>,
    engine: OnceCell<Arc<WhisperEngine>>,
    // Owns the default audio directory for the lifetime of the transcriber
    _temp_dir: Option<TempDir>,
}

impl AudioTranscriber {
    /// Create a transcriber writing intermediate audio under `audio_dir`,
    /// or a private temporary directory when none is given.
    ///
    /// The Whisper model is loaded lazily on first use, so transcript-only
    /// runs never pay for it.
    pub fn new(
        audio_dir: Option<PathBuf>,
        keep_audio: bool,
        model_name: String,
        model_path: PathBuf,
        language: Option<String>,
        threads: Option<usize>,
    ) -> Result<Self> {
        let (audio_dir, temp_dir) = match audio_dir {
            Some(dir) => {
                fs_err::create_dir_all(&dir)?;
                (dir, None)
            }
            None => {
                let temp = TempDir::new().context("Failed to create temporary audio directory")?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        Ok(Self {
            yt_dlp_path: "yt-dlp".to_string(),
            audio_dir,
            keep_audio,
            model_name,
            model_path,
            language,
            threads,
            engine: OnceCell::new(),
            _temp_dir: temp_dir,
        })
    }

    /// Get the shared Whisper engine, loading the model on first call
    async fn engine(&self) -> Result<Arc<WhisperEngine>> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                if !self.model_path.exists() {
                    return Err(Yt2mdError::ModelMissing {
                        name: self.model_name.clone(),
                        path: self.model_path.clone(),
                    }
                    .into());
                }

                let model_path = self.model_path.clone();
                let language = self.language.clone();
                let threads = self.threads;

                let engine = tokio::task::spawn_blocking(move || {
                    WhisperEngine::load(&model_path, language, threads)
                })
                .await
                .context("Whisper model load task panicked")??;

                Ok::<_, anyhow::Error>(Arc::new(engine))
            })
            .await?;

        Ok(engine.clone())
    }

    /// Download the video's audio as 16 kHz mono WAV, ready for Whisper.
    pub async fn download_audio(&self, video_id: &str) -> Result<PathBuf> {
        let audio_path = self.audio_dir.join(format!("{}_audio.wav", video_id));
        let output_template = self
            .audio_dir
            .join(format!("{}_audio.%(ext)s", video_id))
            .to_string_lossy()
            .into_owned();
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        tracing::debug!("Downloading audio for video: {}", video_id);

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &output_template,
                "--extract-audio",
                "--audio-format",
                "wav",
                // Whisper wants 16 kHz mono
                "--postprocessor-args",
                "ffmpeg:-ar 16000 -ac 1",
                "--format",
                "bestaudio/best",
                "--no-playlist",
                "--newline",
                &url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(Yt2mdError::AudioExtractionFailed(error.into_owned()).into());
        }

        if !audio_path.exists() {
            return Err(Yt2mdError::AudioExtractionFailed(format!(
                "yt-dlp did not produce {}",
                audio_path.display()
            ))
            .into());
        }

        tracing::info!("Audio downloaded: {}", audio_path.display());

        Ok(audio_path)
    }

    fn cleanup_audio(&self, path: &Path) {
        if self.keep_audio {
            return;
        }
        if let Err(e) = fs_err::remove_file(path) {
            tracing::warn!("Could not remove audio file {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl TextSource for AudioTranscriber {
    async fn fetch_text(&self, entry: &VideoEntry) -> Result<Option<String>> {
        let engine = self.engine().await?;
        let audio_path = self.download_audio(&entry.id).await?;

        tracing::info!("Transcribing audio for video: {}", entry.id);

        let task_path = audio_path.clone();
        let joined = tokio::task::spawn_blocking(move || engine.transcribe_wav(&task_path)).await;

        // Clean up before propagating so a panicked task doesn't leak the WAV
        self.cleanup_audio(&audio_path);

        let result = joined.context("Transcription task panicked")?;
        let text = result.map_err(|e| Yt2mdError::TranscriptionFailed(format!("{:#}", e)))?;

        if text.is_empty() {
            tracing::warn!("Whisper produced no text for video {}", entry.id);
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn source_name(&self) -> &'static str {
        "audio transcription"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcriber(audio_dir: Option<PathBuf>, keep_audio: bool) -> AudioTranscriber {
        AudioTranscriber::new(
            audio_dir,
            keep_audio,
            "base".to_string(),
            PathBuf::from("/nonexistent/ggml-base.bin"),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_cleanup_audio_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let transcriber = transcriber(Some(dir.path().to_path_buf()), false);

        let wav = dir.path().join("abc12345678_audio.wav");
        fs_err::write(&wav, b"data").unwrap();

        transcriber.cleanup_audio(&wav);
        assert!(!wav.exists());
    }

    #[test]
    fn test_cleanup_audio_honors_keep_audio() {
        let dir = tempfile::tempdir().unwrap();
        let transcriber = transcriber(Some(dir.path().to_path_buf()), true);

        let wav = dir.path().join("abc12345678_audio.wav");
        fs_err::write(&wav, b"data").unwrap();

        transcriber.cleanup_audio(&wav);
        assert!(wav.exists());
    }

    #[tokio::test]
    async fn test_missing_model_is_an_actionable_error() {
        let transcriber = transcriber(None, false);

        let err = transcriber.engine().await.unwrap_err();
        assert!(err.to_string().contains("model --download"));
    }
}
