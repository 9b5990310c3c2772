use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Sample rate whisper models expect
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// A loaded Whisper model ready to transcribe audio.
///
/// Loading the model is expensive; the engine is created once and shared
/// across videos. All methods here are blocking and must be called from
/// `spawn_blocking` in async contexts.
pub struct WhisperEngine {
    ctx: WhisperContext,
    language: Option<String>,
    threads: i32,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("language", &self.language)
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}

impl WhisperEngine {
    /// Load a whisper.cpp ggml model from disk
    pub fn load(model_path: &Path, language: Option<String>, threads: Option<usize>) -> Result<Self> {
        tracing::info!("Loading whisper model: {}", model_path.display());

        let ctx = WhisperContext::new_with_params(
            &model_path.to_string_lossy(),
            WhisperContextParameters::default(),
        )
        .with_context(|| format!("Failed to load whisper model from {}", model_path.display()))?;

        let threads = threads
            .map(|t| t as i32)
            .unwrap_or_else(|| num_cpus::get() as i32);

        Ok(Self {
            ctx,
            language,
            threads,
        })
    }

    /// Transcribe a 16 kHz mono WAV file
    pub fn transcribe_wav(&self, path: &Path) -> Result<String> {
        let samples = read_wav_samples(path)?;
        self.transcribe_samples(&samples)
    }

    /// Run inference over normalized f32 samples and join the segment texts
    pub fn transcribe_samples(&self, samples: &[f32]) -> Result<String> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.threads);
        params.set_language(self.language.as_deref());
        params.set_no_context(true);
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .ctx
            .create_state()
            .context("Failed to create whisper state")?;

        state
            .full(params, samples)
            .context("Whisper inference failed")?;

        let num_segments = state
            .full_n_segments()
            .context("Failed to get whisper segment count")?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state
                .full_get_segment_text_lossy(i)
                .context("Failed to read whisper segment text")?;
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(segment);
        }

        Ok(text)
    }
}

/// Read a WAV file into mono f32 samples normalized to [-1.0, 1.0].
///
/// The audio downloader already resamples to 16 kHz mono, so anything else
/// here is a bug in the extraction step and is rejected outright.
pub fn read_wav_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        anyhow::bail!(
            "Expected mono WAV (1 channel), got {} channels",
            spec.channels
        );
    }

    if spec.sample_rate != TARGET_SAMPLE_RATE {
        anyhow::bail!(
            "Expected {} Hz sample rate, got {} Hz",
            TARGET_SAMPLE_RATE,
            spec.sample_rate
        );
    }

    let mut samples = Vec::with_capacity(reader.len() as usize);
    for sample in reader.samples::<i16>() {
        let pcm = sample?;
        samples.push(pcm as f32 / i16::MAX as f32);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_test_wav(path: &Path, channels: u16, sample_rate: u32) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..(channels as usize * 100) {
            writer.write_sample(i16::MAX / 2).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_wav_samples_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.wav");
        write_test_wav(&path, 1, TARGET_SAMPLE_RATE);

        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples.len(), 100);
        assert!(samples.iter().all(|s| (*s - 0.5).abs() < 0.01));
    }

    #[test]
    fn test_read_wav_samples_rejects_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_test_wav(&path, 2, TARGET_SAMPLE_RATE);

        assert!(read_wav_samples(&path).is_err());
    }

    #[test]
    fn test_read_wav_samples_rejects_wrong_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate.wav");
        write_test_wav(&path, 1, 44_100);

        assert!(read_wav_samples(&path).is_err());
    }
}
