use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default prefix for generated Markdown file names
pub const DEFAULT_FILE_PREFIX: &str = "yt_video_text_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,

    /// Transcript API settings
    pub transcript: TranscriptConfig,

    /// Local Whisper settings for the audio fallback
    pub whisper: WhisperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory Markdown files are written to
    pub output_dir: PathBuf,

    /// Prefix for generated Markdown file names
    pub file_prefix: String,

    /// Directory for intermediate audio files (temporary directory when unset)
    pub audio_dir: Option<PathBuf>,

    /// Keep audio files after transcription
    pub keep_audio: bool,

    /// Maximum number of videos processed concurrently
    pub max_concurrent_jobs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Preferred transcript languages, in priority order
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperConfig {
    /// Named whisper.cpp model ("tiny", "base", "small.en", ...)
    pub model: String,

    /// Explicit model file path, overrides the named model
    pub model_path: Option<PathBuf>,

    /// Language hint for transcription (auto-detect when unset)
    pub language: Option<String>,

    /// Worker threads for inference (defaults to the CPU count)
    pub threads: Option<usize>,
}

/// English transcript variants the original dataset of videos mostly uses.
pub fn default_languages() -> Vec<String> {
    [
        "en", "en-US", "en-GB", "en-CA", "en-AU", "en-NZ", "en-IE", "en-IN", "en-PH", "en-ZA",
        "en-SG", "en-MY", "en-TT", "en-BZ",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                output_dir: PathBuf::from("."),
                file_prefix: DEFAULT_FILE_PREFIX.to_string(),
                audio_dir: None,
                keep_audio: false,
                max_concurrent_jobs: 4,
            },
            transcript: TranscriptConfig {
                languages: default_languages(),
            },
            whisper: WhisperConfig {
                model: "base".to_string(),
                model_path: None,
                language: None,
                threads: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content =
                fs_err::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config =
                serde_yaml::from_str(&content).context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("yt2md").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.app.max_concurrent_jobs == 0 {
            anyhow::bail!("max_concurrent_jobs must be at least 1");
        }

        if self.app.file_prefix.is_empty() {
            anyhow::bail!("file_prefix must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Output Directory: {}", self.app.output_dir.display());
        println!("  File Prefix: {}", self.app.file_prefix);
        match &self.app.audio_dir {
            Some(dir) => println!("  Audio Directory: {}", dir.display()),
            None => println!("  Audio Directory: (temporary)"),
        }
        println!("  Keep Audio: {}", self.app.keep_audio);
        println!("  Max Concurrent Jobs: {}", self.app.max_concurrent_jobs);
        println!("  Transcript Languages: {}", self.transcript.languages.join(", "));
        println!("  Whisper Model: {}", self.whisper.model);
        if let Some(path) = &self.whisper.model_path {
            println!("  Whisper Model Path: {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.app.file_prefix, DEFAULT_FILE_PREFIX);
        assert_eq!(config.app.max_concurrent_jobs, 4);
        assert_eq!(config.whisper.model, "base");
    }

    #[test]
    fn test_default_languages_prefer_plain_english() {
        let languages = default_languages();
        assert_eq!(languages[0], "en");
        assert!(languages.contains(&"en-GB".to_string()));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let mut config = Config::default();
        config.app.max_concurrent_jobs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.app.file_prefix, config.app.file_prefix);
        assert_eq!(parsed.transcript.languages, config.transcript.languages);
    }
}
