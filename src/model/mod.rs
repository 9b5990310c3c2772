use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::WhisperConfig;
use crate::utils::format_file_size;
use crate::Yt2mdError;

/// whisper.cpp checkpoint mirror on Hugging Face
const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Known whisper.cpp ggml model names
pub const KNOWN_MODELS: &[&str] = &[
    "tiny",
    "tiny.en",
    "base",
    "base.en",
    "small",
    "small.en",
    "medium",
    "medium.en",
    "large-v3",
    "large-v3-turbo",
];

/// File name for a named model, e.g. "base" -> "ggml-base.bin"
pub fn model_file_name(name: &str) -> String {
    format!("ggml-{}.bin", name)
}

/// Download URL for a named model
pub fn model_url(name: &str) -> String {
    format!("{}/{}", MODEL_BASE_URL, model_file_name(name))
}

/// Directory models are installed into
pub fn models_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data_dir.join("yt2md").join("models"))
}

/// Install path for a named model
pub fn model_path(name: &str) -> Result<PathBuf> {
    Ok(models_dir()?.join(model_file_name(name)))
}

/// Resolve the model file the audio fallback should use.
///
/// Precedence: CLI `--model` path, then the configured `model_path`, then
/// the install path of the configured model name. The file's existence is
/// checked lazily by the transcriber, not here.
pub fn resolve_model(config: &WhisperConfig, override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = &config.model_path {
        return Ok(path.clone());
    }

    model_path(&config.model)
}

/// Download a named model into the models directory, streaming with a
/// progress bar. Returns the install path.
pub async fn download_model(name: &str, quiet: bool) -> Result<PathBuf> {
    if !KNOWN_MODELS.contains(&name) {
        anyhow::bail!(
            "Unknown model \"{}\". Known models: {}",
            name,
            KNOWN_MODELS.join(", ")
        );
    }

    let path = model_path(name)?;
    if path.exists() {
        tracing::info!("Model {} is already installed at {}", name, path.display());
        println!("Model already installed: {}", path.display());
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }

    let url = model_url(name);
    tracing::info!("Downloading model {} from {}", name, url);

    let response = reqwest::get(&url).await?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to download model: HTTP {}", response.status());
    }

    let total_size = response.content_length().unwrap_or(0);
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total_size)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap(),
    );
    progress.set_message(format!("Downloading {}...", model_file_name(name)));

    // Download to a partial file first so an interrupted run never leaves a
    // truncated model behind.
    let partial_path = path.with_extension("bin.part");
    let mut file = fs_err::File::create(&partial_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress.set_position(downloaded);
    }

    drop(file);
    fs_err::rename(&partial_path, &path)
        .map_err(|e| Yt2mdError::FileError(e.to_string()))?;

    progress.finish_with_message("Download complete");

    Ok(path)
}

/// Print the known models and their install state
pub fn list_models() -> Result<()> {
    let dir = models_dir()?;
    println!("Known models (installed under {}):", dir.display());

    for name in KNOWN_MODELS {
        let path = dir.join(model_file_name(name));
        match fs_err::metadata(&path) {
            Ok(meta) => println!("  • {} ({})", name, format_file_size(meta.len())),
            Err(_) => println!("  • {} (not installed)", name),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_file_name() {
        assert_eq!(model_file_name("base"), "ggml-base.bin");
        assert_eq!(model_file_name("small.en"), "ggml-small.en.bin");
    }

    #[test]
    fn test_model_url() {
        assert_eq!(
            model_url("tiny"),
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin"
        );
    }

    #[test]
    fn test_resolve_model_precedence() {
        let config = WhisperConfig {
            model: "base".to_string(),
            model_path: Some(PathBuf::from("/models/custom.bin")),
            language: None,
            threads: None,
        };

        let override_path = PathBuf::from("/tmp/override.bin");
        assert_eq!(
            resolve_model(&config, Some(&override_path)).unwrap(),
            override_path
        );

        assert_eq!(
            resolve_model(&config, None).unwrap(),
            PathBuf::from("/models/custom.bin")
        );

        let named_only = WhisperConfig {
            model: "base".to_string(),
            model_path: None,
            language: None,
            threads: None,
        };
        let resolved = resolve_model(&named_only, None).unwrap();
        assert!(resolved.ends_with("ggml-base.bin"));
    }
}
