use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Body written when neither acquisition path produced any text
pub const NO_CONTENT_PLACEHOLDER: &str = "No content available.";

/// File name for a video's Markdown output, e.g. ("yt_video_text_", 3) ->
/// "yt_video_text_3.md". The prefix is sanitized so user-supplied values
/// cannot escape the output directory.
pub fn file_name(prefix: &str, ordinal: usize) -> String {
    format!("{}{}.md", crate::utils::sanitize_filename(prefix), ordinal)
}

/// Render the Markdown document: a title heading followed by the transcript
/// text, or the placeholder body when there is none.
pub fn render(title: &str, body: Option<&str>) -> String {
    let body = match body {
        Some(text) if !text.trim().is_empty() => text.trim(),
        _ => NO_CONTENT_PLACEHOLDER,
    };

    format!("# {}\n\n{}\n", title, body)
}

/// Write a video's Markdown file.
///
/// The content is staged in a temporary file in the target directory and
/// renamed into place, so a crashed run never leaves a file that looks
/// complete.
pub async fn write_markdown(path: &Path, title: &str, body: Option<&str>) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs_err::create_dir_all(parent)?;
    }

    let content = render(title, body);
    let dir = parent.unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
