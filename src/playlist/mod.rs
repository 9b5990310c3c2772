use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use url::Url;

use crate::{Result, Yt2mdError};

/// One video resolved from the input URL, in playlist order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    /// YouTube video id (the 11-character watch id)
    pub id: String,

    /// Video title, falls back to the id when unavailable
    pub title: String,

    /// 1-based position in the playlist (1 for a single video)
    pub ordinal: usize,
}

/// What kind of YouTube URL the user gave us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlKind {
    /// A single video with its id
    Video(String),
    /// A playlist page to be expanded
    Playlist,
}

/// Classify a YouTube URL as a single video or a playlist.
///
/// Watch URLs that also carry a `list` parameter are treated as single
/// videos; only dedicated `/playlist` pages are expanded.
pub fn classify_url(raw: &str) -> Result<UrlKind> {
    let parsed =
        Url::parse(raw).map_err(|_| Yt2mdError::UnsupportedUrl(raw.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Yt2mdError::UnsupportedUrl(raw.to_string()).into());
    }

    let host = parsed.host_str().unwrap_or("");
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    if host == "youtu.be" {
        if let Some(id) = parsed.path_segments().and_then(|mut s| s.next()) {
            if !id.is_empty() {
                return Ok(UrlKind::Video(id.to_string()));
            }
        }
        return Err(Yt2mdError::UnsupportedUrl(raw.to_string()).into());
    }

    if host != "youtube.com" {
        return Err(Yt2mdError::UnsupportedUrl(raw.to_string()).into());
    }

    match parsed.path() {
        "/playlist" => {
            if parsed.query_pairs().any(|(k, _)| k == "list") {
                Ok(UrlKind::Playlist)
            } else {
                Err(Yt2mdError::UnsupportedUrl(raw.to_string()).into())
            }
        }
        "/watch" => parsed
            .query_pairs()
            .find(|(k, v)| k == "v" && !v.is_empty())
            .map(|(_, v)| UrlKind::Video(v.into_owned()))
            .ok_or_else(|| Yt2mdError::UnsupportedUrl(raw.to_string()).into()),
        path => {
            if let Some(id) = path.strip_prefix("/shorts/") {
                let id = id.trim_end_matches('/');
                if !id.is_empty() {
                    return Ok(UrlKind::Video(id.to_string()));
                }
            }
            Err(Yt2mdError::UnsupportedUrl(raw.to_string()).into())
        }
    }
}

/// Flat-playlist entry as emitted by `yt-dlp --flat-playlist --dump-json`
#[derive(Debug, Deserialize)]
struct FlatEntry {
    id: String,
    title: Option<String>,
}

/// Resolves a video or playlist URL into its videos using yt-dlp
pub struct VideoResolver {
    yt_dlp_path: String,
}

impl VideoResolver {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Resolve the URL into a list of videos with stable ordinals.
    pub async fn resolve(&self, url: &str) -> Result<Vec<VideoEntry>> {
        let entries = match classify_url(url)? {
            UrlKind::Playlist => self.expand_playlist(url).await?,
            UrlKind::Video(id) => {
                let title = match self.fetch_title(url).await {
                    Ok(title) => title,
                    Err(e) => {
                        tracing::warn!("Could not fetch title for {}: {:#}", id, e);
                        id.clone()
                    }
                };
                vec![VideoEntry {
                    id,
                    title,
                    ordinal: 1,
                }]
            }
        };

        if entries.is_empty() {
            return Err(Yt2mdError::PlaylistEmpty(url.to_string()).into());
        }

        Ok(entries)
    }

    /// Expand a playlist URL into its videos, preserving playlist order.
    async fn expand_playlist(&self, url: &str) -> Result<Vec<VideoEntry>> {
        tracing::debug!("Expanding playlist: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--flat-playlist", "--dump-json", "--ignore-errors", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed to expand playlist: {}", error);
        }

        Ok(parse_flat_entries(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Get a single video's title using yt-dlp
    async fn fetch_title(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        let info: serde_json::Value = serde_json::from_str(&String::from_utf8(output.stdout)?)?;

        info["title"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("yt-dlp output contained no title"))
    }
}

/// Parse `--flat-playlist --dump-json` output (one JSON object per line,
/// one line per video) into entries with 1-based ordinals in playlist
/// order. Unparsable lines are skipped without shifting later ordinals;
/// a missing title falls back to the video id.
fn parse_flat_entries(stdout: &str) -> Vec<VideoEntry> {
    let mut entries = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let flat: FlatEntry = match serde_json::from_str(line) {
            Ok(flat) => flat,
            Err(e) => {
                tracing::warn!("Skipping unparsable playlist entry: {}", e);
                continue;
            }
        };
        let title = flat.title.unwrap_or_else(|| flat.id.clone());
        entries.push(VideoEntry {
            id: flat.id,
            title,
            ordinal: entries.len() + 1,
        });
    }
    entries
}

impl Default for VideoResolver {
    fn default() -> Self {
        Self::new()
    }
}
