use async_trait::async_trait;

pub mod audio;
pub mod captions;

use crate::playlist::VideoEntry;
use crate::Result;

/// A way of producing transcript text for a video.
///
/// The pipeline walks its sources in priority order (caption API first,
/// audio transcription second) and takes the first text produced. `Ok(None)`
/// means the source had nothing for this video and the next source should be
/// tried; `Err` means the source was expected to work but could not.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Fetch transcript text for the given video, if this source has any
    async fn fetch_text(&self, entry: &VideoEntry) -> Result<Option<String>>;

    /// Human-readable name of this source, used in logs and summaries
    fn source_name(&self) -> &'static str;
}

/// Join text fragments into a single block, separated by single spaces.
pub(crate) fn join_fragments<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_fragments() {
        let parts = ["hello", " world ", "", "  again"];
        assert_eq!(
            join_fragments(parts.iter().copied()),
            "hello world again"
        );
    }

    #[test]
    fn test_join_fragments_empty() {
        assert_eq!(join_fragments(std::iter::empty::<&str>()), "");
        assert_eq!(join_fragments(["", "   "].iter().copied()), "");
    }
}
