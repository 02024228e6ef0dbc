//! WebVTT (`.vtt`) composer.

use super::{format_timestamp, srt, SubtitleEntry};
use crate::error::Result;

/// Compose entries into WebVTT text. Cues carry no identifiers.
pub fn compose(entries: &[SubtitleEntry]) -> String {
    let mut vtt_content = String::from("WEBVTT\n\n");

    for entry in entries {
        let text = entry
            .text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        vtt_content.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_timestamp(entry.start, '.'),
            format_timestamp(entry.end, '.'),
            text
        ));
    }

    vtt_content
}

/// Convert SubRip text to WebVTT text
pub fn from_srt(srt_content: &str) -> Result<String> {
    let entries = srt::parse(srt_content)?;
    Ok(compose(&entries))
}
