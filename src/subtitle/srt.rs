//! SubRip (`.srt`) composer and parser.

use super::{format_timestamp, parse_timestamp, SubtitleEntry};
use crate::error::{Result, SubtitlerError};

/// Compose entries into SubRip text.
///
/// Blank lines inside an entry's text would end the block early, so they are dropped.
pub fn compose(entries: &[SubtitleEntry]) -> String {
    let mut srt_content = String::new();

    for entry in entries {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            entry.index,
            format_timestamp(entry.start, ','),
            format_timestamp(entry.end, ','),
            legal_text(&entry.text)
        ));
    }

    srt_content
}

fn legal_text(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse SubRip text into entries, preserving indices and order as written.
pub fn parse(content: &str) -> Result<Vec<SubtitleEntry>> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut lines = content.lines().peekable();
    let mut entries = Vec::new();

    loop {
        while lines.peek().is_some_and(|line| line.trim().is_empty()) {
            lines.next();
        }
        let Some(index_line) = lines.next() else {
            break;
        };

        let index = index_line.trim().parse::<u64>().map_err(|_| {
            SubtitlerError::Subtitle(format!("Expected a cue number, found '{}'", index_line))
        })?;

        let timing_line = lines.next().ok_or_else(|| {
            SubtitlerError::Subtitle(format!("Cue {} has no timing line", index))
        })?;
        let (start, end) = parse_timing(timing_line)?;

        let mut text_lines = Vec::new();
        while let Some(line) = lines.next_if(|line| !line.trim().is_empty()) {
            text_lines.push(line);
        }

        entries.push(SubtitleEntry {
            index,
            start,
            end,
            text: text_lines.join("\n"),
        });
    }

    Ok(entries)
}

/// `00:00:01,000 --> 00:00:02,500`, optionally followed by position settings
pub(super) fn parse_timing(line: &str) -> Result<(std::time::Duration, std::time::Duration)> {
    let (start, rest) = line.split_once("-->").ok_or_else(|| {
        SubtitlerError::Subtitle(format!("Expected a timing line, found '{}'", line))
    })?;
    let end = rest.split_whitespace().next().ok_or_else(|| {
        SubtitlerError::Subtitle(format!("Timing line '{}' has no end time", line))
    })?;

    Ok((parse_timestamp(start)?, parse_timestamp(end)?))
}
