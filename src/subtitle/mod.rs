// Subtitle formats
//
// - srt: SubRip compose / parse, the working format of the pipeline
// - vtt: WebVTT compose and SubRip conversion, the format served to browsers

pub mod srt;
pub mod vtt;

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::{Result, SubtitlerError};
use crate::transcribe::Transcription;

/// One timed line of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub index: u64,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(index: u64, start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            text: text.into(),
        }
    }

    /// Same timing and index, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Build the entry sequence for a transcription, numbered from 1
    pub fn from_transcription(transcription: &Transcription) -> Vec<Self> {
        transcription
            .segments
            .iter()
            .enumerate()
            .map(|(i, segment)| Self {
                index: i as u64 + 1,
                start: seconds_to_duration(segment.start),
                end: seconds_to_duration(segment.end),
                text: segment.text.trim().to_string(),
            })
            .collect()
    }
}

/// Negative and non-finite offsets collapse to zero
fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or_default()
}

/// Format a duration as `HH:MM:SS<sep>mmm`
pub(crate) fn format_timestamp(time: Duration, separator: char) -> String {
    let total_milliseconds = time.as_millis();
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, millis)
}

/// Parse `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or `MM:SS.mmm`
pub(crate) fn parse_timestamp(value: &str) -> Result<Duration> {
    let invalid = || SubtitlerError::Subtitle(format!("Invalid timestamp '{}'", value));

    let (clock, fraction) = value
        .trim()
        .split_once([',', '.'])
        .ok_or_else(invalid)?;

    let parts = clock
        .split(':')
        .map(|p| p.parse::<u64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>>>()?;

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return Err(invalid()),
    };
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    // Scale to milliseconds regardless of how many digits were written
    let digits: String = fraction.chars().chain("000".chars()).take(3).collect();
    let millis: u64 = digits.parse().map_err(|_| invalid())?;

    let total = hours
        .checked_mul(3_600)
        .and_then(|s| s.checked_add(minutes * 60 + seconds))
        .and_then(|s| s.checked_mul(1_000))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(invalid)?;

    Ok(Duration::from_millis(total))
}

/// Compose `entries` as SubRip into `srt_path`, then convert that text to WebVTT into `vtt_path`
pub async fn write_subtitle_pair(
    entries: &[SubtitleEntry],
    srt_path: &Path,
    vtt_path: &Path,
) -> Result<()> {
    info!("Writing {} subtitle entries to {}", entries.len(), srt_path.display());

    let srt_content = srt::compose(entries);
    fs::write(srt_path, &srt_content).await?;

    let vtt_content = vtt::from_srt(&srt_content)?;
    fs::write(vtt_path, vtt_content).await?;

    info!("WebVTT written to {}", vtt_path.display());
    Ok(())
}

/// Read and parse a SubRip file
pub async fn read_srt(path: &Path) -> Result<Vec<SubtitleEntry>> {
    if !fs::try_exists(path).await? {
        return Err(SubtitlerError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).await?;
    srt::parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::TranscriptSegment;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Duration::ZERO, ','), "00:00:00,000");
        assert_eq!(format_timestamp(Duration::from_millis(65_123), ','), "00:01:05,123");
        assert_eq!(format_timestamp(Duration::from_millis(3_661_500), '.'), "01:01:01.500");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert_eq!(parse_timestamp("00:01:05,123").unwrap(), Duration::from_millis(65_123));
        assert_eq!(parse_timestamp("01:01:01.5").unwrap(), Duration::from_millis(3_661_500));
        assert_eq!(parse_timestamp("02:03.040").unwrap(), Duration::from_millis(123_040));
        assert!(parse_timestamp("00:61:00,000").is_err());
        assert!(parse_timestamp("00:00:01").is_err());
        assert!(parse_timestamp("aa:00:01,000").is_err());
        assert!(matches!(
            parse_timestamp("99999999999999999:00:00,000"),
            Err(SubtitlerError::Subtitle(_))
        ));
        assert_eq!(
            parse_timestamp("1000:00:00,000").unwrap(),
            Duration::from_secs(3_600_000)
        );
    }

    #[test]
    fn test_from_transcription_numbers_and_trims() {
        let transcription = Transcription {
            language: Some("en".to_string()),
            segments: vec![
                TranscriptSegment { start: 0.0, end: 1.5, text: "  Hello there. ".to_string() },
                TranscriptSegment { start: 1.5, end: 3.25, text: "General Kenobi!".to_string() },
                TranscriptSegment { start: -0.2, end: f64::NAN, text: "odd".to_string() },
            ],
        };

        let entries = SubtitleEntry::from_transcription(&transcription);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().map(|e| e.index).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(entries[0].text, "Hello there.");
        assert_eq!(entries[1].start, Duration::from_millis(1_500));
        assert_eq!(entries[1].end, Duration::from_millis(3_250));
        assert_eq!(entries[2].start, Duration::ZERO);
        assert_eq!(entries[2].end, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_write_pair_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let srt_path = dir.path().join("clip.srt");
        let vtt_path = dir.path().join("clip.vtt");
        let entries = vec![
            SubtitleEntry::new(1, Duration::ZERO, Duration::from_secs(2), "first"),
            SubtitleEntry::new(2, Duration::from_secs(2), Duration::from_secs(4), "second"),
        ];

        write_subtitle_pair(&entries, &srt_path, &vtt_path).await.unwrap();

        assert_eq!(read_srt(&srt_path).await.unwrap(), entries);
        let vtt = std::fs::read_to_string(&vtt_path).unwrap();
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:02.000 --> 00:00:04.000\nsecond"));
    }

    #[tokio::test]
    async fn test_read_missing_srt() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_srt(&dir.path().join("nope.srt")).await.unwrap_err();
        assert!(matches!(err, SubtitlerError::FileNotFound(_)));
    }
}
