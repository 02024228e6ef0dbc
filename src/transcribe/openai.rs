// OpenAI Whisper command line implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

use super::common::{run_tool, TranscriptionMapper};
use super::{TranscriptSegment, Transcriber, Transcription};
use crate::config::TranscriberConfig;
use crate::error::{Result, SubtitlerError};

/// OpenAI Whisper specific JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperOutput {
    pub text: String,
    pub segments: Vec<OpenAIWhisperSegment>,
    pub language: Option<String>,
}

/// OpenAI Whisper specific segment format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperSegment {
    pub id: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub avg_logprob: Option<f64>,
    pub no_speech_prob: Option<f64>,
}

/// Mapper for OpenAI Whisper format
pub struct OpenAIWhisperMapper;

impl TranscriptionMapper<OpenAIWhisperOutput> for OpenAIWhisperMapper {
    fn to_transcription(whisper_output: OpenAIWhisperOutput) -> Result<Transcription> {
        let segments = whisper_output
            .segments
            .into_iter()
            .map(|seg| TranscriptSegment {
                start: seg.start,
                end: seg.end,
                text: seg.text,
            })
            .collect();

        Ok(Transcription {
            language: whisper_output.language,
            segments,
        })
    }
}

pub struct OpenAITranscriber {
    config: TranscriberConfig,
}

impl OpenAITranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, media_path: &Path, language: Option<String>) -> Result<Transcription> {
        info!("Transcribing {} with whisper model {}", media_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(media_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_dir").arg(output_dir)
            .arg("--output_format").arg("json")
            .arg("--verbose").arg("False");

        if let Some(lang) = language {
            cmd.arg("--language").arg(lang);
        }

        run_tool(cmd, self.name()).await?;

        let media_stem = media_path
            .file_stem()
            .ok_or_else(|| SubtitlerError::InvalidInput(format!("Invalid media filename: {}", media_path.display())))?;
        let json_file = output_dir.join(format!("{}.json", media_stem.to_string_lossy()));

        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| SubtitlerError::Transcription(format!("Failed to read whisper output: {}", e)))?;

        let whisper_output: OpenAIWhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| SubtitlerError::Transcription(format!("Failed to parse whisper JSON: {}", e)))?;

        let transcription = OpenAIWhisperMapper::to_transcription(whisper_output)?;
        info!("Whisper returned {} segments", transcription.segments.len());
        Ok(transcription)
    }

    fn name(&self) -> &str {
        "whisper"
    }
}
