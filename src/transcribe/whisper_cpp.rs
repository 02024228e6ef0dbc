// whisper.cpp implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::info;

use super::common::{run_tool, TranscriptionMapper};
use super::{TranscriptSegment, Transcriber, Transcription};
use crate::config::TranscriberConfig;
use crate::error::{Result, SubtitlerError};
use crate::media::MediaProcessor;

// Structs for parsing whisper.cpp `-oj` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: WhisperCppResult,
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub offsets: WhisperCppOffsets,
    pub text: String,
}

/// Offsets in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: i64,
    pub to: i64,
}

pub struct WhisperCppMapper;

impl TranscriptionMapper<WhisperCppOutput> for WhisperCppMapper {
    fn to_transcription(whisper_output: WhisperCppOutput) -> Result<Transcription> {
        let segments = whisper_output
            .transcription
            .into_iter()
            .map(|seg| TranscriptSegment {
                start: seg.offsets.from as f64 / 1000.0, // Convert ms to seconds
                end: seg.offsets.to as f64 / 1000.0,
                text: seg.text,
            })
            .collect();

        Ok(Transcription {
            language: Some(whisper_output.result.language),
            segments,
        })
    }
}

pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
    media: Arc<dyn MediaProcessor>,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig, media: Arc<dyn MediaProcessor>) -> Self {
        Self { config, media }
    }

    /// Resolve a model name like `base` to `models/ggml-base.bin`; paths pass through
    fn resolve_model_path(&self) -> PathBuf {
        let model = &self.config.model;
        if model.contains('/') || model.ends_with(".bin") {
            return PathBuf::from(model);
        }
        PathBuf::from("models").join(format!("ggml-{}.bin", model))
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, media_path: &Path, language: Option<String>) -> Result<Transcription> {
        let model_path = self.resolve_model_path();
        info!("Transcribing {} with whisper.cpp model {}", media_path.display(), model_path.display());

        if !tokio::fs::try_exists(&model_path).await? {
            return Err(SubtitlerError::unavailable(
                self.name(),
                format!("model file {} does not exist", model_path.display()),
            ));
        }

        let temp_dir = tempfile::tempdir()?;
        let audio_path = temp_dir.path().join("audio.wav");
        let output_prefix = temp_dir.path().join("transcript");

        self.media.extract_audio(media_path, &audio_path).await?;

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg("-m").arg(&model_path)
            .arg("-f").arg(&audio_path)
            .arg("-oj")
            .arg("-of").arg(&output_prefix)
            .arg("-l").arg(language.as_deref().unwrap_or("auto"));

        run_tool(cmd, self.name()).await?;

        let json_content = tokio::fs::read_to_string(output_prefix.with_extension("json"))
            .await
            .map_err(|e| SubtitlerError::Transcription(format!("Failed to read whisper.cpp output: {}", e)))?;

        let whisper_output: WhisperCppOutput = serde_json::from_str(&json_content)
            .map_err(|e| SubtitlerError::Transcription(format!("Failed to parse whisper.cpp JSON: {}", e)))?;

        let transcription = WhisperCppMapper::to_transcription(whisper_output)?;
        info!("whisper.cpp returned {} segments", transcription.segments.len());
        Ok(transcription)
    }

    fn name(&self) -> &str {
        "whisper-cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranscriberBackend;
    use crate::media::MockMediaProcessor;

    fn config(model: &str) -> TranscriberConfig {
        TranscriberConfig {
            backend: TranscriberBackend::WhisperCpp,
            binary_path: "whisper-cli".to_string(),
            model: model.to_string(),
            language: None,
        }
    }

    #[test]
    fn test_mapper_converts_millisecond_offsets() {
        let output: WhisperCppOutput = serde_json::from_str(
            r#"{
                "result": {"language": "en"},
                "transcription": [
                    {"timestamps": {"from": "00:00:00,000", "to": "00:00:01,500"}, "offsets": {"from": 0, "to": 1500}, "text": " Hi"},
                    {"timestamps": {"from": "00:00:01,500", "to": "00:00:04,020"}, "offsets": {"from": 1500, "to": 4020}, "text": " there"}
                ]
            }"#,
        )
        .unwrap();

        let transcription = WhisperCppMapper::to_transcription(output).unwrap();

        assert_eq!(transcription.language.as_deref(), Some("en"));
        assert_eq!(transcription.segments[0].end, 1.5);
        assert_eq!(transcription.segments[1].end, 4.02);
    }

    #[test]
    fn test_resolve_model_path() {
        let media = Arc::new(MockMediaProcessor::new());
        assert_eq!(
            WhisperCppTranscriber::new(config("base"), media.clone()).resolve_model_path(),
            PathBuf::from("models/ggml-base.bin")
        );
        assert_eq!(
            WhisperCppTranscriber::new(config("/opt/ggml-large.bin"), media).resolve_model_path(),
            PathBuf::from("/opt/ggml-large.bin")
        );
    }

    #[tokio::test]
    async fn test_missing_model_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("ggml-missing.bin");
        let transcriber = WhisperCppTranscriber::new(
            config(&model.to_string_lossy()),
            Arc::new(MockMediaProcessor::new()),
        );

        let err = transcriber
            .transcribe(Path::new("video.mp4"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubtitlerError::CollaboratorUnavailable { .. }));
    }
}
