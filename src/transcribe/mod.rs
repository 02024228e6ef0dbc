// Transcription backends
//
// Each backend runs an external speech-to-text tool and maps its JSON output into a
// `Transcription` through a `TranscriptionMapper`:
// - openai: the OpenAI whisper command line tool, reads media files directly
// - whisper_cpp: whisper.cpp `whisper-cli`, fed a 16 kHz mono WAV extracted with ffmpeg

pub mod common;
pub mod openai;
pub mod whisper_cpp;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub use common::TranscriptionMapper;
use crate::config::{TranscriberBackend, TranscriberConfig};
use crate::error::Result;
use crate::media::MediaProcessor;

/// One time-segmented piece of recognised speech, offsets in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Detected or requested language, when the tool reports one
    pub language: Option<String>,
    pub segments: Vec<TranscriptSegment>,
}

/// Speech-to-text over a whole media file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, media_path: &Path, language: Option<String>) -> Result<Transcription>;

    /// Name used in logs and error messages
    fn name(&self) -> &str;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the transcriber selected in the configuration
    pub fn create_transcriber(
        config: TranscriberConfig,
        media: Arc<dyn MediaProcessor>,
    ) -> Arc<dyn Transcriber> {
        match config.backend {
            TranscriberBackend::Whisper => Arc::new(openai::OpenAITranscriber::new(config)),
            TranscriberBackend::WhisperCpp => {
                Arc::new(whisper_cpp::WhisperCppTranscriber::new(config, media))
            }
        }
    }
}
