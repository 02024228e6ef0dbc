// Media processing
//
// - commands: ffmpeg command builder and execution
// - processor: the ffmpeg-backed `MediaProcessor`

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Embed `subtitle_path` as a selectable text track of `output_path`
    async fn mux_subtitles(
        &self,
        media_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Extract a 16 kHz mono PCM WAV for speech recognition
    async fn extract_audio(&self, media_path: &Path, audio_path: &Path) -> Result<()>;

    /// Check if the media tool can be run
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Arc<dyn MediaProcessor> {
        Arc::new(processor::FfmpegProcessor::new(config))
    }
}
