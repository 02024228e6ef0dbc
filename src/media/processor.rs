use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use super::{MediaCommandBuilder, MediaProcessor};
use crate::config::MediaConfig;
use crate::error::Result;

/// Concrete implementation of media processor (FFmpeg-based)
pub struct FfmpegProcessor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn mux_subtitles(
        &self,
        media_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Muxing subtitles from {} into {} -> {}",
            subtitle_path.display(),
            media_path.display(),
            output_path.display()
        );

        let command = self
            .command_builder
            .mux_subtitles(media_path, subtitle_path, output_path, &self.config);

        command.execute().await?;

        info!("Subtitle muxing completed successfully");
        Ok(())
    }

    async fn extract_audio(&self, media_path: &Path, audio_path: &Path) -> Result<()> {
        info!("Extracting audio from {} to {}", media_path.display(), audio_path.display());

        let command = self.command_builder.extract_audio(media_path, audio_path);
        command.execute().await?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder.version_check().execute().await?;
        info!("Media processor is available");
        Ok(())
    }
}
