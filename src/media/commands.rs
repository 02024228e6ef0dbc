use std::io::ErrorKind;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::{Result, SubtitlerError};

/// One ffmpeg invocation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl MediaCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `-i <path>` for every input, in order
    pub fn inputs(self, paths: &[&Path]) -> Self {
        let args: Vec<String> = paths.iter().flat_map(|p| ["-i".to_string(), path_arg(p)]).collect();
        self.args(args)
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    SubtitlerError::unavailable(&self.binary_path, e)
                }
                _ => SubtitlerError::Media(format!("Failed to execute media processor: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubtitlerError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Builder for common media processing operations
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Subtitle muxing: video copied, audio transcoded, subtitles as a text track
    pub fn mux_subtitles(
        &self,
        media_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
        media: &MediaConfig,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Subtitle muxing")
            .args(["-y"])
            .inputs(&[media_path, subtitle_path])
            .args(["-c:v", "copy", "-c:a", media.audio_codec.as_str()])
            .args(["-c:s", media.subtitle_codec.as_str(), "-strict", "experimental"])
            .args(media.extra_options.iter().cloned())
            .args([path_arg(output_path)])
    }

    /// 16 kHz mono PCM, the input whisper expects
    pub fn extract_audio(&self, media_path: &Path, audio_path: &Path) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .inputs(&[media_path])
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1", "-y"])
            .args([path_arg(audio_path)])
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").args(["-version"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_command_arguments() {
        let media = MediaConfig {
            extra_options: vec!["-movflags".to_string(), "+faststart".to_string()],
            ..MediaConfig::default()
        };
        let cmd = MediaCommandBuilder::new("ffmpeg").mux_subtitles(
            Path::new("in.mp4"),
            Path::new("subs.vtt"),
            Path::new("out.mp4"),
            &media,
        );

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec![
                "-y", "-i", "in.mp4", "-i", "subs.vtt", "-c:v", "copy", "-c:a", "aac",
                "-c:s", "mov_text", "-strict", "experimental", "-movflags", "+faststart",
                "out.mp4",
            ]
        );
    }

    #[test]
    fn test_extract_audio_arguments() {
        let cmd = MediaCommandBuilder::new("ffmpeg").extract_audio(Path::new("in.mkv"), Path::new("a.wav"));
        assert_eq!(
            cmd.args,
            vec!["-i", "in.mkv", "-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1", "-y", "a.wav"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let err = MediaCommandBuilder::new("definitely-not-a-real-ffmpeg")
            .version_check()
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, SubtitlerError::CollaboratorUnavailable { .. }));
    }
}
