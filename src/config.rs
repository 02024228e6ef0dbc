use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SubtitlerError};

fn default_source_language() -> String {
    "en".to_string()
}

fn default_entry_delay_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    pub host: String,
    pub port: u16,
    /// Flat directory holding uploads and every generated artifact
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in megabytes
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Which whisper front-end to run
    pub backend: TranscriberBackend,
    /// Path to the transcriber binary (`whisper` or `whisper-cli`)
    pub binary_path: String,
    /// Model name for the whisper CLI, or path to a ggml model for whisper.cpp
    pub model: String,
    /// Spoken language hint; auto-detected when absent
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriberBackend {
    /// OpenAI whisper command line tool, reads media files directly
    Whisper,
    /// whisper.cpp `whisper-cli`, needs audio extracted to 16 kHz WAV first
    WhisperCpp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    pub backend: TranslatorBackend,
    /// Base URL of the translation service
    pub endpoint: String,
    /// LLM model, only used by the Ollama backend
    pub model: String,
    /// API key, only used by the LibreTranslate backend
    pub api_key: Option<String>,
    /// Language the transcripts are assumed to be in
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Pause between two entries to stay under the service's rate limits
    #[serde(default = "default_entry_delay_ms")]
    pub entry_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslatorBackend {
    /// Ollama `/api/generate` with a JSON-format prompt
    Ollama,
    /// LibreTranslate `/translate`
    Libre,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Codec the audio stream is transcoded to when muxing
    pub audio_codec: String,
    /// Codec of the embedded subtitle track (`mov_text` for mp4 containers)
    pub subtitle_codec: String,
    /// Additional options appended before the output path
    /// e.g. ["-movflags", "+faststart"]
    pub extra_options: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_mb: 2048,
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            backend: TranscriberBackend::Whisper,
            binary_path: "whisper".to_string(),
            model: "base".to_string(),
            language: None,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            backend: TranslatorBackend::Ollama,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            api_key: None,
            source_language: default_source_language(),
            entry_delay_ms: default_entry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            audio_codec: "aac".to_string(),
            subtitle_codec: "mov_text".to_string(),
            extra_options: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtitlerError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubtitlerError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtitlerError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtitlerError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [translate]
            backend = "libre"
            endpoint = "http://localhost:5001"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.translate.backend, TranslatorBackend::Libre);
        assert_eq!(config.translate.source_language, "en");
        assert_eq!(config.translate.entry_delay_ms, 100);
        assert_eq!(config.transcriber.backend, TranscriberBackend::Whisper);
        assert_eq!(config.media.subtitle_codec, "mov_text");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.transcriber.backend = TranscriberBackend::WhisperCpp;
        config.transcriber.language = Some("en".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.transcriber.backend, TranscriberBackend::WhisperCpp);
        assert_eq!(loaded.transcriber.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_invalid_backend_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[translate]\nbackend = \"deepl\"\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, SubtitlerError::Config(_)));
    }
}
