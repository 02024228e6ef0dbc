use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtitlerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Malformed subtitle data: {0}")]
    Subtitle(String),

    #[error("{tool} is not available: {reason}")]
    CollaboratorUnavailable { tool: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job {0} is not running")]
    JobNotRunning(String),

    #[error("Job was cancelled")]
    Cancelled,
}

/// Coarse classification used by callers that only care about the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unavailable,
    InvalidInput,
    NotFound,
    Conflict,
    Io,
    Collaborator,
    Cancelled,
}

impl SubtitlerError {
    pub fn unavailable(tool: impl Into<String>, reason: impl ToString) -> Self {
        Self::CollaboratorUnavailable {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CollaboratorUnavailable { .. } => ErrorKind::Unavailable,
            Self::Subtitle(_) | Self::InvalidInput(_) | Self::Config(_) | Self::Toml(_) => {
                ErrorKind::InvalidInput
            }
            Self::FileNotFound(_) | Self::JobNotFound(_) => ErrorKind::NotFound,
            Self::JobNotRunning(_) => ErrorKind::Conflict,
            Self::Io(_) => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Json(_)
            | Self::Http(_)
            | Self::Transcription(_)
            | Self::Translation(_)
            | Self::Media(_) => ErrorKind::Collaborator,
        }
    }
}

pub type Result<T> = std::result::Result<T, SubtitlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_separates_failure_families() {
        assert_eq!(
            SubtitlerError::unavailable("ffmpeg", "not found").kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            SubtitlerError::Subtitle("bad timing".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SubtitlerError::Io(std::io::Error::other("disk full")).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            SubtitlerError::Media("exit 1".into()).kind(),
            ErrorKind::Collaborator
        );
    }

    #[test]
    fn test_unavailable_message_names_the_tool() {
        let err = SubtitlerError::unavailable("whisper", "No such file or directory");
        assert_eq!(err.to_string(), "whisper is not available: No such file or directory");
    }
}
