use std::io::ErrorKind;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use super::Transcription;
use crate::error::{Result, SubtitlerError};

/// Trait for converting service-specific transcription formats into a `Transcription`
pub trait TranscriptionMapper<T> {
    fn to_transcription(service_result: T) -> Result<Transcription>;
}

/// Run a transcription tool to completion.
///
/// A binary that cannot be spawned is reported as unavailable, a non-zero exit as a
/// transcription failure carrying the tool's stderr.
pub(crate) async fn run_tool(mut cmd: Command, tool: &str) -> Result<Output> {
    debug!("Executing {} command: {:?}", tool, cmd);

    let output = cmd.output().await.map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => SubtitlerError::unavailable(tool, e),
        _ => SubtitlerError::Transcription(format!("Failed to execute {}: {}", tool, e)),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SubtitlerError::Transcription(format!(
            "{} failed ({}): {}",
            tool,
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}
