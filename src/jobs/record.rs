use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::storage::JobArtifacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Done,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// Observable state of one translation job
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub video: PathBuf,
    pub source_language: String,
    pub target_language: String,
    pub state: JobState,
    /// 0..=100; only a finished job reports 100
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<JobArtifacts>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(id: Uuid, video: PathBuf, source_language: String, target_language: String) -> Self {
        Self {
            id,
            video,
            source_language,
            target_language,
            state: JobState::Idle,
            progress: 0,
            error: None,
            artifacts: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Percentage of a running job; 100 is reserved for `Done`
pub fn running_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = completed.min(total) * 100 / total;
    pct.min(99) as u8
}
