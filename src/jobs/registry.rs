use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::record::{JobRecord, JobState};
use crate::storage::JobArtifacts;

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, JobRecord>,
    order: Vec<Uuid>,
}

/// All job records of this process, keyed by job id
#[derive(Default)]
pub struct JobRegistry {
    inner: RwLock<Inner>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, video: PathBuf, source_language: &str, target_language: &str) -> JobRecord {
        let record = JobRecord::new(
            Uuid::new_v4(),
            video,
            source_language.to_string(),
            target_language.to_string(),
        );
        let mut inner = self.inner.write().await;
        inner.order.push(record.id);
        inner.records.insert(record.id, record.clone());
        record
    }

    async fn update<F>(&self, id: Uuid, apply: F)
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.records.get_mut(&id) {
            apply(record);
        }
    }

    pub async fn mark_running(&self, id: Uuid) {
        self.update(id, |r| {
            r.state = JobState::Running;
            r.progress = 0;
        })
        .await;
    }

    /// Progress of a running job never moves backwards and stays below 100
    pub async fn set_progress(&self, id: Uuid, progress: u8) {
        self.update(id, |r| {
            if r.state == JobState::Running {
                r.progress = r.progress.max(progress.min(99));
            }
        })
        .await;
    }

    pub async fn mark_done(&self, id: Uuid, artifacts: JobArtifacts) {
        self.update(id, |r| {
            r.state = JobState::Done;
            r.progress = 100;
            r.artifacts = Some(artifacts);
            r.finished_at = Some(Utc::now());
        })
        .await;
    }

    pub async fn mark_failed(&self, id: Uuid, error: String) {
        self.update(id, |r| {
            r.state = JobState::Failed;
            r.progress = 0;
            r.error = Some(error);
            r.finished_at = Some(Utc::now());
        })
        .await;
    }

    pub async fn mark_cancelled(&self, id: Uuid) {
        self.update(id, |r| {
            r.state = JobState::Cancelled;
            r.progress = 0;
            r.error = Some("cancelled".to_string());
            r.finished_at = Some(Utc::now());
        })
        .await;
    }

    pub async fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.inner.read().await.records.get(&id).cloned()
    }

    /// Most recently created job
    pub async fn latest(&self) -> Option<JobRecord> {
        let inner = self.inner.read().await;
        inner.order.last().and_then(|id| inner.records.get(id)).cloned()
    }

    /// Most recently created job that finished successfully, optionally for one target language
    pub async fn latest_done(&self, target_language: Option<&str>) -> Option<JobRecord> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.records.get(id))
            .find(|r| {
                r.state == JobState::Done
                    && target_language.is_none_or(|lang| r.target_language == lang)
            })
            .cloned()
    }
}
