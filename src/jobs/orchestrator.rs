use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::record::{running_progress, JobRecord};
use super::registry::JobRegistry;
use crate::error::{Result, SubtitlerError};
use crate::subtitle::SubtitleEntry;
use crate::workflow::{TranslationRequest, Workflow};

struct RunningJob {
    cancel: CancellationToken,
    finished: watch::Receiver<bool>,
}

/// Runs translation jobs in the background and keeps their records current
#[derive(Clone)]
pub struct JobOrchestrator {
    workflow: Arc<Workflow>,
    registry: Arc<JobRegistry>,
    running: Arc<Mutex<HashMap<Uuid, RunningJob>>>,
}

impl JobOrchestrator {
    pub fn new(workflow: Arc<Workflow>) -> Self {
        Self {
            workflow,
            registry: Arc::new(JobRegistry::new()),
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Register a job and start translating `entries` in the background
    pub async fn start(
        &self,
        media_path: PathBuf,
        source_language: &str,
        target_language: &str,
        entries: Vec<SubtitleEntry>,
    ) -> JobRecord {
        let record = self
            .registry
            .create(media_path.clone(), source_language, target_language)
            .await;
        self.registry.mark_running(record.id).await;

        let request = TranslationRequest {
            job_id: record.id,
            media_path,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        let cancel = CancellationToken::new();
        let (finished_tx, finished_rx) = watch::channel(false);

        // Registered before spawning so a fast job cannot finish ahead of its own entry
        let mut running = self.running.lock().await;
        running.insert(
            record.id,
            RunningJob {
                cancel: cancel.clone(),
                finished: finished_rx,
            },
        );

        let id = record.id;
        let this = self.clone();
        tokio::spawn(async move {
            this.run(request, entries, cancel).await;
            this.running.lock().await.remove(&id);
            let _ = finished_tx.send(true);
        });
        drop(running);

        info!(
            "Started job {} ({} -> {}) for {}",
            record.id,
            source_language,
            target_language,
            record.video.display()
        );
        record
    }

    async fn run(&self, request: TranslationRequest, entries: Vec<SubtitleEntry>, cancel: CancellationToken) {
        let id = request.job_id;
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

        let work = self
            .workflow
            .run_translation_job(&request, &entries, &cancel, move |done, total| {
                let _ = progress_tx.send(running_progress(done, total));
            });
        let forward = async {
            while let Some(progress) = progress_rx.recv().await {
                self.registry.set_progress(id, progress).await;
            }
        };
        let (result, ()) = tokio::join!(work, forward);

        match result {
            Ok(artifacts) => {
                info!("Job {} finished", id);
                self.registry.mark_done(id, artifacts).await;
            }
            Err(SubtitlerError::Cancelled) => {
                warn!("Job {} was cancelled", id);
                self.registry.mark_cancelled(id).await;
            }
            Err(e) => {
                error!("Job {} failed: {}", id, e);
                self.registry.mark_failed(id, e.to_string()).await;
            }
        }
    }

    /// Ask a running job to stop; it ends in the `Cancelled` state
    pub async fn cancel(&self, id: Uuid) -> Result<()> {
        let running = self.running.lock().await;
        let record = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| SubtitlerError::JobNotFound(id.to_string()))?;

        // A finalized record wins over a task that has not deregistered yet
        match running.get(&id) {
            Some(job) if !record.state.is_finished() => {
                job.cancel.cancel();
                Ok(())
            }
            _ => Err(SubtitlerError::JobNotRunning(id.to_string())),
        }
    }

    /// Wait until a job leaves the running state and return its final record
    pub async fn wait(&self, id: Uuid) -> Option<JobRecord> {
        let finished = self.running.lock().await.get(&id).map(|job| job.finished.clone());
        if let Some(mut finished) = finished {
            let _ = finished.wait_for(|done| *done).await;
        }
        self.registry.get(id).await
    }

    /// Cancel every running job, used on shutdown
    pub async fn cancel_all(&self) {
        for job in self.running.lock().await.values() {
            job.cancel.cancel();
        }
    }
}
