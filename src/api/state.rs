use std::sync::Arc;

use crate::jobs::JobOrchestrator;
use crate::storage::UploadStore;
use crate::workflow::Workflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub jobs: JobOrchestrator,
}

impl AppState {
    pub fn new(workflow: Arc<Workflow>) -> Self {
        let jobs = JobOrchestrator::new(workflow.clone());
        Self { workflow, jobs }
    }

    pub fn store(&self) -> &UploadStore {
        self.workflow.store()
    }
}
