// Translation jobs
//
// - record: the observable state of one job
// - registry: every job of this process, with "latest" lookups for id-less requests
// - orchestrator: spawns jobs, forwards progress and handles cancellation

pub mod orchestrator;
pub mod record;
pub mod registry;

pub use orchestrator::JobOrchestrator;
pub use record::{JobRecord, JobState};
pub use registry::JobRegistry;
