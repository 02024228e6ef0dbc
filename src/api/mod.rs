// HTTP surface
//
// - handlers: one function per endpoint
// - error: `ApiError` and its JSON body
// - extract: Json, Query and Path wrappers rejecting through `ApiError`
// - state: shared handles passed to every handler

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub use error::ApiError;
pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.workflow.config().server.max_upload_mb.saturating_mul(1024 * 1024);

    Router::new()
        .route("/", get(handlers::index))
        .route("/static/script.js", get(handlers::script))
        .route("/upload", post(handlers::upload))
        .route("/get_video", get(handlers::get_video))
        .route("/translate", post(handlers::translate))
        .route("/done", get(handlers::done))
        .route("/progress", get(handlers::progress))
        .route("/jobs/:job_id", get(handlers::get_job).delete(handlers::cancel_job))
        .route(
            "/download_video_with_subtitles",
            get(handlers::download_video_with_subtitles),
        )
        .route(
            "/download_translated_subtitles",
            get(handlers::download_translated_subtitles),
        )
        .route("/get_subtitles", get(handlers::get_subtitles))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
