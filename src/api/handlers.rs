use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io;
use std::path::Path;
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use super::extract::{JsonBody, PathParam, QueryParams};
use super::state::AppState;
use crate::error::SubtitlerError;
use crate::jobs::{JobRecord, JobState};
use crate::storage::{self, UploadStore};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const SCRIPT_JS: &str = include_str!("../../static/script.js");

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub video_path: String,
    pub subtitle_path: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub video_file_path: Option<String>,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub message: String,
    pub job_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    pub video_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobQuery {
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct VideoDownloadQuery {
    pub lang: Option<String>,
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SubtitleDownloadQuery {
    pub job_id: Option<Uuid>,
    pub format: Option<String>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], SCRIPT_JS)
}

/// Store the `file` field of a multipart form and make sure the video has subtitles
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let raw_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => continue,
        };

        let name = UploadStore::upload_name(&raw_name)?;
        let store = state.store();
        store.ensure_dir().await?;
        let media_path = store.media_path(&name)?;

        let written = storage::stream_to_file(&media_path, field).await?;
        info!("Uploaded {} ({} bytes)", media_path.display(), written);

        let (_, vtt_path) = UploadStore::subtitle_pair(&media_path);
        let subtitle_path = if fs::try_exists(&vtt_path).await.map_err(SubtitlerError::from)? {
            vtt_path
        } else {
            state
                .workflow
                .extract_subtitles(&media_path)
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to generate subtitles: {}", e)))?
        };

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            video_path: name,
            subtitle_path: file_name(&subtitle_path),
        }));
    }

    Err(ApiError::BadRequest("No file received".to_string()))
}

pub async fn get_video(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<VideoQuery>,
) -> Result<Response, ApiError> {
    let name = required(query.video_path, "Video path not provided")?;
    let media_path = state.store().media_path(&name)?;
    file_response(&media_path, false, "Video not found").await
}

/// Start a background translation job for an uploaded video
pub async fn translate(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let missing = || ApiError::BadRequest("No video file path or target language provided.".to_string());
    let video = request.video_file_path.filter(|v| !v.trim().is_empty()).ok_or_else(missing)?;
    let target = request
        .target_language
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(missing)?;
    let source = request
        .source_language
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.workflow.config().translate.source_language.clone());

    let media_path = state.store().media_path(&video)?;
    if !fs::try_exists(&media_path).await.map_err(SubtitlerError::from)? {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    let entries = state.workflow.load_or_extract_entries(&media_path).await?;
    let job = state.jobs.start(media_path, &source, &target, entries).await;

    Ok(Json(TranslateResponse {
        message: "Translation started. Check progress bar.".to_string(),
        job_id: job.id,
    }))
}

async fn job_or_latest(state: &AppState, job_id: Option<Uuid>) -> Result<Option<JobRecord>, ApiError> {
    let registry = state.jobs.registry();
    match job_id {
        Some(id) => registry
            .get(id)
            .await
            .map(Some)
            .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", id))),
        None => Ok(registry.latest().await),
    }
}

pub async fn progress(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<JobQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = match job_or_latest(&state, query.job_id).await? {
        Some(job) => json!({ "progress": job.progress, "job_id": job.id, "state": job.state }),
        None => json!({ "progress": 0, "job_id": null, "state": JobState::Idle }),
    };
    Ok(Json(body))
}

pub async fn done(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<JobQuery>,
) -> Result<Json<Value>, ApiError> {
    let progress = job_or_latest(&state, query.job_id)
        .await?
        .map(|job| job.progress)
        .unwrap_or(0);

    let message = if progress >= 100 {
        "Translation is completed. You can download now."
    } else {
        "Translation in progress."
    };
    Ok(Json(json!({ "message": message })))
}

pub async fn get_job(
    State(state): State<AppState>,
    PathParam(job_id): PathParam<Uuid>,
) -> Result<Json<JobRecord>, ApiError> {
    state
        .jobs
        .registry()
        .get(job_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", job_id)))
}

pub async fn cancel_job(
    State(state): State<AppState>,
    PathParam(job_id): PathParam<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.jobs.cancel(job_id).await?;
    Ok(Json(json!({ "message": format!("Cancellation requested for job {}", job_id) })))
}

/// A finished job, either the requested one or the newest matching one
async fn finished_job(
    state: &AppState,
    job_id: Option<Uuid>,
    lang: Option<&str>,
    missing: &str,
) -> Result<JobRecord, ApiError> {
    let registry = state.jobs.registry();
    let job = match job_id {
        Some(id) => registry.get(id).await.filter(|job| job.state == JobState::Done),
        None => registry.latest_done(lang).await,
    };
    job.ok_or_else(|| ApiError::NotFound(missing.to_string()))
}

pub async fn download_video_with_subtitles(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<VideoDownloadQuery>,
) -> Result<Response, ApiError> {
    const MISSING: &str = "Translated video file not found.";
    let lang = query.lang.unwrap_or_else(|| "fa".to_string());
    let job = finished_job(&state, query.job_id, Some(&lang), MISSING).await?;
    let artifacts = job.artifacts.ok_or_else(|| ApiError::NotFound(MISSING.to_string()))?;

    file_response(&artifacts.video, true, MISSING).await
}

pub async fn download_translated_subtitles(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SubtitleDownloadQuery>,
) -> Result<Response, ApiError> {
    const MISSING: &str = "Translated subtitles file not found.";
    let format = query.format.unwrap_or_else(|| "vtt".to_string());
    if format != "vtt" && format != "srt" {
        return Err(ApiError::BadRequest(format!("Unsupported subtitle format '{}'", format)));
    }

    let job = finished_job(&state, query.job_id, None, MISSING).await?;
    let artifacts = job.artifacts.ok_or_else(|| ApiError::NotFound(MISSING.to_string()))?;
    let path = if format == "srt" { artifacts.srt } else { artifacts.vtt };

    file_response(&path, true, MISSING).await
}

pub async fn get_subtitles(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<VideoQuery>,
) -> Result<Response, ApiError> {
    let name = required(query.video_path, "Video path not provided")?;
    let media_path = state.store().media_path(&name)?;
    let (_, vtt_path) = UploadStore::subtitle_pair(&media_path);
    file_response(&vtt_path, true, "Subtitles file not found.").await
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Stream a file from disk, optionally as a download
async fn file_response(path: &Path, attachment: bool, missing: &str) -> Result<Response, ApiError> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(missing.to_string()));
        }
        Err(e) => return Err(SubtitlerError::from(e).into()),
    };
    let len = file.metadata().await.map_err(SubtitlerError::from)?.len();
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, len);

    if attachment {
        // Header values must stay printable ASCII
        let name: String = file_name(path)
            .chars()
            .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
            .collect();
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        );
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
