use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, SubtitlerError};
use crate::media::{MediaProcessor, MediaProcessorFactory};
use crate::storage::{JobArtifacts, UploadStore};
use crate::subtitle::{self, SubtitleEntry};
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::translate::{Translator, TranslatorFactory};

/// What a translation job works on
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub job_id: Uuid,
    pub media_path: PathBuf,
    pub source_language: String,
    pub target_language: String,
}

/// Pipeline stages over the transcription, translation and media collaborators
pub struct Workflow {
    config: Config,
    store: UploadStore,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    media: Arc<dyn MediaProcessor>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone(), media.clone());
        let translator = TranslatorFactory::create_translator(config.translate.clone())?;

        Ok(Self::with_components(config, transcriber, translator, media))
    }

    pub fn with_components(
        config: Config,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        media: Arc<dyn MediaProcessor>,
    ) -> Self {
        let store = UploadStore::new(config.server.upload_dir.clone());
        Self {
            config,
            store,
            transcriber,
            translator,
            media,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Report collaborators that are not reachable. Nothing here is fatal: the
    /// server still starts and the failing stage reports its own error later.
    pub async fn check_dependencies(&self) {
        if let Err(e) = self.media.check_availability().await {
            warn!("Media processor check failed: {}", e);
        }
        if let Err(e) = self.translator.check_availability().await {
            warn!("Translation service check failed: {}", e);
        }
    }

    /// Transcribe a media file into `<base>.srt` and `<base>.vtt`, returning the `.vtt` path
    pub async fn extract_subtitles(&self, media_path: &Path) -> Result<PathBuf> {
        let result = self.extract_subtitles_inner(media_path).await;
        if let Err(e) = &result {
            error!("Error extracting subtitles from {}: {}", media_path.display(), e);
        }
        result
    }

    async fn extract_subtitles_inner(&self, media_path: &Path) -> Result<PathBuf> {
        if !fs::try_exists(media_path).await? {
            return Err(SubtitlerError::FileNotFound(media_path.display().to_string()));
        }

        info!("Extracting subtitles from {} using {}", media_path.display(), self.transcriber.name());
        let transcription = self
            .transcriber
            .transcribe(media_path, self.config.transcriber.language.clone())
            .await?;

        let entries = SubtitleEntry::from_transcription(&transcription);
        let (srt_path, vtt_path) = UploadStore::subtitle_pair(media_path);
        subtitle::write_subtitle_pair(&entries, &srt_path, &vtt_path).await?;

        info!("Extracted {} subtitle entries to {}", entries.len(), vtt_path.display());
        Ok(vtt_path)
    }

    /// Entries of the asset's SubRip file, transcribing first when it does not exist yet
    pub async fn load_or_extract_entries(&self, media_path: &Path) -> Result<Vec<SubtitleEntry>> {
        if !fs::try_exists(media_path).await? {
            return Err(SubtitlerError::FileNotFound(media_path.display().to_string()));
        }

        let (srt_path, _) = UploadStore::subtitle_pair(media_path);
        if !fs::try_exists(&srt_path).await? {
            self.extract_subtitles(media_path).await?;
        }

        subtitle::read_srt(&srt_path).await
    }

    /// Translate every entry in order. A failed entry keeps its original text.
    ///
    /// `on_progress(completed, total)` is called after each entry.
    pub async fn translate_entries<F>(
        &self,
        entries: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<Vec<SubtitleEntry>>
    where
        F: FnMut(usize, usize) + Send,
    {
        info!("Starting translation of {} entries from {} to {}", entries.len(), source_language, target_language);

        let total = entries.len();
        let delay = Duration::from_millis(self.config.translate.entry_delay_ms);
        let mut translated = Vec::with_capacity(total);

        for (idx, entry) in entries.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SubtitlerError::Cancelled);
            }

            let text = match self
                .translator
                .translate(&entry.text, source_language, target_language)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!("Translation error at subtitle {}: {}", entry.index, e);
                    entry.text.clone()
                }
            };
            translated.push(entry.with_text(text));
            on_progress(idx + 1, total);

            tokio::select! {
                _ = cancel.cancelled() => return Err(SubtitlerError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        Ok(translated)
    }

    /// Body of a translation job: translate, write the job's subtitle pair, mux the video
    pub async fn run_translation_job<F>(
        &self,
        request: &TranslationRequest,
        entries: &[SubtitleEntry],
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<JobArtifacts>
    where
        F: FnMut(usize, usize) + Send,
    {
        let translated = self
            .translate_entries(
                entries,
                &request.source_language,
                &request.target_language,
                cancel,
                on_progress,
            )
            .await?;

        let artifacts = self
            .store
            .job_artifacts(&request.media_path, &request.target_language, request.job_id);
        subtitle::write_subtitle_pair(&translated, &artifacts.srt, &artifacts.vtt).await?;

        if cancel.is_cancelled() {
            return Err(SubtitlerError::Cancelled);
        }

        self.media
            .mux_subtitles(&request.media_path, &artifacts.vtt, &artifacts.video)
            .await?;

        info!("Job {} produced {}", request.job_id, artifacts.video.display());
        Ok(artifacts)
    }

    /// Embed a subtitle file into a video
    pub async fn mux(&self, media_path: &Path, subtitle_path: &Path, output_path: &Path) -> Result<()> {
        self.media.mux_subtitles(media_path, subtitle_path, output_path).await
    }
}
