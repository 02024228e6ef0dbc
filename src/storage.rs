//! Flat upload directory and artifact naming.
//!
//! Everything lives side by side in one directory: uploaded media, the per-asset
//! subtitle pair (`<base>.srt`, `<base>.vtt`) and the per-job translated artifacts,
//! which carry the target language and the job id in their names.

use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use serde::Serialize;
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::StreamReader;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, SubtitlerError};

/// Files produced by one translation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobArtifacts {
    pub srt: PathBuf,
    pub vtt: PathBuf,
    pub video: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Reduce a client-supplied upload name to its final component
    pub fn upload_name(raw: &str) -> Result<String> {
        let name = raw.rsplit(['/', '\\']).next().unwrap_or_default();
        Self::validate_media_name(name)?;
        Ok(name.to_string())
    }

    /// A media name must not collide with the subtitle files derived from it
    pub fn validate_media_name(name: &str) -> Result<()> {
        Self::validate_name(name)?;
        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        if matches!(extension.as_deref(), Some("srt" | "vtt")) {
            return Err(SubtitlerError::InvalidInput(format!(
                "'{}' is not a media file name",
                name
            )));
        }
        Ok(())
    }

    /// Accept only a single plain path component
    pub fn validate_name(name: &str) -> Result<()> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
            _ => Err(SubtitlerError::InvalidInput(format!("Invalid file name '{}'", name))),
        }
    }

    /// Location of an uploaded media file
    pub fn media_path(&self, name: &str) -> Result<PathBuf> {
        Self::validate_media_name(name)?;
        Ok(self.root.join(name))
    }

    /// `<base>.srt` and `<base>.vtt` next to the media file
    pub fn subtitle_pair(media_path: &Path) -> (PathBuf, PathBuf) {
        (media_path.with_extension("srt"), media_path.with_extension("vtt"))
    }

    /// Artifact names for one job; deterministic in (media name, language, job id)
    pub fn job_artifacts(&self, media_path: &Path, target_language: &str, job_id: Uuid) -> JobArtifacts {
        let lang = filename_safe(target_language);
        let stem = media_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        let job = job_id.simple();

        JobArtifacts {
            srt: self.root.join(format!("translated_subtitles_{}_{}.srt", lang, job)),
            vtt: self.root.join(format!("translated_subtitles_{}_{}.vtt", lang, job)),
            video: self.root.join(format!("{}_with_{}_subtitles_{}.mp4", stem, lang, job)),
        }
    }
}

fn filename_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Save a byte stream to a file
pub async fn stream_to_file<S, E>(path: &Path, stream: S) -> Result<u64>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body_with_io_error = stream.map_err(io::Error::other);
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    let written = tokio::io::copy(&mut body_reader, &mut file).await?;
    tokio::io::AsyncWriteExt::flush(&mut file).await?;

    debug!("Saved {} bytes to {}", written, path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_upload_name_strips_directories() {
        assert_eq!(UploadStore::upload_name("clip.mp4").unwrap(), "clip.mp4");
        assert_eq!(UploadStore::upload_name("C:\\Users\\me\\clip.mp4").unwrap(), "clip.mp4");
        assert_eq!(UploadStore::upload_name("/tmp/x/clip.mp4").unwrap(), "clip.mp4");
        assert!(UploadStore::upload_name("dir/").is_err());
        assert!(UploadStore::upload_name("..").is_err());
        assert!(UploadStore::upload_name("").is_err());
    }

    #[test]
    fn test_subtitle_names_are_not_media() {
        for name in ["clip.srt", "clip.vtt", "CLIP.SRT", "dir/clip.Vtt"] {
            assert!(matches!(
                UploadStore::upload_name(name),
                Err(SubtitlerError::InvalidInput(_))
            ));
        }
        let store = UploadStore::new("uploads");
        assert!(store.media_path("clip.vtt").is_err());
        assert!(store.media_path("clip.srt.mp4").is_ok());
    }

    #[test]
    fn test_media_path_rejects_traversal() {
        let store = UploadStore::new("uploads");
        assert_eq!(store.media_path("a.mp4").unwrap(), PathBuf::from("uploads/a.mp4"));
        assert!(store.media_path("../secret").is_err());
        assert!(store.media_path("dir/a.mp4").is_err());
        assert!(store.media_path("/etc/passwd").is_err());
    }

    #[test]
    fn test_subtitle_pair() {
        let (srt, vtt) = UploadStore::subtitle_pair(Path::new("uploads/talk.final.mp4"));
        assert_eq!(srt, PathBuf::from("uploads/talk.final.srt"));
        assert_eq!(vtt, PathBuf::from("uploads/talk.final.vtt"));
    }

    #[test]
    fn test_job_artifacts_are_namespaced() {
        let store = UploadStore::new("uploads");
        let media = Path::new("uploads/talk.mp4");
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = store.job_artifacts(media, "fa", a);
        let again = store.job_artifacts(media, "fa", a);
        let other = store.job_artifacts(media, "fa", b);
        let odd = store.job_artifacts(media, "../zh", a);

        assert_eq!(first, again);
        assert_ne!(first.srt, other.srt);
        assert_eq!(
            first.video,
            PathBuf::from(format!("uploads/talk_with_fa_subtitles_{}.mp4", a.simple()))
        );
        assert!(odd.srt.starts_with("uploads"));
        assert_eq!(odd.srt.parent(), Some(Path::new("uploads")));
    }

    #[tokio::test]
    async fn test_stream_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        let mock_stream = stream::iter(vec![
            Ok::<Bytes, std::io::Error>(Bytes::from("Hello, ")),
            Ok(Bytes::from("world!")),
        ]);

        let written = stream_to_file(&file_path, mock_stream).await.unwrap();

        assert_eq!(written, 13);
        assert_eq!(std::fs::read_to_string(file_path).unwrap(), "Hello, world!");
    }

    #[tokio::test]
    async fn test_stream_to_file_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        let mock_stream = stream::iter(vec![Err::<Bytes, _>("Test error")]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(matches!(result, Err(SubtitlerError::Io(_))));
    }
}
