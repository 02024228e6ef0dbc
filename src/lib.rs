//! Subtitler - video subtitle translation service
//!
//! Uploads a video, transcribes it with whisper, translates the subtitles with
//! Ollama or LibreTranslate and muxes them back into the video with ffmpeg.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod media;
pub mod storage;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod workflow;
