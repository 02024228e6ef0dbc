// Translation backends
//
// - ollama: LLM translation through Ollama's `/api/generate` with a JSON-format prompt
// - libre: LibreTranslate's `/translate`

pub mod common;
pub mod libre;
pub mod ollama;

use async_trait::async_trait;
use std::sync::Arc;

pub use common::*;
use crate::config::{TranslateConfig, TranslatorBackend};
use crate::error::Result;

/// Text translation; every call is independent and may fail on its own
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String>;

    /// Check that the service answers and can serve the configured model
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: TranslateConfig) -> Result<Arc<dyn Translator>> {
        Ok(match config.backend {
            TranslatorBackend::Ollama => Arc::new(ollama::OllamaTranslator::new(config)?),
            TranslatorBackend::Libre => Arc::new(libre::LibreTranslator::new(config)?),
        })
    }
}
