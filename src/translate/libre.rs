use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::common::{build_client, request_error};
use super::Translator;
use crate::config::TranslateConfig;
use crate::error::{Result, SubtitlerError};

#[derive(Debug, Clone, Serialize)]
pub struct LibreRequest<'a> {
    pub q: &'a str,
    pub source: &'a str,
    pub target: &'a str,
    pub format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibreResponse {
    pub translated_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibreLanguage {
    pub code: String,
}

/// Translation through a LibreTranslate server
pub struct LibreTranslator {
    client: Client,
    config: TranslateConfig,
}

impl LibreTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = LibreRequest {
            q: text,
            source: source_language,
            target: target_language,
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        let url = self.url("translate");
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("libretranslate", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubtitlerError::Translation(format!(
                "LibreTranslate error {}: {}",
                status, error_text
            )));
        }

        let translated: LibreResponse = response
            .json()
            .await
            .map_err(|e| SubtitlerError::Translation(format!("Failed to parse response: {}", e)))?;

        Ok(translated.translated_text.trim().to_string())
    }

    async fn check_availability(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("languages"))
            .send()
            .await
            .map_err(|e| request_error("libretranslate", e))?;

        if !response.status().is_success() {
            return Err(SubtitlerError::unavailable(
                "libretranslate",
                format!("language listing returned {}", response.status()),
            ));
        }

        let languages: Vec<LibreLanguage> = response
            .json()
            .await
            .map_err(|e| SubtitlerError::Translation(format!("Failed to parse languages: {}", e)))?;
        info!("LibreTranslate is available with {} languages", languages.len());
        Ok(())
    }
}
