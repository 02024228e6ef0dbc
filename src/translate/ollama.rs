use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::common::{build_client, language_code_to_name, request_error};
use super::Translator;
use crate::config::TranslateConfig;
use crate::error::{Result, SubtitlerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Translation through an Ollama model
pub struct OllamaTranslator {
    client: Client,
    config: TranslateConfig,
}

impl OllamaTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }

    /// Build translation prompt, asking for a JSON answer
    fn build_prompt(&self, text: &str, source_language: &str, target_language: &str) -> String {
        let source_name = language_code_to_name(source_language);
        let target_name = language_code_to_name(target_language);

        format!(
            "You are a professional subtitle translator.\n\
             \n\
             Translate the subtitle line from {} to {} ONLY. Do not translate to any other language.\n\
             The target language is: {} (language code: {})\n\
             \n\
             Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
             Do not include any explanations, alternatives, or text in other languages.\n\
             \n\
             Text to translate: \"{}\"\n",
            source_name, target_name, target_name, target_language, target_name, text
        )
    }
}

/// Text of a JSON answer: the `text` field, else the first string field
fn json_translation(response: &str) -> Option<String> {
    if let Ok(result) = serde_json::from_str::<TranslationResult>(response) {
        return Some(result.text.trim().to_string());
    }

    match serde_json::from_str::<serde_json::Value>(response).ok()? {
        serde_json::Value::Object(fields) => fields
            .values()
            .find_map(|v| v.as_str())
            .map(|text| text.trim().to_string()),
        serde_json::Value::String(text) => Some(text.trim().to_string()),
        _ => None,
    }
}

fn is_boilerplate(line: &str) -> bool {
    line.starts_with("Here are")
        || line.starts_with("Here is")
        || line.starts_with("Option")
        || line.starts_with("**Option")
        || line.starts_with("Translation:")
        || (line.starts_with("**") && line.ends_with("**"))
}

/// Pick the translation out of a free-form answer when the model ignored the JSON format
fn clean_translation_response(response: &str) -> String {
    let lines: Vec<&str> = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_boilerplate(line))
        .map(|line| line.trim_matches('"'))
        .collect();

    if lines.is_empty() {
        return response.trim().to_string();
    }
    lines.join("\n")
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: self.build_prompt(text, source_language, target_language),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("ollama", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubtitlerError::Translation(format!(
                "Ollama API error {}: {}",
                status, error_text
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SubtitlerError::Translation(format!("Failed to parse response: {}", e)))?;

        let raw_response = generated.response.trim();
        debug!("Raw Ollama response: {}", raw_response);

        if raw_response.is_empty() {
            return Err(SubtitlerError::Translation("Empty translation received".to_string()));
        }

        if let Some(text) = json_translation(raw_response) {
            return Ok(text);
        }

        Ok(clean_translation_response(raw_response))
    }

    async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/show", self.config.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": self.config.model }))
            .send()
            .await
            .map_err(|e| request_error("ollama", e))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(SubtitlerError::unavailable(
                "ollama",
                format!(
                    "model '{}' not found, pull it first: ollama pull {}",
                    self.config.model, self.config.model
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_both_languages() {
        let translator = OllamaTranslator::new(TranslateConfig::default()).unwrap();
        let prompt = translator.build_prompt("Good morning", "en", "fa");

        assert!(prompt.contains("from English to Persian"));
        assert!(prompt.contains("language code: fa"));
        assert!(prompt.contains("\"Good morning\""));
    }

    #[test]
    fn test_clean_translation_response() {
        assert_eq!(clean_translation_response("Here is the translation:\n\"Bonjour\"\n"), "Bonjour");
        assert_eq!(clean_translation_response("**Option 1**\nHola"), "Hola");
        assert_eq!(clean_translation_response("  Ciao  "), "Ciao");
        assert_eq!(
            clean_translation_response("Here is the translation:\nPrimera línea\nSegunda línea\n"),
            "Primera línea\nSegunda línea"
        );
    }

    #[test]
    fn test_json_translation_accepts_other_keys() {
        assert_eq!(json_translation(r#"{"text": " Hola "}"#).as_deref(), Some("Hola"));
        assert_eq!(json_translation(r#"{"translation": "Bonjour"}"#).as_deref(), Some("Bonjour"));
        assert_eq!(json_translation(r#"{"n": 1, "result": "Ciao"}"#).as_deref(), Some("Ciao"));
        assert_eq!(json_translation("not json"), None);
        assert_eq!(json_translation(r#"{"n": 1}"#), None);
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_service() {
        let mut config = TranslateConfig::default();
        config.endpoint = "http://127.0.0.1:9".to_string();
        let translator = OllamaTranslator::new(config).unwrap();

        assert_eq!(translator.translate("   ", "en", "fa").await.unwrap(), "   ");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let mut config = TranslateConfig::default();
        config.endpoint = "http://127.0.0.1:9".to_string();
        config.timeout_secs = 2;
        let translator = OllamaTranslator::new(config).unwrap();

        let err = translator.translate("hello", "en", "fa").await.unwrap_err();
        assert!(matches!(err, SubtitlerError::CollaboratorUnavailable { .. }));
    }
}
