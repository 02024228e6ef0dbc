use reqwest::Client;
use std::time::Duration;

use crate::config::TranslateConfig;
use crate::error::{Result, SubtitlerError};

/// HTTP client shared by the translation backends
pub fn build_client(config: &TranslateConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| SubtitlerError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Connection-level failures mean the service is down, anything else is a failed call
pub fn request_error(service: &str, error: reqwest::Error) -> SubtitlerError {
    if error.is_connect() || error.is_timeout() {
        SubtitlerError::unavailable(service, error)
    } else {
        SubtitlerError::Translation(format!("{} request failed: {}", service, error))
    }
}

/// Convert language code to full language name for clearer prompts
pub fn language_code_to_name(code: &str) -> String {
    let name = match code.to_lowercase().as_str() {
        "en" => "English",
        "fa" => "Persian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" | "zh-cn" => "Chinese",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "ru" => "Russian",
        "it" => "Italian",
        "pt" => "Portuguese",
        "pl" => "Polish",
        "nl" => "Dutch",
        "tr" => "Turkish",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "sv" => "Swedish",
        "da" => "Danish",
        "no" => "Norwegian",
        "fi" => "Finnish",
        "he" => "Hebrew",
        "hu" => "Hungarian",
        "cs" => "Czech",
        "el" => "Greek",
        "uk" => "Ukrainian",
        "id" => "Indonesian",
        "ur" => "Urdu",
        "bn" => "Bengali",
        _ => return code.to_string(), // Fallback to the code itself if not found
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_to_name() {
        assert_eq!(language_code_to_name("fa"), "Persian");
        assert_eq!(language_code_to_name("JA"), "Japanese");
        assert_eq!(language_code_to_name("x-klingon"), "x-klingon");
    }
}
