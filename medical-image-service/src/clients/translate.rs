use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::TranslationConfig;

/// Longest text the free Google endpoint accepts in one request.
pub const MAX_CHUNK_CHARS: usize = 5000;

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("translation service returned HTTP {0}")]
    Status(u16),
    #[error("unexpected translation response: {0}")]
    InvalidResponse(String),
}

/// Text-in/text-out machine translation with automatic source detection.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(&self, text: &str, target_code: &str) -> Result<String, TranslationError>;
}

/// Client for the public Google Translate `gtx` endpoint.
pub struct GoogleTranslateClient {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateClient {
    pub fn new(client: Client, config: &TranslationConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
        }
    }

    async fn translate_chunk(
        &self,
        chunk: &str,
        target_code: &str,
    ) -> Result<String, TranslationError> {
        let url = format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.endpoint,
            urlencoding::encode(target_code),
            urlencoding::encode(chunk)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TranslationError::Status(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        parse_translation(&body)
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslateClient {
    async fn translate(&self, text: &str, target_code: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let chunks = split_into_chunks(text, MAX_CHUNK_CHARS);
        info!(
            "Translating {} characters to '{}' in {} request(s)",
            text.chars().count(),
            target_code,
            chunks.len()
        );

        let mut translated = String::with_capacity(text.len());
        for chunk in chunks {
            translated.push_str(&self.translate_chunk(chunk, target_code).await?);
        }
        Ok(translated)
    }
}

/// The `gtx` response is `[[["translated", "source", ...], ...], ...]`.
fn parse_translation(body: &Value) -> Result<String, TranslationError> {
    let segments = body[0]
        .as_array()
        .ok_or_else(|| TranslationError::InvalidResponse(body.to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment[0].as_str())
        .collect();

    debug!("Parsed {} translated segments", segments.len());
    Ok(translated)
}

/// Split text into pieces of at most `max_chars` characters, preferring line breaks.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_chars = 0;
    let mut line_start = 0;

    for line in text.split_inclusive('\n') {
        let line_chars = line.chars().count();

        if chunk_chars + line_chars > max_chars && chunk_chars > 0 {
            chunks.push(&text[start..line_start]);
            start = line_start;
            chunk_chars = 0;
        }

        if line_chars > max_chars {
            // A single oversized line is cut on character boundaries.
            let mut piece_start = line_start;
            let mut piece_chars = 0;
            for (offset, _) in line.char_indices() {
                if piece_chars == max_chars {
                    chunks.push(&text[piece_start..line_start + offset]);
                    piece_start = line_start + offset;
                    piece_chars = 0;
                }
                piece_chars += 1;
            }
            start = piece_start;
            chunk_chars = piece_chars;
        } else {
            chunk_chars += line_chars;
        }
        line_start += line.len();
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::{Json, Router, extract::Query, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_parse_translation() {
        let body = json!([
            [["नमस्ते। ", "Hello. ", null, null, 10], ["दुनिया", "World", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(parse_translation(&body).unwrap(), "नमस्ते। दुनिया");
        assert!(parse_translation(&json!({ "error": "nope" })).is_err());
    }

    #[test]
    fn test_split_into_chunks() {
        assert_eq!(split_into_chunks("short text", 5000), vec!["short text"]);
        assert_eq!(split_into_chunks("ab\ncd\nef", 5), vec!["ab\n", "cd\nef"]);
        assert_eq!(split_into_chunks("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(
            split_into_chunks("ab\nabcdefg\nxy", 3),
            vec!["ab\n", "abc", "def", "g\n", "xy"]
        );

        let long = "é".repeat(12_001);
        let chunks = split_into_chunks(&long, MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(chunks.concat(), long);
    }

    #[tokio::test]
    async fn test_translates_through_gtx_endpoint() {
        let app = Router::new().route(
            "/translate_a/single",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["client"], "gtx");
                assert_eq!(params["sl"], "auto");
                assert_eq!(params["tl"], "hi");
                Json(json!([[[format!("[hi] {}", params["q"]), params["q"], null]], null, "en"]))
            }),
        );
        let base_url = serve(app).await;

        let client = GoogleTranslateClient::new(
            Client::new(),
            &TranslationConfig {
                endpoint: format!("{}/translate_a/single", base_url),
            },
        );
        let translated = client.translate("Mild edema & mass effect", "hi").await.unwrap();
        assert_eq!(translated, "[hi] Mild edema & mass effect");

        assert_eq!(client.translate("   ", "hi").await.unwrap(), "   ");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let app = Router::new().route(
            "/translate_a/single",
            get(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = serve(app).await;

        let client = GoogleTranslateClient::new(
            Client::new(),
            &TranslationConfig {
                endpoint: format!("{}/translate_a/single", base_url),
            },
        );
        let err = client.translate("hello", "hi").await.unwrap_err();
        assert!(matches!(err, TranslationError::Status(429)));
    }
}
