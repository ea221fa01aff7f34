use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::encoding::data_uri;
use crate::models::OcrOutcome;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("request to OCR service failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("OCR service returned a non-JSON body (HTTP {status}): {body}")]
    InvalidJson { status: u16, body: String },
    #[error("OCR service reported an error: {0}")]
    Processing(String),
    #[error("no ParsedResults[0].ParsedText in OCR response")]
    MissingText,
}

/// Text recognition for a base64-encoded image.
///
/// Implementations never fail: problems come back as [`OcrOutcome::Failed`].
#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn extract_text(&self, base64_image: &str) -> OcrOutcome;
}

/// Client for the OCR.space `parse/image` API.
pub struct OcrSpaceClient {
    client: Client,
    endpoint: String,
    api_key: String,
    language: String,
}

impl OcrSpaceClient {
    pub fn new(client: Client, config: &OcrConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    async fn recognize(&self, base64_image: &str) -> Result<String, OcrError> {
        // OCR.space sniffs the real format, so the PNG prefix is fine for JPEGs too.
        let image_field = data_uri("image/png", base64_image);
        let form = [
            ("base64Image", image_field.as_str()),
            ("language", self.language.as_str()),
            ("isOverlayRequired", "false"),
            ("apikey", self.api_key.as_str()),
        ];

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let json: Value = serde_json::from_str(&body).map_err(|_| OcrError::InvalidJson {
            status,
            body: truncate_for_log(&body),
        })?;

        parse_ocr_response(&json)
    }
}

#[async_trait]
impl OcrProvider for OcrSpaceClient {
    async fn extract_text(&self, base64_image: &str) -> OcrOutcome {
        info!(
            "Sending {} base64 characters to OCR service",
            base64_image.len()
        );
        match self.recognize(base64_image).await {
            Ok(text) => {
                info!("OCR extracted {} characters", text.chars().count());
                OcrOutcome::Recognized(text)
            }
            Err(e) => {
                warn!("OCR failed: {}", e);
                OcrOutcome::Failed(e.to_string())
            }
        }
    }
}

fn parse_ocr_response(json: &Value) -> Result<String, OcrError> {
    if let Some(text) = json["ParsedResults"][0]["ParsedText"].as_str() {
        return Ok(text.trim().to_string());
    }

    if json["IsErroredOnProcessing"].as_bool() == Some(true) {
        let message = match &json["ErrorMessage"] {
            Value::String(message) => message.clone(),
            Value::Array(messages) => messages
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            _ => "unknown error".to_string(),
        };
        return Err(OcrError::Processing(message));
    }

    Err(OcrError::MissingText)
}

fn truncate_for_log(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() > LIMIT {
        format!("{}...", body.chars().take(LIMIT).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, unused_local_url};
    use axum::{Form, Json, Router, routing::post};
    use serde_json::json;
    use std::collections::HashMap;

    fn config(endpoint: String) -> OcrConfig {
        OcrConfig {
            endpoint,
            api_key: "test-ocr-key".to_string(),
            language: "eng".to_string(),
        }
    }

    #[test]
    fn test_parse_ocr_response() {
        let ok = json!({
            "ParsedResults": [{ "ParsedText": "  MRI BRAIN\r\nNo lesion.\r\n" }],
            "IsErroredOnProcessing": false
        });
        assert_eq!(parse_ocr_response(&ok).unwrap(), "MRI BRAIN\r\nNo lesion.");

        let errored = json!({
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["File failed validation.", "Image too large"]
        });
        assert_eq!(
            parse_ocr_response(&errored).unwrap_err().to_string(),
            "OCR service reported an error: File failed validation.; Image too large"
        );

        assert!(matches!(
            parse_ocr_response(&json!({ "ParsedResults": [] })),
            Err(OcrError::MissingText)
        ));
    }

    #[tokio::test]
    async fn test_sends_form_and_reads_parsed_text() {
        let app = Router::new().route(
            "/parse/image",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                assert_eq!(form["base64Image"], "data:image/png;base64,YWJj");
                assert_eq!(form["language"], "eng");
                assert_eq!(form["isOverlayRequired"], "false");
                assert_eq!(form["apikey"], "test-ocr-key");
                Json(json!({
                    "ParsedResults": [{ "ParsedText": "MRI shows mass effect\n" }],
                    "IsErroredOnProcessing": false
                }))
            }),
        );
        let base_url = serve(app).await;

        let ocr_config = config(format!("{}/parse/image", base_url));
        let client = OcrSpaceClient::new(Client::new(), &ocr_config);
        let outcome = client.extract_text("YWJj").await;
        assert_eq!(outcome, OcrOutcome::Recognized("MRI shows mass effect".to_string()));
    }

    #[tokio::test]
    async fn test_non_json_body_becomes_failure() {
        let app = Router::new().route("/parse/image", post(|| async { "Service Unavailable" }));
        let base_url = serve(app).await;

        let ocr_config = config(format!("{}/parse/image", base_url));
        let client = OcrSpaceClient::new(Client::new(), &ocr_config);
        let outcome = client.extract_text("YWJj").await;
        assert!(outcome.is_failure());
        assert!(outcome.to_text().starts_with("OCR failed: "));
        assert!(outcome.to_text().contains("Service Unavailable"));
    }

    #[tokio::test]
    async fn test_unreachable_service_becomes_failure() {
        let client = OcrSpaceClient::new(Client::new(), &config(unused_local_url().await));
        let outcome = client.extract_text("YWJj").await;
        assert!(outcome.to_text().starts_with("OCR failed: request to OCR service failed"));
    }

    /// Live call against OCR.space.
    /// Usage: OCR_SPACE_API_KEY=key cargo test test_live_ocr_space
    #[tokio::test]
    async fn test_live_ocr_space() {
        let Ok(api_key) = std::env::var("OCR_SPACE_API_KEY") else {
            println!("Skipping test - set OCR_SPACE_API_KEY environment variable");
            return;
        };
        let config = OcrConfig {
            api_key,
            ..config(crate::config::DEFAULT_OCR_ENDPOINT.to_string())
        };
        // 1x1 transparent PNG
        let pixel = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
        let outcome = OcrSpaceClient::new(Client::new(), &config).extract_text(pixel).await;
        println!("OCR outcome: {:?}", outcome);
    }
}
