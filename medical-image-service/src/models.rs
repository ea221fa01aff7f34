use crate::glossary::TermExplanation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UploadError;

/// Output languages offered by the language selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Hindi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UploadError::UnsupportedLanguage(s.to_string()))
    }
}

/// An image received from the upload form, owned for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub file_name: String,
    /// Lower-cased, one of `png`, `jpg`, `jpeg`.
    pub extension: String,
    #[serde(with = "crate::encoding::base64_bytes")]
    pub bytes: Vec<u8>,
}

/// What the OCR service produced for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum OcrOutcome {
    Recognized(String),
    Failed(String),
}

impl OcrOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, OcrOutcome::Failed(_))
    }

    /// Text handed to later stages; failures read `OCR failed: <details>`.
    pub fn to_text(&self) -> String {
        match self {
            OcrOutcome::Recognized(text) => text.clone(),
            OcrOutcome::Failed(details) => format!("OCR failed: {}", details),
        }
    }
}

/// Inline, non-fatal problem reported alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub stage: String,
    pub message: String,
}

/// Working record for one analysis, filled in task by task.
///
/// Lives in the workflow context under its own key, next to the uploaded
/// image and its base64 encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub id: String,
    pub language: Language,
    pub file_name: String,
    pub started_at: DateTime<Utc>,
    pub ocr: Option<OcrOutcome>,
    pub extracted_text: Option<String>,
    pub analysis_report: Option<String>,
    pub final_report: Option<String>,
    pub explanations: Option<Vec<TermExplanation>>,
    pub notices: Vec<Notice>,
}

impl ImageAnalysis {
    pub fn new(image: &UploadedImage, language: Language) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            language,
            file_name: image.file_name.clone(),
            started_at: Utc::now(),
            ocr: None,
            extracted_text: None,
            analysis_report: None,
            final_report: None,
            explanations: None,
            notices: Vec::new(),
        }
    }

    pub fn add_notice(&mut self, stage: &str, message: impl Into<String>) {
        self.notices.push(Notice {
            stage: stage.to_string(),
            message: message.into(),
        });
    }
}

/// Finished analysis as returned by the JSON API and rendered on the page.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub id: String,
    pub file_name: String,
    pub language: Language,
    pub ocr: OcrOutcome,
    pub extracted_text: String,
    pub report: String,
    pub explanations: Vec<TermExplanation>,
    pub notices: Vec<Notice>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
