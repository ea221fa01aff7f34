use async_trait::async_trait;
use graph_flow::{Context, GraphError, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{ANALYSIS_KEY, continue_with, load_analysis};
use crate::clients::{ChatCompletion, ChatReply};

pub const ANALYSIS_FAILED_MESSAGE: &str =
    "❌ Analysis failed due to an unexpected response from the API.";

pub struct AnalysisTask {
    chat: Arc<dyn ChatCompletion>,
    analyze_on_ocr_failure: bool,
}

impl AnalysisTask {
    pub fn new(chat: Arc<dyn ChatCompletion>, analyze_on_ocr_failure: bool) -> Self {
        Self {
            chat,
            analyze_on_ocr_failure,
        }
    }
}

#[async_trait]
impl Task for AnalysisTask {
    fn id(&self) -> &str {
        "analysis"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut analysis = load_analysis(&context).await?;
        let text = analysis.extracted_text.clone().ok_or_else(|| {
            GraphError::ContextError("Extracted text not found in analysis".to_string())
        })?;

        let ocr_failed = analysis.ocr.as_ref().is_some_and(|ocr| ocr.is_failure());
        if ocr_failed && !self.analyze_on_ocr_failure {
            warn!("Skipping language model analysis because OCR failed");
            analysis.analysis_report = Some(format!("❌ Analysis skipped: {}", text));
            context.set(ANALYSIS_KEY, analysis).await;
            return Ok(continue_with("Analysis skipped after OCR failure"));
        }

        let prompt = build_prompt(&text, analysis.language.as_str());
        let reply = self
            .chat
            .complete(&prompt)
            .await
            .map_err(|e| GraphError::TaskExecutionFailed(e.to_string()))?;

        let report = match reply {
            ChatReply::Content(content) => {
                info!("Received analysis ({} characters)", content.chars().count());
                content
            }
            ChatReply::Unexpected(body) => {
                error!("Unexpected chat completion response");
                analysis.add_notice("analysis", format!("Unexpected response format: {}", body));
                ANALYSIS_FAILED_MESSAGE.to_string()
            }
        };

        analysis.analysis_report = Some(report);
        context.set(ANALYSIS_KEY, analysis).await;
        Ok(continue_with("Analysis generated"))
    }
}

pub fn build_prompt(text: &str, language: &str) -> String {
    format!(
        "Please analyze the following medical image description and provide insights in {}:\n\n{}",
        language, text
    )
}
