use async_trait::async_trait;
use graph_flow::{Context, GraphError, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, warn};

use super::{ANALYSIS_KEY, ENCODED_IMAGE_KEY, continue_with, load_analysis};
use crate::clients::OcrProvider;

pub const TRUNCATION_MARKER: &str = "\n\n[Text truncated for model input]";

pub struct OcrTask {
    provider: Arc<dyn OcrProvider>,
    max_input_chars: usize,
}

impl OcrTask {
    pub fn new(provider: Arc<dyn OcrProvider>, max_input_chars: usize) -> Self {
        Self {
            provider,
            max_input_chars,
        }
    }
}

#[async_trait]
impl Task for OcrTask {
    fn id(&self) -> &str {
        "ocr"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut analysis = load_analysis(&context).await?;
        let encoded: String = context.get(ENCODED_IMAGE_KEY).await.ok_or_else(|| {
            GraphError::ContextError("Encoded image not found in context".to_string())
        })?;

        let outcome = self.provider.extract_text(&encoded).await;
        let text = outcome.to_text();
        if outcome.is_failure() {
            warn!("Continuing without recognized text: {}", text);
            analysis.add_notice("ocr", text.clone());
        }

        let extracted = truncate_for_model(&text, self.max_input_chars);
        info!(
            "Extracted text ready for analysis ({} characters)",
            extracted.chars().count()
        );

        analysis.ocr = Some(outcome);
        analysis.extracted_text = Some(extracted);
        context.set(ANALYSIS_KEY, analysis).await;

        Ok(continue_with("Text extracted from image"))
    }
}

/// Cap `text` at `max_chars` characters, appending the truncation marker when cut.
pub fn truncate_for_model(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
