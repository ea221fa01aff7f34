use async_trait::async_trait;
use graph_flow::{Context, GraphError, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{error, info};

use super::{ANALYSIS_KEY, continue_with, load_analysis};
use crate::clients::{TranslationBackend, TranslationError};

const HINDI_CODE: &str = "hi";

pub struct TranslateTask {
    backend: Arc<dyn TranslationBackend>,
}

impl TranslateTask {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Task for TranslateTask {
    fn id(&self) -> &str {
        "translate"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut analysis = load_analysis(&context).await?;
        let report = analysis.analysis_report.clone().ok_or_else(|| {
            GraphError::ContextError("Analysis report not found in analysis".to_string())
        })?;

        let (final_report, failure) =
            translate_response(self.backend.as_ref(), &report, analysis.language.as_str()).await;
        if let Some(e) = failure {
            analysis.add_notice("translation", format!("Translation failed: {}", e));
        }
        analysis.final_report = Some(final_report);
        context.set(ANALYSIS_KEY, analysis).await;

        Ok(continue_with("Report ready"))
    }
}

/// Translate `text` when the target is Hindi; any other language passes through.
///
/// A failed translation returns the original text together with the error.
pub async fn translate_response(
    backend: &dyn TranslationBackend,
    text: &str,
    target_language: &str,
) -> (String, Option<TranslationError>) {
    if !target_language.eq_ignore_ascii_case("hindi") {
        return (text.to_string(), None);
    }

    match backend.translate(text, HINDI_CODE).await {
        Ok(translated) => {
            info!("Report translated to Hindi");
            (translated, None)
        }
        Err(e) => {
            error!("Translation failed: {}", e);
            (text.to_string(), Some(e))
        }
    }
}
