use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::{ANALYSIS_KEY, load_analysis};
use crate::glossary::explain_terms;

pub struct GlossaryTask;

#[async_trait]
impl Task for GlossaryTask {
    fn id(&self) -> &str {
        "glossary"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut analysis = load_analysis(&context).await?;
        let text = analysis.extracted_text.as_deref().ok_or_else(|| {
            GraphError::ContextError("Extracted text not found in analysis".to_string())
        })?;

        let explanations = explain_terms(text);
        info!("Matched {} glossary terms", explanations.len());
        analysis.explanations = Some(explanations);
        context.set(ANALYSIS_KEY, analysis).await;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::End,
            Some("Medical terms explained".to_string()),
        ))
    }
}
