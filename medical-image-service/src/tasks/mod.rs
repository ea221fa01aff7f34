pub mod analysis;
pub mod encode;
pub mod glossary;
pub mod ocr;
pub mod translate;

pub use analysis::AnalysisTask;
pub use encode::EncodeImageTask;
pub use glossary::GlossaryTask;
pub use ocr::OcrTask;
pub use translate::TranslateTask;

use graph_flow::{Context, GraphError, NextAction, Result, TaskResult};

use crate::models::ImageAnalysis;

/// Context key of the uploaded image.
pub const IMAGE_KEY: &str = "image";
/// Context key of the base64-encoded image.
pub const ENCODED_IMAGE_KEY: &str = "encoded_image";
/// Context key of the [`ImageAnalysis`] record.
pub const ANALYSIS_KEY: &str = "analysis";

pub(crate) async fn load_analysis(context: &Context) -> Result<ImageAnalysis> {
    context
        .get(ANALYSIS_KEY)
        .await
        .ok_or_else(|| GraphError::ContextError("Analysis not found in context".to_string()))
}

/// Hand over to the next task in the same run.
pub(crate) fn continue_with(status_message: &str) -> TaskResult {
    TaskResult::new_with_status(
        None,
        NextAction::ContinueAndExecute,
        Some(status_message.to_string()),
    )
}
