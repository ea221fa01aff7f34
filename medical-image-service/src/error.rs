use graph_flow::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    TaskExecutionFailed(String),

    #[error("Analysis state error: {0}")]
    StateError(String),

    #[error("Workflow error: {0}")]
    Workflow(String),
}

impl From<GraphError> for PipelineError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::TaskExecutionFailed(message) => PipelineError::TaskExecutionFailed(message),
            GraphError::ContextError(message) => PipelineError::StateError(message),
            other => PipelineError::Workflow(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Rejections of the upload form itself, before any task runs.
#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("No image was uploaded")]
    MissingImage,

    #[error("Unsupported file type {0:?}; upload a PNG, JPG or JPEG image")]
    UnsupportedFileType(String),

    #[error("Unsupported language {0:?}; choose English or Hindi")]
    UnsupportedLanguage(String),

    #[error("Failed to read upload: {0}")]
    Malformed(String),
}
