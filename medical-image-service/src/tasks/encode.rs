use async_trait::async_trait;
use graph_flow::{Context, GraphError, Result, Task, TaskResult};
use tracing::info;

use super::{ENCODED_IMAGE_KEY, IMAGE_KEY, continue_with};
use crate::encoding::encode_image;
use crate::models::UploadedImage;

pub struct EncodeImageTask;

#[async_trait]
impl Task for EncodeImageTask {
    fn id(&self) -> &str {
        "encode_image"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let image: UploadedImage = context
            .get(IMAGE_KEY)
            .await
            .ok_or_else(|| GraphError::ContextError("Image not found in context".to_string()))?;

        let encoded = encode_image(image.bytes.as_slice()).map_err(|e| {
            GraphError::TaskExecutionFailed(format!("Failed to read uploaded image: {}", e))
        })?;
        info!(
            "Encoded {} ({} bytes) to {} base64 characters",
            image.file_name,
            image.bytes.len(),
            encoded.len()
        );

        context.set(ENCODED_IMAGE_KEY, encoded).await;
        Ok(continue_with("Image encoded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::tasks::tests::context_with;

    #[tokio::test]
    async fn test_encodes_uploaded_bytes() {
        let (context, _) = context_with(Language::English).await;

        EncodeImageTask.run(context.clone()).await.unwrap();

        let encoded: String = context.get(ENCODED_IMAGE_KEY).await.unwrap();
        assert_eq!(encoded, "YWJj");
    }

    #[tokio::test]
    async fn test_requires_image() {
        let result = EncodeImageTask.run(Context::new()).await;
        assert!(matches!(result, Err(GraphError::ContextError(_))));
    }
}
