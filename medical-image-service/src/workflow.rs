use chrono::Utc;
use graph_flow::{
    ExecutionStatus, FlowRunner, Graph, GraphBuilder, InMemorySessionStorage, Session,
    SessionStorage, Task,
};
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};

use crate::clients::{
    ChatCompletion, GoogleTranslateClient, GroqChatClient, OcrProvider, OcrSpaceClient,
    TranslationBackend, build_http_client,
};
use crate::config::AppConfig;
use crate::error::{PipelineError, Result};
use crate::models::{AnalysisResponse, ImageAnalysis, Language, UploadedImage};
use crate::tasks::{
    ANALYSIS_KEY, AnalysisTask, EncodeImageTask, GlossaryTask, IMAGE_KEY, OcrTask, TranslateTask,
};

/// The analysis graph plus the order its tasks run in.
pub struct Workflow {
    graph: Arc<Graph>,
    task_ids: Vec<String>,
}

impl Workflow {
    pub fn task_ids(&self) -> Vec<&str> {
        self.task_ids.iter().map(String::as_str).collect()
    }

    /// Run the graph to completion for one uploaded image.
    ///
    /// Each run gets its own in-memory session; nothing outlives the request.
    /// The first task error ends the run; stages that degrade gracefully
    /// record notices on the analysis instead.
    pub async fn run(&self, image: UploadedImage, language: Language) -> Result<AnalysisResponse> {
        let analysis = ImageAnalysis::new(&image, language);
        let session_id = analysis.id.clone();
        let span = info_span!("analysis", analysis_id = %session_id, language = %language);

        async {
            info!("Starting analysis of {}", image.file_name);
            let start_task_id = self.task_ids.first().ok_or_else(|| {
                PipelineError::Workflow("Analysis graph has no tasks".to_string())
            })?;

            let session = Session::new_from_task(session_id.clone(), start_task_id);
            session.context.set(IMAGE_KEY, image).await;
            session.context.set(ANALYSIS_KEY, analysis).await;

            let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
            session_storage.save(session).await?;
            let flow_runner = FlowRunner::new(self.graph.clone(), session_storage.clone());

            let mut completed = false;
            for _ in 0..self.task_ids.len() {
                let result = flow_runner.run(&session_id).await?;
                debug!("Workflow step finished: {:?}", result.status);
                match result.status {
                    ExecutionStatus::Completed => {
                        completed = true;
                        break;
                    }
                    ExecutionStatus::Error(message) => {
                        return Err(PipelineError::TaskExecutionFailed(message));
                    }
                    _ => {}
                }
            }
            if !completed {
                return Err(PipelineError::Workflow(
                    "Analysis graph stopped before completing".to_string(),
                ));
            }

            let session = session_storage
                .get(&session_id)
                .await?
                .ok_or_else(|| PipelineError::StateError("Session not found".to_string()))?;
            let analysis: ImageAnalysis = session
                .context
                .get(ANALYSIS_KEY)
                .await
                .ok_or_else(|| PipelineError::StateError("Analysis not found".to_string()))?;

            info!("Analysis completed with {} notice(s)", analysis.notices.len());
            finish(analysis)
        }
        .instrument(span)
        .await
    }
}

fn finish(analysis: ImageAnalysis) -> Result<AnalysisResponse> {
    let missing = |what: &str| PipelineError::StateError(format!("{} not produced", what));

    Ok(AnalysisResponse {
        ocr: analysis.ocr.ok_or_else(|| missing("OCR outcome"))?,
        extracted_text: analysis.extracted_text.ok_or_else(|| missing("Extracted text"))?,
        report: analysis.final_report.ok_or_else(|| missing("Final report"))?,
        explanations: analysis.explanations.ok_or_else(|| missing("Term explanations"))?,
        id: analysis.id,
        file_name: analysis.file_name,
        language: analysis.language,
        notices: analysis.notices,
        started_at: analysis.started_at,
        completed_at: Utc::now(),
    })
}

/// External services the workflow talks to.
#[derive(Clone)]
pub struct ServiceClients {
    pub ocr: Arc<dyn OcrProvider>,
    pub chat: Arc<dyn ChatCompletion>,
    pub translator: Arc<dyn TranslationBackend>,
}

impl ServiceClients {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = build_http_client(config.request_timeout)?;
        Ok(Self {
            ocr: Arc::new(OcrSpaceClient::new(http.clone(), &config.ocr)),
            chat: Arc::new(GroqChatClient::new(http.clone(), config.chat.clone())),
            translator: Arc::new(GoogleTranslateClient::new(http, &config.translation)),
        })
    }
}

/// Encode → OCR (+ truncation) → analysis → translation → glossary.
pub fn build_analysis_workflow(clients: &ServiceClients, config: &AppConfig) -> Workflow {
    let encode_task = Arc::new(EncodeImageTask);
    let encode_id = encode_task.id().to_string();

    let ocr_task = Arc::new(OcrTask::new(clients.ocr.clone(), config.max_input_chars));
    let ocr_id = ocr_task.id().to_string();

    let analysis_task = Arc::new(AnalysisTask::new(
        clients.chat.clone(),
        config.analyze_on_ocr_failure,
    ));
    let analysis_id = analysis_task.id().to_string();

    let translate_task = Arc::new(TranslateTask::new(clients.translator.clone()));
    let translate_id = translate_task.id().to_string();

    let glossary_task = Arc::new(GlossaryTask);
    let glossary_id = glossary_task.id().to_string();

    let graph = GraphBuilder::new("image_analysis_workflow")
        .add_task(encode_task)
        .add_task(ocr_task)
        .add_task(analysis_task)
        .add_task(translate_task)
        .add_task(glossary_task)
        .add_edge(&encode_id, &ocr_id)
        .add_edge(&ocr_id, &analysis_id)
        .add_edge(&analysis_id, &translate_id)
        .add_edge(&translate_id, &glossary_id)
        .build();

    Workflow {
        graph: Arc::new(graph),
        task_ids: vec![encode_id, ocr_id, analysis_id, translate_id, glossary_id],
    }
}
