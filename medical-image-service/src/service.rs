use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    middleware::from_fn,
    response::{Html, Json},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
    config::AppConfig,
    encoding::{allowed_extension, data_uri, encode_image, mime_type_for_extension},
    error::UploadError,
    html::{PageContent, Thumbnail, render_page},
    models::{AnalysisResponse, Language, UploadedImage},
    telemetry::correlation_id_middleware,
    workflow::{ServiceClients, Workflow, build_analysis_workflow},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
}

pub fn create_app(config: &AppConfig) -> anyhow::Result<Router> {
    let clients = ServiceClients::from_config(config)?;
    Ok(create_app_with_clients(config, &clients))
}

/// Build the router around already constructed service clients.
pub fn create_app_with_clients(config: &AppConfig, clients: &ServiceClients) -> Router {
    let app_state = AppState {
        workflow: Arc::new(build_analysis_workflow(clients, config)),
    };
    build_router(app_state, config.server.max_upload_bytes)
}

fn build_router(app_state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_page))
        .route("/api/analyze", post(analyze_api))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

async fn index() -> Html<String> {
    Html(render_page(Language::default(), None, PageContent::Idle))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Form submission from the page: always answers with a rendered page.
async fn analyze_page(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let (image, language) = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!("Rejected upload: {}", e);
            let page = render_page(Language::default(), None, PageContent::Failed(&e.to_string()));
            return (StatusCode::BAD_REQUEST, Html(page));
        }
    };

    let thumbnail = thumbnail_for(&image);
    let page = match state.workflow.run(image, language).await {
        Ok(response) => render_page(
            language,
            thumbnail.as_ref(),
            PageContent::Completed(&response),
        ),
        Err(e) => {
            error!("Analysis failed: {}", e);
            render_page(language, thumbnail.as_ref(), PageContent::Failed(&e.to_string()))
        }
    };

    (StatusCode::OK, Html(page))
}

async fn analyze_api(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<AnalysisResponse> {
    let (image, language) = read_upload(multipart)
        .await
        .map_err(|e| bad_request_error(&e.to_string()))?;

    info!("Starting API analysis for: {}", image.file_name);

    state.workflow.run(image, language).await.map(Json).map_err(|e| {
        error!("Analysis failed: {}", e);
        internal_error("Image analysis failed", &e.to_string())
    })
}

/// Pull the `language` and `image` fields out of the form.
async fn read_upload(mut multipart: Multipart) -> Result<(UploadedImage, Language), UploadError> {
    let mut language = Language::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Malformed(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| UploadError::Malformed(e.to_string()))?;
                language = value.parse()?;
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::Malformed(e.to_string()))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let extension = allowed_extension(&file_name)
                    .ok_or_else(|| UploadError::UnsupportedFileType(file_name.clone()))?;
                image = Some(UploadedImage {
                    file_name,
                    extension,
                    bytes: bytes.to_vec(),
                });
            }
            other => warn!("Ignoring unexpected form field '{}'", other),
        }
    }

    let image = image.ok_or(UploadError::MissingImage)?;
    Ok((image, language))
}

fn thumbnail_for(image: &UploadedImage) -> Option<Thumbnail> {
    let encoded = encode_image(image.bytes.as_slice()).ok()?;
    Some(Thumbnail {
        data_uri: data_uri(mime_type_for_extension(&image.extension), &encoded),
    })
}
