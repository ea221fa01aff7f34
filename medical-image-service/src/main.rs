use medical_image_service::{AppConfig, create_app, telemetry::init_tracing};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        ocr_endpoint = %config.ocr.endpoint,
        chat_endpoint = %config.chat.endpoint,
        model = %config.chat.model,
        "Configuration loaded"
    );

    let app = create_app(&config)?;
    let listener = TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;

    info!("Visual Medical Assistant starting on {}", addr);
    info!("Open http://{}/ in a browser to upload an image", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("JSON endpoint: POST http://{}/api/analyze", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
