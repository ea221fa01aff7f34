use anyhow::{Context, Result, anyhow};
use medical_image_service::{
    AppConfig, Language, ServiceClients, UploadedImage, build_analysis_workflow,
    encoding::allowed_extension, html::NO_TERMS_MESSAGE,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Visual Medical Assistant - image analysis");
    println!("=========================================");

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <image_path> [English|Hindi]", args[0]);
        eprintln!("Example: {} /path/to/mri_report.png Hindi", args[0]);
        std::process::exit(1);
    }

    let image_path = &args[1];
    let language: Language = match args.get(2) {
        Some(value) => value.parse()?,
        None => Language::English,
    };

    let extension = allowed_extension(image_path)
        .ok_or_else(|| anyhow!("{} is not a PNG, JPG or JPEG file", image_path))?;
    let bytes = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("Failed to read {}", image_path))?;

    let config = AppConfig::from_env()?;
    let clients = ServiceClients::from_config(&config)?;
    let workflow = build_analysis_workflow(&clients, &config);

    println!("Processing {} ({} bytes) in {}", image_path, bytes.len(), language);
    println!();

    let image = UploadedImage {
        file_name: image_path.clone(),
        extension,
        bytes,
    };

    match workflow.run(image, language).await {
        Ok(response) => {
            println!("Extracted Text (first 500 chars):");
            println!("────────────────────────────────────");
            let preview = if response.extracted_text.chars().count() > 500 {
                let truncated: String = response.extracted_text.chars().take(500).collect();
                format!("{}...", truncated)
            } else {
                response.extracted_text.clone()
            };
            println!("{}", preview);
            println!();

            for notice in &response.notices {
                eprintln!("[{}] {}", notice.stage, notice.message);
            }

            println!("Analysis Report:");
            println!("──────────────────");
            println!("{}", response.report);
            println!();

            println!("Medical Term Explanations:");
            println!("──────────────────────────");
            if response.explanations.is_empty() {
                println!("{}", NO_TERMS_MESSAGE);
            }
            for explanation in &response.explanations {
                println!("{}: {}", explanation.display_term(), explanation.definition);
            }
        }
        Err(e) => {
            eprintln!("Error occurred: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
