use anyhow::{Context, Result};
use pdf_query_api::{app, AppState, Config, PdfTextExtractor, UploadStore};
use pdf_rag::{GeminiService, QueryService};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("Server failed: {:#}", e);
        eprintln!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;

    let store = UploadStore::new(&config.upload_dir, config.upload_naming);
    if let Err(e) = store.ensure_dir().await {
        log::error!("Error creating upload directory {}: {}", store.dir().display(), e);
    }

    let query_service = QueryService::new(GeminiService::from_env()?, &config.upload_dir)?
        .with_limits(config.max_results, config.max_context_tokens);

    let state = Arc::new(AppState {
        store,
        extractor: Arc::new(PdfTextExtractor),
        query_processor: Arc::new(query_service),
        max_upload_bytes: config.max_upload_bytes,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    log::info!(
        "Listening on {} (uploads in {}, naming {})",
        listener.local_addr()?,
        config.upload_dir.display(),
        config.upload_naming
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
