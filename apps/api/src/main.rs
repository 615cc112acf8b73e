mod config;
mod errors;
mod export;
mod generation;
mod imaging;
mod llm_client;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::export::airtable::AirtableExporter;
use crate::export::google_docs::GoogleDocsExporter;
use crate::generation::seed::HttpSeedSource;
use crate::imaging::ImageClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric or enum values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Content Pack API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (templates take over when no key is set)
    let llm = LlmClient::new(&config.llm);
    if llm.is_configured() {
        info!("LLM client initialized (content model: {})", config.llm.content_model);
    } else {
        info!("OPENAI_API_KEY not set; text will come from templates");
    }

    // Initialize image client
    let images = ImageClient::from_settings(&config.images);
    info!(
        "Image client initialized (backend: {}, placeholder fallback: {})",
        images.backend_name(),
        config.images.placeholder_fallback
    );

    info!("Pack output directory: {}", config.output_dir.display());

    // Build app state
    let state = AppState {
        airtable: AirtableExporter::new(&config.airtable),
        google_docs: GoogleDocsExporter::new(&config.google_docs),
        llm: Arc::new(llm),
        images: Arc::new(images),
        seeds: Arc::new(HttpSeedSource::new()),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
