use std::sync::Arc;

use crate::config::Config;
use crate::export::airtable::AirtableExporter;
use crate::export::google_docs::GoogleDocsExporter;
use crate::generation::seed::SeedSource;
use crate::imaging::ImageGenerator;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every client is read-only and shared across concurrent pack runs.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Text generation. Default: LlmClient against the configured chat endpoint.
    pub llm: Arc<dyn TextGenerator>,
    /// Image generation. Backend chosen by IMAGE_BACKEND.
    pub images: Arc<dyn ImageGenerator>,
    pub seeds: Arc<dyn SeedSource>,
    pub airtable: AirtableExporter,
    pub google_docs: GoogleDocsExporter,
}
