//! Axum route handlers for the Pack API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::ExportData;
use crate::generation::events::{CollectingSink, EventSink, TracingSink};
use crate::generation::models::{PackInput, UsageTotals};
use crate::generation::pipeline::{generate_blog_preview, generate_pack, PackServices};
use crate::state::AppState;
use crate::storage::{persist_pack, BundleFile, PersistOutcome};

pub const BUNDLE_MESSAGE: &str = "Files generated. Copy these into your repository:";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PackDelivery {
    Written { message: String, paths: Vec<String> },
    Bundle { message: String, files: Vec<BundleFile> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackResponse {
    pub success: bool,
    #[serde(flatten)]
    pub delivery: PackDelivery,
    pub usage: UsageTotals,
    /// Ready-made body for the export endpoints.
    pub export_data: ExportData,
}

#[derive(Debug, Serialize)]
pub struct BlogPreviewResponse {
    pub success: bool,
    pub blog: String,
    pub logs: Vec<String>,
}

fn services<'a>(state: &'a AppState, events: &'a dyn EventSink) -> PackServices<'a> {
    PackServices {
        llm: state.llm.as_ref(),
        images: state.images.as_ref(),
        seeds: state.seeds.as_ref(),
        events,
        content_model: &state.config.llm.content_model,
        image_cost_estimate: state.config.images.cost_estimate,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/packs
///
/// Generates the full pack, then writes it under PACK_OUTPUT_DIR.
/// When the write fails the files come back in the response instead.
pub async fn handle_create_pack(
    State(state): State<AppState>,
    payload: Result<Json<PackInput>, JsonRejection>,
) -> Result<Json<CreatePackResponse>, AppError> {
    let Json(input) = payload?;
    input.validate()?;

    let sink = TracingSink;
    let pack = generate_pack(&input, &services(&state, &sink), Utc::now()).await;

    let delivery = match persist_pack(&state.config.output_dir, &pack.files).await {
        PersistOutcome::Written { paths } => PackDelivery::Written {
            message: format!("Successfully created {} files locally.", paths.len()),
            paths,
        },
        PersistOutcome::Bundle { files, reason } => {
            info!("returning pack {} as bundle: {reason}", pack.slug);
            PackDelivery::Bundle {
                message: BUNDLE_MESSAGE.to_string(),
                files,
            }
        }
    };

    Ok(Json(CreatePackResponse {
        success: true,
        delivery,
        usage: pack.usage,
        export_data: ExportData::from_pack(&input.business.business_name, &pack),
    }))
}

/// POST /api/v1/packs/blog-preview
///
/// Blog body only, with the run's event lines. Nothing is written.
pub async fn handle_blog_preview(
    State(state): State<AppState>,
    payload: Result<Json<PackInput>, JsonRejection>,
) -> Result<Json<BlogPreviewResponse>, AppError> {
    let Json(input) = payload?;
    input.validate()?;

    let sink = CollectingSink::new();
    let blog = generate_blog_preview(&input, &services(&state, &sink)).await;

    Ok(Json(BlogPreviewResponse {
        success: true,
        blog,
        logs: sink.into_lines(),
    }))
}
