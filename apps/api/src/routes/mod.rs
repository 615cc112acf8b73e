pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::export::handlers as export;
use crate::generation::handlers as packs;
use crate::imaging::handlers as images;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pack API
        .route("/api/v1/packs", post(packs::handle_create_pack))
        .route(
            "/api/v1/packs/blog-preview",
            post(packs::handle_blog_preview),
        )
        // Image API
        .route("/api/v1/images/preview", post(images::handle_image_preview))
        // Export API
        .route(
            "/api/v1/exports/airtable",
            post(export::handle_export_airtable),
        )
        .route(
            "/api/v1/exports/google-docs",
            post(export::handle_export_google_docs),
        )
        .route("/api/v1/exports/csv", post(export::handle_export_csv))
        .with_state(state)
}
