//! Axum route handler for the single-image preview.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::events::{CollectingSink, EventSink, PackEvent};
use crate::imaging::{AspectRatio, GeneratedImage, ImageStyle};
use crate::state::AppState;

pub const DEFAULT_PREVIEW_PROMPT: &str = "business professional";

const PREVIEW_ARTIFACT: &str = "image preview";

#[derive(Debug, Default, Deserialize)]
pub struct ImagePreviewRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImagePreviewResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<GeneratedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<String>,
}

/// POST /api/v1/images/preview
///
/// One 16:9 general-style image from the configured backend. Nothing is
/// downloaded or written. A backend that yields nothing answers 502 with the
/// captured log lines.
pub async fn handle_image_preview(
    State(state): State<AppState>,
    payload: Result<Json<ImagePreviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ImagePreviewResponse>), AppError> {
    let Json(request) = payload?;
    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PREVIEW_PROMPT);

    let sink = CollectingSink::new();
    let image = state
        .images
        .generate_image(prompt, AspectRatio::Wide, ImageStyle::General)
        .await;

    let status = match &image {
        Some(img) => {
            sink.emit(PackEvent::ImageGenerated {
                artifact: PREVIEW_ARTIFACT.to_string(),
                url: img.url.clone(),
            });
            StatusCode::OK
        }
        None => {
            sink.emit(PackEvent::ImageSkipped {
                artifact: PREVIEW_ARTIFACT.to_string(),
            });
            StatusCode::BAD_GATEWAY
        }
    };

    let success = image.is_some();
    Ok((
        status,
        Json(ImagePreviewResponse {
            success,
            error: (!success).then(|| "Image generation returned nothing".to_string()),
            image,
            logs: sink.into_lines(),
        }),
    ))
}
