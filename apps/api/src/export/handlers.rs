//! Axum route handlers for the Export API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::export::csv::generate_csv;
use crate::export::ExportData;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirtableExportResponse {
    pub success: bool,
    pub record_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleDocsExportResponse {
    pub success: bool,
    pub doc_url: String,
}

#[derive(Debug, Serialize)]
pub struct CsvExportResponse {
    pub success: bool,
    pub csv: String,
}

fn validate(data: &ExportData) -> Result<(), AppError> {
    if data.business_name.trim().is_empty() {
        return Err(AppError::Validation(
            "businessName cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/exports/airtable
pub async fn handle_export_airtable(
    State(state): State<AppState>,
    payload: Result<Json<ExportData>, JsonRejection>,
) -> Result<Json<AirtableExportResponse>, AppError> {
    let Json(data) = payload?;
    validate(&data)?;
    let record_url = state.airtable.export(&data, Utc::now()).await?;
    Ok(Json(AirtableExportResponse {
        success: true,
        record_url,
    }))
}

/// POST /api/v1/exports/google-docs
pub async fn handle_export_google_docs(
    State(state): State<AppState>,
    payload: Result<Json<ExportData>, JsonRejection>,
) -> Result<Json<GoogleDocsExportResponse>, AppError> {
    let Json(data) = payload?;
    validate(&data)?;
    let doc_url = state.google_docs.export(&data, Utc::now()).await?;
    Ok(Json(GoogleDocsExportResponse {
        success: true,
        doc_url,
    }))
}

/// POST /api/v1/exports/csv
///
/// Pure transformation; never calls out.
pub async fn handle_export_csv(
    payload: Result<Json<ExportData>, JsonRejection>,
) -> Result<Json<CsvExportResponse>, AppError> {
    let Json(data) = payload?;
    validate(&data)?;
    Ok(Json(CsvExportResponse {
        success: true,
        csv: generate_csv(&data),
    }))
}
