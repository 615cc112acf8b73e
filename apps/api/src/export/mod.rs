//! Export adapters: push a finished pack to Airtable, Google Docs, or CSV.
//!
//! Each adapter is a single-shot call: no retries, no pagination. Failures are
//! returned as `ExportError` and surfaced to the caller as `{success:false}`.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;
use crate::generation::models::GeneratedPack;

pub mod airtable;
pub mod csv;
pub mod google_docs;
pub mod handlers;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error: {status}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::NotConfigured(msg) => AppError::NotConfigured(msg.to_string()),
            other => AppError::Export(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportImage {
    pub url: String,
    pub path: String,
}

/// Caller-supplied snapshot of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub business_name: String,
    #[serde(default)]
    pub files: Vec<ExportFile>,
    #[serde(default)]
    pub images: Vec<ExportImage>,
}

impl ExportData {
    /// Text files and source image URLs of a generated pack.
    pub fn from_pack(business_name: &str, pack: &GeneratedPack) -> Self {
        Self {
            business_name: business_name.to_string(),
            files: pack
                .files
                .iter()
                .filter(|f| f.is_text())
                .map(|f| ExportFile {
                    path: f.path.clone(),
                    content: f.content.clone(),
                })
                .collect(),
            images: pack
                .images
                .iter()
                .map(|i| ExportImage {
                    url: i.source_url.clone(),
                    path: i.path.clone(),
                })
                .collect(),
        }
    }

    /// Plain-text blog if present, otherwise the blog page.
    pub fn blog_post(&self) -> Option<&ExportFile> {
        self.files
            .iter()
            .find(|f| f.path.ends_with("/blog-post.txt"))
            .or_else(|| self.files.iter().find(|f| is_blog_page(&f.path)))
    }

    pub fn social_posts(&self) -> impl Iterator<Item = &ExportFile> {
        self.files.iter().filter(|f| social_platform(&f.path).is_some())
    }
}

fn is_blog_page(path: &str) -> bool {
    path.trim_start_matches('/').starts_with("app/blog/")
}

/// Platform segment of a `social/{platform}/...` path.
pub fn social_platform(path: &str) -> Option<&str> {
    let mut segments = path.trim_start_matches('/').split('/');
    while let Some(segment) = segments.next() {
        if segment == "social" {
            return segments.next().filter(|p| !p.is_empty());
        }
    }
    None
}

pub fn platform_label(platform: &str) -> &'static str {
    match platform {
        "facebook" => "Facebook",
        "instagram" => "Instagram",
        "linkedin" => "LinkedIn",
        "gbp" => "Google Business",
        "youtube" => "YouTube",
        _ => "Social",
    }
}

/// Numeric part of a `day-N` path segment.
pub fn day_of(path: &str) -> Option<&str> {
    path.split('/')
        .filter_map(|s| s.strip_prefix("day-"))
        .map(|s| s.trim_end_matches(|c: char| !c.is_ascii_digit()))
        .find(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()))
}

/// `base` with each segment percent-encoded and appended to its path.
pub(crate) fn join_segments(base: &str, segments: &[&str]) -> Result<Url, ExportError> {
    let mut url = Url::parse(base).map_err(|e| ExportError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ExportError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Maps a non-2xx response to `ExportError::Api`.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ExportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!("{service} API error: status={status} body={body}");
    Err(ExportError::Api {
        service,
        status: status.as_u16(),
        body,
    })
}
