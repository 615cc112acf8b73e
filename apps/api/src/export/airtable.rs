//! Airtable export: one record per pack.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ensure_success, join_segments, ExportData, ExportError};
use crate::config::AirtableSettings;

const AIRTABLE_API_BASE: &str = "https://api.airtable.com";
const AIRTABLE_WEB_BASE: &str = "https://airtable.com";
const SOCIAL_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Serialize)]
struct CreateRecord<'a> {
    fields: RecordFields<'a>,
}

#[derive(Debug, Serialize)]
struct RecordFields<'a> {
    #[serde(rename = "Business Name")]
    business_name: &'a str,
    #[serde(rename = "Blog Post")]
    blog_post: &'a str,
    #[serde(rename = "Social Posts")]
    social_posts: String,
    #[serde(rename = "Image URLs")]
    image_urls: String,
    #[serde(rename = "Created At")]
    created_at: String,
    #[serde(rename = "Status")]
    status: &'static str,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    id: String,
}

#[derive(Clone)]
pub struct AirtableExporter {
    client: Client,
    api_key: Option<String>,
    base_id: Option<String>,
    table: String,
    base_url: String,
}

impl AirtableExporter {
    pub fn new(settings: &AirtableSettings) -> Self {
        Self::with_base_url(settings, AIRTABLE_API_BASE)
    }

    pub fn with_base_url(settings: &AirtableSettings, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone(),
            base_id: settings.base_id.clone(),
            table: settings.table_id.clone(),
            base_url: base_url.to_string(),
        }
    }

    /// Creates a draft record and returns its web URL.
    pub async fn export(&self, data: &ExportData, now: DateTime<Utc>) -> Result<String, ExportError> {
        let (Some(api_key), Some(base_id)) = (self.api_key.as_deref(), self.base_id.as_deref())
        else {
            return Err(ExportError::NotConfigured(
                "Airtable credentials not configured. Add AIRTABLE_API_KEY and AIRTABLE_BASE_ID to environment variables.",
            ));
        };

        let body = CreateRecord {
            fields: RecordFields {
                business_name: &data.business_name,
                blog_post: data.blog_post().map(|f| f.content.as_str()).unwrap_or_default(),
                social_posts: data
                    .social_posts()
                    .map(|f| f.content.as_str())
                    .collect::<Vec<_>>()
                    .join(SOCIAL_SEPARATOR),
                image_urls: data
                    .images
                    .iter()
                    .map(|i| i.url.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
                created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                status: "Draft",
            },
        };

        let endpoint = join_segments(&self.base_url, &["v0", base_id, &self.table])?;
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let record: CreatedRecord = ensure_success("Airtable", response).await?.json().await?;

        let record_url = join_segments(AIRTABLE_WEB_BASE, &[base_id, &self.table, &record.id])?;
        info!("exported {} to Airtable record {}", data.business_name, record.id);
        Ok(record_url.to_string())
    }
}
