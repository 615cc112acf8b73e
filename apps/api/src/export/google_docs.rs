//! Google Docs export: create a document, insert the pack as one text blob,
//! optionally file it into a Drive folder.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{
    ensure_success, join_segments, platform_label, social_platform, ExportData, ExportError,
};
use crate::config::GoogleDocsSettings;

const DOCS_API_BASE: &str = "https://docs.googleapis.com";
const DRIVE_API_BASE: &str = "https://www.googleapis.com";
const HEAVY_RULE: &str = "═══════════════════════════════════════";
const LIGHT_RULE: &str = "───────────────────────────────────────";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

/// Formatted document body: header, blog, social posts, numbered image URLs.
pub fn document_text(data: &ExportData, now: DateTime<Utc>) -> String {
    let mut content = format!(
        "{} - Content Pack\nGenerated: {}\n\n{HEAVY_RULE}\n\n",
        data.business_name,
        now.format("%Y-%m-%d %H:%M UTC")
    );

    if let Some(blog) = data.blog_post() {
        content.push_str(&format!("📝 BLOG POST\n\n{}\n\n{HEAVY_RULE}\n\n", blog.content));
    }

    content.push_str("📱 SOCIAL MEDIA POSTS\n\n");
    for post in data.social_posts() {
        let file_name = post.path.rsplit('/').next().unwrap_or_default();
        let platform = platform_label(social_platform(&post.path).unwrap_or_default());
        content.push_str(&format!(
            "{platform} - {file_name}\n{}\n\n{LIGHT_RULE}\n\n",
            post.content
        ));
    }

    if !data.images.is_empty() {
        content.push_str("\n🖼️ GENERATED IMAGES\n\n");
        for (idx, image) in data.images.iter().enumerate() {
            content.push_str(&format!("{}. {}\n", idx + 1, image.url));
        }
    }

    content
}

#[derive(Clone)]
pub struct GoogleDocsExporter {
    client: Client,
    api_key: Option<String>,
    folder_id: Option<String>,
    docs_base: String,
    drive_base: String,
}

impl GoogleDocsExporter {
    pub fn new(settings: &GoogleDocsSettings) -> Self {
        Self::with_base_urls(settings, DOCS_API_BASE, DRIVE_API_BASE)
    }

    pub fn with_base_urls(settings: &GoogleDocsSettings, docs_base: &str, drive_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone(),
            folder_id: settings.folder_id.clone(),
            docs_base: docs_base.to_string(),
            drive_base: drive_base.to_string(),
        }
    }

    /// Creates and fills the document, returning its edit URL.
    pub async fn export(&self, data: &ExportData, now: DateTime<Utc>) -> Result<String, ExportError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ExportError::NotConfigured(
                "Google Docs credentials not configured. Add GOOGLE_DOCS_API_KEY to environment variables.",
            ));
        };

        // Step 1: Create the document
        let title = format!(
            "{} - Content Pack - {}",
            data.business_name,
            now.format("%Y-%m-%d")
        );
        let create_url = join_segments(&self.docs_base, &["v1", "documents"])?;
        let response = self
            .client
            .post(create_url)
            .bearer_auth(api_key)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        let doc: CreatedDocument = ensure_success("Google Docs", response).await?.json().await?;

        // Step 2: Insert the content
        let update_url = join_segments(
            &self.docs_base,
            &["v1", "documents", &format!("{}:batchUpdate", doc.document_id)],
        )?;
        let response = self
            .client
            .post(update_url)
            .bearer_auth(api_key)
            .json(&json!({
                "requests": [{
                    "insertText": {
                        "location": { "index": 1 },
                        "text": document_text(data, now),
                    }
                }]
            }))
            .send()
            .await?;
        ensure_success("Google Docs", response).await?;

        // Step 3: File into the configured folder; the document exists either way.
        if let Some(folder_id) = self.folder_id.as_deref() {
            self.move_to_folder(api_key, &doc.document_id, folder_id).await;
        }

        info!("exported {} to Google Doc {}", data.business_name, doc.document_id);
        Ok(format!(
            "https://docs.google.com/document/d/{}/edit",
            doc.document_id
        ))
    }

    async fn move_to_folder(&self, api_key: &str, document_id: &str, folder_id: &str) {
        let mut url = match join_segments(&self.drive_base, &["drive", "v3", "files", document_id]) {
            Ok(url) => url,
            Err(e) => {
                warn!("skipping Drive move: {e}");
                return;
            }
        };
        url.query_pairs_mut().append_pair("addParents", folder_id);

        let result = self.client.patch(url).bearer_auth(api_key).send().await;
        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!("Drive move returned {}", response.status()),
            Err(e) => warn!("Drive move failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_export;
    use chrono::TimeZone;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    fn settings(api_key: Option<&str>, folder: Option<&str>) -> GoogleDocsSettings {
        GoogleDocsSettings {
            api_key: api_key.map(str::to_string),
            folder_id: folder.map(str::to_string),
        }
    }

    #[test]
    fn test_document_text_layout() {
        let text = document_text(&sample_export(), now());
        assert!(text.starts_with("Acme - Content Pack\nGenerated: 2026-03-04 12:00 UTC\n"));
        assert!(text.contains("📝 BLOG POST\n\nBlog \"quoted\" text"));
        assert!(text.contains("Facebook - day-1.md\nFB one"));
        assert!(text.contains("Google Business - day-2.md\n"));
        assert!(text.contains("YouTube - title.txt\nYT title"));
        assert!(text.ends_with("1. https://img.test/fb1.png\n2. https://img.test/gbp2.png\n"));
    }

    #[tokio::test]
    async fn test_export_creates_fills_and_files_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/documents"))
            .and(header("authorization", "Bearer gkey"))
            .and(body_partial_json(json!({ "title": "Acme - Content Pack - 2026-03-04" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "documentId": "doc42" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/documents/doc42:batchUpdate"))
            .and(body_partial_json(json!({
                "requests": [{ "insertText": { "location": { "index": 1 } } }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/drive/v3/files/doc42"))
            .and(query_param("addParents", "folder-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let exporter = GoogleDocsExporter::with_base_urls(
            &settings(Some("gkey"), Some("folder-9")),
            &server.uri(),
            &server.uri(),
        );
        let url = exporter.export(&sample_export(), now()).await.unwrap();
        assert_eq!(url, "https://docs.google.com/document/d/doc42/edit");
    }

    #[tokio::test]
    async fn test_no_folder_means_no_drive_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documentId": "d1" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/documents/d1:batchUpdate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let exporter =
            GoogleDocsExporter::with_base_urls(&settings(Some("k"), None), &server.uri(), &server.uri());
        assert!(exporter.export(&sample_export(), now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let exporter =
            GoogleDocsExporter::with_base_urls(&settings(Some("k"), None), &server.uri(), &server.uri());
        let err = exporter.export(&sample_export(), now()).await.unwrap_err();
        assert_eq!(err.to_string(), "Google Docs API error: 403");
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let exporter = GoogleDocsExporter::new(&settings(None, Some("f")));
        let err = exporter.export(&sample_export(), now()).await.unwrap_err();
        assert!(matches!(err, ExportError::NotConfigured(_)));
    }
}
