//! Seed resolution: turns a seed URL or pasted seed text into plain prose.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::generation::events::{EventSink, PackEvent};
use crate::generation::models::PackInput;

/// Maximum characters written to `seed.txt`.
pub const SEED_FILE_MAX_CHARS: usize = 5000;

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>")
        .expect("static regex")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

static BLOCK_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(p|h[1-6]|li|ul|ol|div|section|article)>|<br\s*/?>").expect("static regex")
});

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li\b[^>]*>").expect("static regex"));

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex"));

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("seed URL returned status {0}")]
    Status(u16),
}

/// Fetches raw seed documents.
#[async_trait]
pub trait SeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, SeedError>;
}

#[derive(Clone, Default)]
pub struct HttpSeedSource {
    client: Client,
}

impl HttpSeedSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedSource for HttpSeedSource {
    async fn fetch(&self, url: &str) -> Result<String, SeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SeedError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Removes scripts, styles and tags, then collapses all whitespace to single spaces.
pub fn strip_markup(html: &str) -> String {
    let without_code = SCRIPT_OR_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_code, " ");
    decode_entities(&without_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain-text rendering of generated blog HTML, keeping paragraph breaks.
pub fn html_to_text(html: &str) -> String {
    let bulleted = LIST_ITEM.replace_all(html, "- ");
    let broken = BLOCK_END.replace_all(&bulleted, "\n");
    let without_tags = TAG.replace_all(&broken, "");
    let decoded = decode_entities(&without_tags);

    let lines: Vec<String> = decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    let joined = lines.join("\n");
    BLANK_RUN.replace_all(joined.trim(), "\n\n").into_owned()
}

/// Resolved seed prose. Pasted text is kept as written; fetched pages are stripped.
/// Empty when the request carried neither URL nor text.
pub async fn resolve_seed(
    input: &PackInput,
    source: &dyn SeedSource,
    events: &dyn EventSink,
) -> String {
    if let Some(text) = input.seed_text() {
        let seed = text.trim().to_string();
        events.emit(PackEvent::SeedResolved {
            source: "text",
            chars: seed.chars().count(),
        });
        return seed;
    }

    let Some(url) = input.seed_url() else {
        return String::new();
    };

    match source.fetch(url).await {
        Ok(body) => {
            let seed = strip_markup(&body);
            debug!("fetched seed document from {url}");
            events.emit(PackEvent::SeedResolved {
                source: "url",
                chars: seed.chars().count(),
            });
            seed
        }
        Err(e) => {
            debug!("seed fetch error for {url}: {e}");
            events.emit(PackEvent::SeedFetchFailed {
                url: url.to_string(),
            });
            format!("Failed to fetch seed from {url}")
        }
    }
}

pub fn truncate_seed(seed: &str) -> String {
    seed.chars().take(SEED_FILE_MAX_CHARS).collect()
}
