use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::imaging::AspectRatio;

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Professional,
    Friendly,
    Witty,
    Authoritative,
}

impl Voice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Professional => "professional",
            Voice::Friendly => "friendly",
            Voice::Witty => "witty",
            Voice::Authoritative => "authoritative",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub business_name: String,
    pub region: String,
    #[serde(default)]
    pub website: String,
    pub value_prop: String,
    pub voice: Voice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub cta_text: String,
    pub cta_url: String,
}

/// One generation request. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackInput {
    #[serde(default)]
    pub seed_url: Option<String>,
    #[serde(default)]
    pub seed_text: Option<String>,
    #[serde(default)]
    pub angle: Option<String>,
    #[serde(default)]
    pub must_include: Option<String>,
    #[serde(default)]
    pub off_limits: Option<String>,
    pub business: BusinessProfile,
    pub offer: Offer,
    /// Comma-separated keyword list, first entry is the primary keyword.
    pub keywords: String,
    pub timezone: String,
    /// Namespaces every output path of the pack.
    pub slug: String,
}

impl PackInput {
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }

    pub fn primary_keyword(&self) -> &str {
        self.keyword_list()
            .first()
            .copied()
            .unwrap_or("business growth")
    }

    /// `#tag` per keyword with inner whitespace removed.
    pub fn hashtags(&self) -> Vec<String> {
        self.keyword_list()
            .iter()
            .map(|k| format!("#{}", k.split_whitespace().collect::<String>()))
            .collect()
    }

    pub fn seed_url(&self) -> Option<&str> {
        self.seed_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn seed_text(&self) -> Option<&str> {
        self.seed_text.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn angle_or_default(&self) -> &str {
        self.angle
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or("General industry insights")
    }

    /// Rejects requests whose slug or core profile fields cannot produce a pack.
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_url_safe_slug(&self.slug) {
            return Err(AppError::Validation(format!(
                "slug '{}' must be lowercase letters, digits and single hyphens",
                self.slug
            )));
        }
        if self.business.business_name.trim().is_empty() {
            return Err(AppError::Validation(
                "business.businessName cannot be empty".to_string(),
            ));
        }
        if self.business.region.trim().is_empty() {
            return Err(AppError::Validation(
                "business.region cannot be empty".to_string(),
            ));
        }
        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AppError::Validation(format!(
                "timezone '{}' is not an IANA time zone",
                self.timezone
            )));
        }
        Ok(())
    }
}

fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// ────────────────────────────────────────────────────────────────────────────
// Platforms
// ────────────────────────────────────────────────────────────────────────────

/// Social platforms that receive five daily posts, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Linkedin,
    Gbp,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::Gbp,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Gbp => "gbp",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Linkedin => "LinkedIn",
            Platform::Gbp => "Google Business Profile",
        }
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        match self {
            Platform::Facebook | Platform::Linkedin => AspectRatio::Wide,
            Platform::Instagram => AspectRatio::Square,
            Platform::Gbp => AspectRatio::Landscape,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

pub const DAYS: std::ops::RangeInclusive<u8> = 1..=5;

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Image,
}

/// One produced artifact. Image content is base64 encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackFile {
    pub path: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PackFile {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind: FileKind::Text,
            image_url: None,
        }
    }

    pub fn image(path: impl Into<String>, base64: String, source_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: base64,
            kind: FileKind::Image,
            image_url: Some(source_url.into()),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == FileKind::Text
    }
}

/// Review-manifest view of a stored image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// facebook | instagram | linkedin | gbp | youtube | blog
    pub platform: String,
    pub day: Option<u8>,
    /// Site-relative URL once the pack is published (`/images/...`).
    pub public_url: String,
    pub source_url: String,
    pub prompt: String,
    pub path: String,
}

/// Aggregate text-generation accounting for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    pub ai_calls: u32,
    pub template_fallbacks: u32,
    pub tokens_used: u32,
    pub cost: f64,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPack {
    pub slug: String,
    pub files: Vec<PackFile>,
    pub images: Vec<ImageAsset>,
    pub usage: UsageTotals,
}
