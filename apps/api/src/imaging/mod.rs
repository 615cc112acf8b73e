//! Image generation: one capability interface, several interchangeable backends.
//!
//! The pipeline only sees `ImageGenerator`. Which remote service answers is
//! decided once at startup from `IMAGE_BACKEND`; callers never branch on it.
//!
//! A `None` from `generate_image` or `download` means "no image for this
//! slot". It is never fatal to a pack run.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ImageSettings;

pub mod backends;
pub mod handlers;
pub mod placeholder;

use backends::{DalleBackend, IdeogramBackend, PexelsBackend, UnsplashBackend};
use placeholder::PlaceholderBackend;

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// Enumerated aspect-ratio tokens; each backend maps them to its own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "9:16")]
    Tall,
}

/// Orientation vocabulary used by stock-photo searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "square",
            AspectRatio::Wide => "16:9",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Tall => "9:16",
        }
    }

    /// Pixel dimensions used by the placeholder backend.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Wide => (1920, 1080),
            AspectRatio::Landscape => (1600, 1200),
            AspectRatio::Portrait => (1200, 1600),
            AspectRatio::Tall => (1080, 1920),
        }
    }

    pub fn orientation(&self) -> Orientation {
        match self {
            AspectRatio::Square => Orientation::Square,
            AspectRatio::Wide | AspectRatio::Landscape => Orientation::Landscape,
            AspectRatio::Portrait | AspectRatio::Tall => Orientation::Portrait,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageStyle {
    Auto,
    General,
    Realistic,
    Design,
    #[serde(rename = "render-3d")]
    Render3d,
    Anime,
}

/// Transient result of one image call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    pub prompt: String,
    pub resolution: String,
}

pub struct ImageRequest<'a> {
    pub prompt: &'a str,
    pub aspect: AspectRatio,
    pub style: ImageStyle,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{0} credential not configured")]
    MissingCredential(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response contained no image")]
    Empty,
}

// ────────────────────────────────────────────────────────────────────────────
// Backend selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ideogram,
    Dalle,
    Pexels,
    Unsplash,
    Picsum,
}

#[derive(Debug, Error)]
#[error("unknown image backend '{0}' (expected ideogram, dalle, pexels, unsplash or picsum)")]
pub struct UnknownBackend(String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ideogram" => Ok(BackendKind::Ideogram),
            "dalle" | "dall-e" | "openai" => Ok(BackendKind::Dalle),
            "pexels" => Ok(BackendKind::Pexels),
            "unsplash" => Ok(BackendKind::Unsplash),
            "picsum" | "placeholder" => Ok(BackendKind::Picsum),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

/// One remote (or synthetic) image source.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        http: &Client,
        request: &ImageRequest<'_>,
    ) -> Result<GeneratedImage, ImageError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Capability interface
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        aspect: AspectRatio,
        style: ImageStyle,
    ) -> Option<GeneratedImage>;

    /// Fetches the raw bytes behind an image URL.
    async fn download(&self, url: &str) -> Option<Bytes>;
}

/// Configured image client: one backend plus the optional placeholder fallback.
pub struct ImageClient {
    http: Client,
    backend: Box<dyn ImageBackend>,
    placeholder_fallback: bool,
}

impl ImageClient {
    pub fn new(backend: Box<dyn ImageBackend>, placeholder_fallback: bool) -> Self {
        Self {
            http: Client::new(),
            backend,
            placeholder_fallback,
        }
    }

    pub fn from_settings(settings: &ImageSettings) -> Self {
        let backend: Box<dyn ImageBackend> = match settings.backend {
            BackendKind::Ideogram => {
                Box::new(IdeogramBackend::new(settings.ideogram_api_key.clone()))
            }
            BackendKind::Dalle => Box::new(DalleBackend::new(settings.openai_api_key.clone())),
            BackendKind::Pexels => Box::new(PexelsBackend::new(settings.pexels_api_key.clone())),
            BackendKind::Unsplash => {
                Box::new(UnsplashBackend::new(settings.unsplash_access_key.clone()))
            }
            BackendKind::Picsum => Box::new(PlaceholderBackend),
        };
        Self::new(backend, settings.placeholder_fallback)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate_image(
        &self,
        prompt: &str,
        aspect: AspectRatio,
        style: ImageStyle,
    ) -> Option<GeneratedImage> {
        let request = ImageRequest {
            prompt,
            aspect,
            style,
        };
        let preview: String = prompt.chars().take(100).collect();
        debug!(backend = self.backend.name(), %aspect, "requesting image: {preview}");

        match self.backend.generate(&self.http, &request).await {
            Ok(image) => {
                info!(backend = self.backend.name(), url = %image.url, "image generated");
                Some(image)
            }
            Err(e) if self.placeholder_fallback => {
                warn!(
                    backend = self.backend.name(),
                    "image generation failed ({e}); using placeholder"
                );
                Some(placeholder::placeholder_image(prompt, aspect))
            }
            Err(e) => {
                warn!(backend = self.backend.name(), "image generation failed: {e}");
                None
            }
        }
    }

    async fn download(&self, url: &str) -> Option<Bytes> {
        let response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("image download failed for {url}: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("image download returned {} for {url}", response.status());
            return None;
        }
        match response.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("image download body failed for {url}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FailingBackend;

    #[async_trait]
    impl ImageBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn generate(
            &self,
            _http: &Client,
            _request: &ImageRequest<'_>,
        ) -> Result<GeneratedImage, ImageError> {
            Err(ImageError::Empty)
        }
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("Ideogram".parse::<BackendKind>().unwrap(), BackendKind::Ideogram);
        assert_eq!("dall-e".parse::<BackendKind>().unwrap(), BackendKind::Dalle);
        assert_eq!("placeholder".parse::<BackendKind>().unwrap(), BackendKind::Picsum);
        assert!("stable-diffusion".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_aspect_ratio_orientation() {
        assert_eq!(AspectRatio::Wide.orientation(), Orientation::Landscape);
        assert_eq!(AspectRatio::Tall.orientation(), Orientation::Portrait);
        assert_eq!(AspectRatio::Square.orientation(), Orientation::Square);
        assert_eq!(AspectRatio::Landscape.dimensions(), (1600, 1200));
    }

    #[test]
    fn test_aspect_ratio_serializes_as_token() {
        assert_eq!(serde_json::to_string(&AspectRatio::Wide).unwrap(), "\"16:9\"");
        assert_eq!(serde_json::to_string(&ImageStyle::Render3d).unwrap(), "\"render-3d\"");
    }

    #[tokio::test]
    async fn test_failed_backend_falls_back_to_placeholder() {
        let client = ImageClient::new(Box::new(FailingBackend), true);
        let image = client
            .generate_image("Plumbing in Phoenix", AspectRatio::Wide, ImageStyle::General)
            .await
            .expect("placeholder expected");
        assert!(image.url.starts_with("https://picsum.photos/seed/"));
        assert_eq!(image.resolution, "1920x1080");
    }

    #[tokio::test]
    async fn test_failed_backend_without_fallback_returns_none() {
        let client = ImageClient::new(Box::new(FailingBackend), false);
        let image = client
            .generate_image("anything", AspectRatio::Square, ImageStyle::General)
            .await;
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn test_download_returns_bytes_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
            .mount(&server)
            .await;

        let client = ImageClient::new(Box::new(PlaceholderBackend), false);
        let bytes = client
            .download(&format!("{}/img.png", server.uri()))
            .await
            .unwrap();
        assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_download_non_2xx_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ImageClient::new(Box::new(PlaceholderBackend), false);
        assert!(client
            .download(&format!("{}/missing.png", server.uri()))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_download_unreachable_host_returns_none() {
        let client = ImageClient::new(Box::new(PlaceholderBackend), false);
        assert!(client.download("http://127.0.0.1:9/nothing.png").await.is_none());
    }
}
