//! Remote image backends. Each one owns its credential and base URL and maps
//! the shared aspect/style vocabulary onto its own request format.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use super::placeholder::extract_keywords;
use super::{
    AspectRatio, GeneratedImage, ImageBackend, ImageError, ImageRequest, ImageStyle, Orientation,
};

const IDEOGRAM_BASE: &str = "https://api.ideogram.ai";
const OPENAI_BASE: &str = "https://api.openai.com";
const PEXELS_BASE: &str = "https://api.pexels.com";
const UNSPLASH_BASE: &str = "https://api.unsplash.com";

async fn ensure_success(response: Response) -> Result<Response, ImageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ImageError::Api {
        status: status.as_u16(),
        message,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Ideogram
// ────────────────────────────────────────────────────────────────────────────

pub struct IdeogramBackend {
    api_key: Option<String>,
    base_url: String,
}

impl IdeogramBackend {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, IDEOGRAM_BASE)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn ideogram_aspect(aspect: AspectRatio) -> &'static str {
    match aspect {
        AspectRatio::Square => "ASPECT_1_1",
        AspectRatio::Wide => "ASPECT_16_9",
        AspectRatio::Landscape => "ASPECT_4_3",
        AspectRatio::Portrait => "ASPECT_3_4",
        AspectRatio::Tall => "ASPECT_9_16",
    }
}

fn ideogram_style(style: ImageStyle) -> &'static str {
    match style {
        ImageStyle::Auto => "AUTO",
        ImageStyle::General => "GENERAL",
        ImageStyle::Realistic => "REALISTIC",
        ImageStyle::Design => "DESIGN",
        ImageStyle::Render3d => "RENDER_3D",
        ImageStyle::Anime => "ANIME",
    }
}

#[derive(Deserialize)]
struct IdeogramResponse {
    #[serde(default)]
    data: Vec<IdeogramImage>,
}

#[derive(Deserialize)]
struct IdeogramImage {
    url: String,
    prompt: Option<String>,
    resolution: Option<String>,
}

#[async_trait]
impl ImageBackend for IdeogramBackend {
    fn name(&self) -> &'static str {
        "ideogram"
    }

    async fn generate(
        &self,
        http: &Client,
        request: &ImageRequest<'_>,
    ) -> Result<GeneratedImage, ImageError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ImageError::MissingCredential("IDEOGRAM_API_KEY"))?;

        let body = json!({
            "image_request": {
                "prompt": request.prompt,
                "aspect_ratio": ideogram_aspect(request.aspect),
                "model": "V_2_TURBO",
                "magic_prompt_option": "AUTO",
                "style_type": ideogram_style(request.style),
            }
        });

        let response = http
            .post(format!("{}/generate", self.base_url))
            .header("Api-Key", api_key)
            .json(&body)
            .send()
            .await?;
        let payload: IdeogramResponse = ensure_success(response).await?.json().await?;

        let image = payload.data.into_iter().next().ok_or(ImageError::Empty)?;
        Ok(GeneratedImage {
            url: image.url,
            prompt: image.prompt.unwrap_or_else(|| request.prompt.to_string()),
            resolution: image.resolution.unwrap_or_else(|| "1024x1024".to_string()),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DALL-E
// ────────────────────────────────────────────────────────────────────────────

pub struct DalleBackend {
    api_key: Option<String>,
    base_url: String,
}

impl DalleBackend {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// DALL-E 3 only offers three sizes; pick the closest orientation.
fn dalle_size(aspect: AspectRatio) -> &'static str {
    match aspect.orientation() {
        Orientation::Square => "1024x1024",
        Orientation::Landscape => "1792x1024",
        Orientation::Portrait => "1024x1792",
    }
}

fn dalle_style(style: ImageStyle) -> &'static str {
    match style {
        ImageStyle::Design | ImageStyle::Render3d | ImageStyle::Anime => "vivid",
        ImageStyle::Auto | ImageStyle::General | ImageStyle::Realistic => "natural",
    }
}

#[derive(Deserialize)]
struct DalleResponse {
    #[serde(default)]
    data: Vec<DalleImage>,
}

#[derive(Deserialize)]
struct DalleImage {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[async_trait]
impl ImageBackend for DalleBackend {
    fn name(&self) -> &'static str {
        "dalle"
    }

    async fn generate(
        &self,
        http: &Client,
        request: &ImageRequest<'_>,
    ) -> Result<GeneratedImage, ImageError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ImageError::MissingCredential("OPENAI_API_KEY"))?;
        let size = dalle_size(request.aspect);

        let body = json!({
            "model": "dall-e-3",
            "prompt": request.prompt,
            "n": 1,
            "size": size,
            "style": dalle_style(request.style),
        });

        let response = http
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let payload: DalleResponse = ensure_success(response).await?.json().await?;

        let image = payload.data.into_iter().next().ok_or(ImageError::Empty)?;
        let url = image.url.ok_or(ImageError::Empty)?;
        Ok(GeneratedImage {
            url,
            prompt: image
                .revised_prompt
                .unwrap_or_else(|| request.prompt.to_string()),
            resolution: size.to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pexels (stock search)
// ────────────────────────────────────────────────────────────────────────────

pub struct PexelsBackend {
    api_key: Option<String>,
    base_url: String,
}

impl PexelsBackend {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, PEXELS_BASE)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn pexels_orientation(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Landscape => "landscape",
        Orientation::Portrait => "portrait",
        Orientation::Square => "square",
    }
}

#[derive(Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Deserialize)]
struct PexelsPhoto {
    width: u32,
    height: u32,
    src: PexelsSrc,
}

#[derive(Deserialize)]
struct PexelsSrc {
    large2x: String,
}

#[async_trait]
impl ImageBackend for PexelsBackend {
    fn name(&self) -> &'static str {
        "pexels"
    }

    async fn generate(
        &self,
        http: &Client,
        request: &ImageRequest<'_>,
    ) -> Result<GeneratedImage, ImageError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ImageError::MissingCredential("PEXELS_API_KEY"))?;
        let query = extract_keywords(request.prompt);

        let response = http
            .get(format!("{}/v1/search", self.base_url))
            .header("Authorization", api_key)
            .query(&[
                ("query", query.as_str()),
                ("per_page", "1"),
                ("orientation", pexels_orientation(request.aspect.orientation())),
            ])
            .send()
            .await?;
        let payload: PexelsResponse = ensure_success(response).await?.json().await?;

        let photo = payload.photos.into_iter().next().ok_or(ImageError::Empty)?;
        Ok(GeneratedImage {
            url: photo.src.large2x,
            prompt: query,
            resolution: format!("{}x{}", photo.width, photo.height),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Unsplash (stock search)
// ────────────────────────────────────────────────────────────────────────────

pub struct UnsplashBackend {
    access_key: Option<String>,
    base_url: String,
}

impl UnsplashBackend {
    pub fn new(access_key: Option<String>) -> Self {
        Self::with_base_url(access_key, UNSPLASH_BASE)
    }

    pub fn with_base_url(access_key: Option<String>, base_url: &str) -> Self {
        Self {
            access_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn unsplash_orientation(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Landscape => "landscape",
        Orientation::Portrait => "portrait",
        Orientation::Square => "squarish",
    }
}

#[derive(Deserialize)]
struct UnsplashResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Deserialize)]
struct UnsplashPhoto {
    width: u32,
    height: u32,
    urls: UnsplashUrls,
    alt_description: Option<String>,
}

#[derive(Deserialize)]
struct UnsplashUrls {
    regular: String,
}

#[async_trait]
impl ImageBackend for UnsplashBackend {
    fn name(&self) -> &'static str {
        "unsplash"
    }

    async fn generate(
        &self,
        http: &Client,
        request: &ImageRequest<'_>,
    ) -> Result<GeneratedImage, ImageError> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or(ImageError::MissingCredential("UNSPLASH_ACCESS_KEY"))?;
        let query = extract_keywords(request.prompt);

        let response = http
            .get(format!("{}/search/photos", self.base_url))
            .header("Authorization", format!("Client-ID {access_key}"))
            .query(&[
                ("query", query.as_str()),
                ("per_page", "1"),
                ("orientation", unsplash_orientation(request.aspect.orientation())),
            ])
            .send()
            .await?;
        let payload: UnsplashResponse = ensure_success(response).await?.json().await?;

        let photo = payload.results.into_iter().next().ok_or(ImageError::Empty)?;
        Ok(GeneratedImage {
            url: photo.urls.regular,
            prompt: photo.alt_description.unwrap_or(query),
            resolution: format!("{}x{}", photo.width, photo.height),
        })
    }
}
