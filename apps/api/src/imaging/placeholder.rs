//! Keyword-seeded placeholder images. No network, no credential.

use async_trait::async_trait;
use reqwest::Client;

use super::{AspectRatio, GeneratedImage, ImageBackend, ImageError, ImageRequest};

const PICSUM_BASE: &str = "https://picsum.photos/seed";

/// Words too generic to be useful as search or seed terms.
const STOP_WORDS: &[&str] = &[
    "professional",
    "business",
    "image",
    "for",
    "company",
    "theme",
    "style",
    "modern",
    "clean",
    "related",
    "to",
];

/// Picks up to three descriptive words from an image prompt.
pub fn extract_keywords(prompt: &str) -> String {
    let normalized: String = prompt
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    let words: Vec<&str> = normalized
        .split_whitespace()
        .filter(|w| w.len() > 3 && !STOP_WORDS.contains(w))
        .take(3)
        .collect();

    if words.is_empty() {
        "business professional".to_string()
    } else {
        words.join(" ")
    }
}

/// Deterministic placeholder: same prompt and aspect always yield the same URL.
pub fn placeholder_image(prompt: &str, aspect: AspectRatio) -> GeneratedImage {
    let (width, height) = aspect.dimensions();
    let seed = extract_keywords(prompt).replace(' ', "-");
    GeneratedImage {
        url: format!("{PICSUM_BASE}/{seed}/{width}/{height}"),
        prompt: prompt.to_string(),
        resolution: format!("{width}x{height}"),
    }
}

pub struct PlaceholderBackend;

#[async_trait]
impl ImageBackend for PlaceholderBackend {
    fn name(&self) -> &'static str {
        "picsum"
    }

    async fn generate(
        &self,
        _http: &Client,
        request: &ImageRequest<'_>,
    ) -> Result<GeneratedImage, ImageError> {
        Ok(placeholder_image(request.prompt, request.aspect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_drops_stop_words_and_short_words() {
        let kw = extract_keywords(
            "Professional business image for Phoenix company. Theme: leaky faucets repair",
        );
        assert_eq!(kw, "phoenix leaky faucets");
    }

    #[test]
    fn test_extract_keywords_default() {
        assert_eq!(extract_keywords("a an to of"), "business professional");
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        let a = placeholder_image("Emergency plumbing Phoenix", AspectRatio::Landscape);
        let b = placeholder_image("Emergency plumbing Phoenix", AspectRatio::Landscape);
        assert_eq!(a, b);
        assert_eq!(
            a.url,
            "https://picsum.photos/seed/emergency-plumbing-phoenix/1600/1200"
        );
    }
}
