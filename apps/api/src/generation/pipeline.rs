//! Pack Assembly Pipeline: turns one `PackInput` into an ordered file list.
//!
//! Flow: seed → blog → seed/sources → 4 platforms × 5 days (post + image) →
//!       YouTube title/description/thumbnail → blog hero → review → scheduler.
//!
//! Strictly sequential. Nothing here fails: every AI call degrades to a
//! template and every image degrades to "no file for this slot".

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::generation::events::{EventSink, PackEvent};
use crate::generation::manifest::{
    self, blog_page_path, social_path, youtube_description_path, youtube_title_path, ReviewInputs,
};
use crate::generation::models::{
    GeneratedPack, ImageAsset, PackFile, PackInput, Platform, DAYS,
};
use crate::generation::page::{render_blog_page, sources_markdown};
use crate::generation::prompts::image_style_modifier;
use crate::generation::seed::{html_to_text, resolve_seed, truncate_seed, SeedSource};
use crate::generation::writer::ContentWriter;
use crate::imaging::{AspectRatio, GeneratedImage, ImageGenerator, ImageStyle};
use crate::llm_client::TextGenerator;

const IMAGE_CONCEPT_MAX_CHARS: usize = 100;

/// Capabilities a pack run draws on. All shared read-only.
pub struct PackServices<'a> {
    pub llm: &'a dyn TextGenerator,
    pub images: &'a dyn ImageGenerator,
    pub seeds: &'a dyn SeedSource,
    pub events: &'a dyn EventSink,
    /// Model identifier used for every content call.
    pub content_model: &'a str,
    /// Flat per-image estimate reported in the review manifest.
    pub image_cost_estimate: f64,
}

/// Image prompt for one slot: the content's first line as theme, the first
/// three keywords, and the slot's style modifier.
pub fn image_prompt(slot: &str, content: &str, input: &PackInput) -> String {
    let concept: String = content
        .lines()
        .next()
        .unwrap_or_default()
        .replace(|c: char| c == '#' || c == '@', "")
        .chars()
        .take(IMAGE_CONCEPT_MAX_CHARS)
        .collect();
    let keywords = input
        .keyword_list()
        .into_iter()
        .take(3)
        .collect::<Vec<_>>()
        .join(", ");

    let base = format!(
        "Professional business image for {} company. Theme: {}. Style: modern, clean, professional. Related to: {keywords}",
        input.business.region,
        concept.trim()
    );
    match image_style_modifier(slot) {
        Some(modifier) => format!("{base}. {modifier}"),
        None => base,
    }
}

fn local_date(input: &PackInput, now: DateTime<Utc>) -> NaiveDate {
    match input.timezone.parse::<Tz>() {
        Ok(tz) => now.with_timezone(&tz).date_naive(),
        Err(_) => now.date_naive(),
    }
}

/// One image slot in the pack.
struct ImageSlot<'s> {
    platform: &'s str,
    day: Option<u8>,
    file_name: String,
    prompt: String,
    aspect: AspectRatio,
    style: ImageStyle,
}

struct PackBuilder<'a> {
    slug: &'a str,
    services: &'a PackServices<'a>,
    files: Vec<PackFile>,
    images: Vec<ImageAsset>,
}

impl<'a> PackBuilder<'a> {
    fn text(&mut self, path: String, content: impl Into<String>) {
        self.files.push(PackFile::text(path, content));
    }

    /// Generates, downloads and stores one image; skips the slot on any `None`.
    async fn image(&mut self, slot: ImageSlot<'_>) {
        let artifact = match slot.day {
            Some(day) => format!("{} day {day}", slot.platform),
            None => format!("{} {}", slot.platform, slot.file_name),
        };

        let Some((generated, bytes)) = self.fetch(&slot).await else {
            self.services.events.emit(PackEvent::ImageSkipped { artifact });
            return;
        };

        let relative = format!("{}/{}/{}", self.slug, slot.platform, slot.file_name);
        let path = format!("public/images/{relative}");
        self.services.events.emit(PackEvent::ImageStored {
            path: path.clone(),
            source_url: generated.url.clone(),
        });
        self.files
            .push(PackFile::image(path.clone(), BASE64.encode(&bytes), generated.url.clone()));
        self.images.push(ImageAsset {
            platform: slot.platform.to_string(),
            day: slot.day,
            public_url: format!("/images/{relative}"),
            source_url: generated.url,
            prompt: generated.prompt,
            path,
        });
    }

    async fn fetch(&self, slot: &ImageSlot<'_>) -> Option<(GeneratedImage, Bytes)> {
        let images = self.services.images;
        let generated = images
            .generate_image(&slot.prompt, slot.aspect, slot.style)
            .await?;
        let bytes = images.download(&generated.url).await?;
        Some((generated, bytes))
    }
}

/// Runs the full pipeline. `now` anchors every date in the pack so a run
/// with the same input, clock and capability responses is reproducible.
pub async fn generate_pack(
    input: &PackInput,
    services: &PackServices<'_>,
    now: DateTime<Utc>,
) -> GeneratedPack {
    let span = info_span!("pack_run", slug = %input.slug, run_id = %Uuid::new_v4());
    run(input, services, now).instrument(span).await
}

async fn run(input: &PackInput, services: &PackServices<'_>, now: DateTime<Utc>) -> GeneratedPack {
    let slug = input.slug.as_str();
    let today = local_date(input, now);
    let mut writer = ContentWriter::new(services.llm, services.content_model, services.events);
    let mut pack = PackBuilder {
        slug,
        services,
        files: Vec::new(),
        images: Vec::new(),
    };

    // Step 1: Seed
    let seed = resolve_seed(input, services.seeds, services.events).await;

    // Step 2: Blog page + plain-text rendering
    let blog_html = writer.blog(input, &seed).await;
    pack.text(
        blog_page_path(slug),
        render_blog_page(input, &blog_html, input.seed_url(), today),
    );
    pack.text(format!("content/{slug}/blog-post.txt"), html_to_text(&blog_html));

    // Step 3: Seed + sources
    pack.text(format!("content/{slug}/seed.txt"), truncate_seed(&seed));
    pack.text(format!("content/{slug}/sources.md"), sources_markdown(input, today));

    // Step 4: Social posts with images
    for platform in Platform::ALL {
        for day in DAYS {
            let post = writer.social(platform, day, input, &seed).await;
            pack.text(social_path(platform.slug(), slug, day), post.as_str());

            pack.image(ImageSlot {
                platform: platform.slug(),
                day: Some(day),
                file_name: format!("day-{day}.png"),
                prompt: image_prompt(platform.slug(), &post, input),
                aspect: platform.aspect_ratio(),
                style: ImageStyle::General,
            })
            .await;
        }
    }

    // Step 5: YouTube
    let yt_title = writer.youtube_title(input).await;
    let yt_description = writer.youtube_description(input, &seed).await;
    pack.text(youtube_title_path(slug), yt_title.as_str());
    pack.text(youtube_description_path(slug), yt_description);
    pack.image(ImageSlot {
        platform: "youtube",
        day: None,
        file_name: "thumbnail.png".to_string(),
        prompt: image_prompt("youtube", &yt_title, input),
        aspect: AspectRatio::Wide,
        style: ImageStyle::Design,
    })
    .await;

    // Step 6: Blog hero
    pack.image(ImageSlot {
        platform: "blog",
        day: None,
        file_name: "hero.png".to_string(),
        prompt: image_prompt("blog", &input.keywords, input),
        aspect: AspectRatio::Wide,
        style: ImageStyle::General,
    })
    .await;

    // Step 7: Review manifest
    let usage = writer.usage();
    let review = manifest::build_review(ReviewInputs {
        input,
        blog_html: &blog_html,
        yt_title: &yt_title,
        images: &pack.images,
        usage,
        image_cost_estimate: services.image_cost_estimate,
    });
    pack.text(format!("review/{slug}.json"), manifest::to_json(&review));

    // Step 8: Scheduler manifest
    let schedule = manifest::build_schedule(input, now);
    pack.text(format!("scheduler/{slug}.json"), manifest::to_json(&schedule));

    info!(
        "pack {slug} assembled: {} files, {} images, {} AI calls, {} template fallbacks",
        pack.files.len(),
        pack.images.len(),
        usage.ai_calls,
        usage.template_fallbacks
    );

    GeneratedPack {
        slug: slug.to_string(),
        files: pack.files,
        images: pack.images,
        usage,
    }
}

/// Blog-only run: seed resolution plus the blog body, nothing persisted.
pub async fn generate_blog_preview(input: &PackInput, services: &PackServices<'_>) -> String {
    let seed = resolve_seed(input, services.seeds, services.events).await;
    let mut writer = ContentWriter::new(services.llm, services.content_model, services.events);
    writer.blog(input, &seed).await
}

#[cfg(test)]
pub(crate) mod stubs {
    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::generation::seed::{SeedError, SeedSource};
    use crate::imaging::{AspectRatio, GeneratedImage, ImageGenerator, ImageStyle};

    /// Deterministic images: URL derived from aspect and prompt length.
    pub struct StubImages {
        pub generate: bool,
        pub download: bool,
    }

    impl StubImages {
        pub fn working() -> Self {
            Self {
                generate: true,
                download: true,
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for StubImages {
        async fn generate_image(
            &self,
            prompt: &str,
            aspect: AspectRatio,
            _style: ImageStyle,
        ) -> Option<GeneratedImage> {
            self.generate.then(|| GeneratedImage {
                url: format!("https://img.test/{}/{}.png", aspect.as_str(), prompt.len()),
                prompt: prompt.to_string(),
                resolution: "1x1".into(),
            })
        }

        async fn download(&self, _url: &str) -> Option<Bytes> {
            self.download.then(|| Bytes::from_static(b"\x89PNG"))
        }
    }

    pub struct StubSeeds(pub Option<&'static str>);

    #[async_trait]
    impl SeedSource for StubSeeds {
        async fn fetch(&self, _url: &str) -> Result<String, SeedError> {
            self.0.map(str::to_string).ok_or(SeedError::Status(404))
        }
    }
}
