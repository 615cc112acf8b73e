//! Review and scheduler manifests.

use std::collections::BTreeMap;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{error, warn};

use crate::generation::models::{ImageAsset, PackInput, Platform, UsageTotals, DAYS};
use crate::generation::templates::blog_faq;

pub const ORIGINALITY_NOTE: &str = "≥80% paraphrased; no >75-char verbatim runs";
pub const NO_SEED_NOTE: &str = "No seed URL provided";

pub fn blog_page_path(slug: &str) -> String {
    format!("app/blog/{slug}/page.html")
}

pub fn social_path(platform: &str, slug: &str, day: u8) -> String {
    format!("social/{platform}/{slug}/day-{day}.md")
}

pub fn youtube_title_path(slug: &str) -> String {
    format!("social/youtube/{slug}/title.txt")
}

pub fn youtube_description_path(slug: &str) -> String {
    format!("social/youtube/{slug}/description.md")
}

// ────────────────────────────────────────────────────────────────────────────
// Review manifest
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewManifest {
    pub status: &'static str,
    pub editable: Editable,
    pub notes: ReviewNotes,
    pub assets: ReviewAssets,
    pub sources: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Editable {
    pub title: String,
    pub description: String,
    pub blog_intro: String,
    pub faq: Vec<FaqEntry>,
    pub cta_text: String,
    pub yt_title: String,
    pub yt_description: String,
}

#[derive(Debug, Serialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNotes {
    pub seed_url: String,
    pub originality: &'static str,
    pub images_generated: usize,
    pub image_generation_cost: String,
    pub text_tokens_used: u32,
    pub text_generation_cost: f64,
    pub template_fallbacks: u32,
}

#[derive(Debug, Serialize)]
pub struct ReviewAssets {
    pub blog: String,
    pub platforms: PlatformAssets,
    pub images: BTreeMap<String, Vec<ReviewImage>>,
}

#[derive(Debug, Serialize)]
pub struct PlatformAssets {
    pub facebook: Vec<String>,
    pub instagram: Vec<String>,
    pub linkedin: Vec<String>,
    pub gbp: Vec<String>,
    pub youtube: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewImage {
    pub url: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
}

/// Everything the review manifest is built from.
pub struct ReviewInputs<'a> {
    pub input: &'a PackInput,
    pub blog_html: &'a str,
    pub yt_title: &'a str,
    pub images: &'a [ImageAsset],
    pub usage: UsageTotals,
    pub image_cost_estimate: f64,
}

fn platform_paths(platform: Platform, slug: &str) -> Vec<String> {
    DAYS.map(|day| format!("/{}", social_path(platform.slug(), slug, day)))
        .collect()
}

/// Text of the first `<p>` in the blog body.
fn first_paragraph(html: &str) -> String {
    let Some(start) = html.find("<p") else {
        return String::new();
    };
    let rest = &html[start..];
    let end = rest.find("</p>").unwrap_or(rest.len());
    crate::generation::seed::html_to_text(&rest[..end])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_review(inputs: ReviewInputs<'_>) -> ReviewManifest {
    let input = inputs.input;
    let slug = &input.slug;

    let mut images: BTreeMap<String, Vec<ReviewImage>> = BTreeMap::new();
    for asset in inputs.images {
        images
            .entry(asset.platform.clone())
            .or_default()
            .push(ReviewImage {
                url: asset.public_url.clone(),
                prompt: asset.prompt.clone(),
                day: asset.day,
            });
    }

    let image_cost = inputs.images.len() as f64 * inputs.image_cost_estimate;

    ReviewManifest {
        status: "draft",
        editable: Editable {
            title: input
                .keyword_list()
                .first()
                .map(|k| k.to_string())
                .unwrap_or_default(),
            description: input.business.value_prop.clone(),
            blog_intro: first_paragraph(inputs.blog_html),
            faq: blog_faq(input)
                .into_iter()
                .map(|(question, answer)| FaqEntry { question, answer })
                .collect(),
            cta_text: input.offer.cta_text.clone(),
            yt_title: inputs.yt_title.to_string(),
            yt_description: String::new(),
        },
        notes: ReviewNotes {
            seed_url: input.seed_url().unwrap_or(NO_SEED_NOTE).to_string(),
            originality: ORIGINALITY_NOTE,
            images_generated: inputs.images.len(),
            image_generation_cost: format!("~${image_cost:.2} (estimated)"),
            text_tokens_used: inputs.usage.tokens_used,
            text_generation_cost: (inputs.usage.cost * 10_000.0).round() / 10_000.0,
            template_fallbacks: inputs.usage.template_fallbacks,
        },
        assets: ReviewAssets {
            blog: format!("/{}", blog_page_path(slug)),
            platforms: PlatformAssets {
                facebook: platform_paths(Platform::Facebook, slug),
                instagram: platform_paths(Platform::Instagram, slug),
                linkedin: platform_paths(Platform::Linkedin, slug),
                gbp: platform_paths(Platform::Gbp, slug),
                youtube: vec![
                    format!("/{}", youtube_title_path(slug)),
                    format!("/{}", youtube_description_path(slug)),
                ],
            },
            images,
        },
        sources: format!("/content/{slug}/sources.md"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scheduler manifest
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleManifest {
    pub timezone: String,
    pub week_of: String,
    pub items: Vec<ScheduleItem>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleItem {
    pub day: &'static str,
    pub platform: &'static str,
    /// RFC 3339 with the pack timezone's offset.
    pub time: String,
    pub path: String,
}

struct Slot {
    weekday: Weekday,
    label: &'static str,
    platform: &'static str,
    hour: u32,
    minute: u32,
}

const SLOTS: [Slot; 6] = [
    Slot { weekday: Weekday::Mon, label: "Mon", platform: "blog", hour: 17, minute: 0 },
    Slot { weekday: Weekday::Tue, label: "Tue", platform: "linkedin", hour: 15, minute: 30 },
    Slot { weekday: Weekday::Wed, label: "Wed", platform: "facebook", hour: 17, minute: 0 },
    Slot { weekday: Weekday::Thu, label: "Thu", platform: "instagram", hour: 18, minute: 0 },
    Slot { weekday: Weekday::Fri, label: "Fri", platform: "gbp", hour: 17, minute: 0 },
    Slot { weekday: Weekday::Fri, label: "Fri", platform: "youtube", hour: 20, minute: 0 },
];

fn slot_path(slot: &Slot, slug: &str) -> String {
    let path = match slot.platform {
        "blog" => blog_page_path(slug),
        "linkedin" => social_path("linkedin", slug, 2),
        "facebook" => social_path("facebook", slug, 3),
        "instagram" => social_path("instagram", slug, 4),
        "gbp" => social_path("gbp", slug, 5),
        _ => youtube_description_path(slug),
    };
    format!("/{path}")
}

/// First Monday strictly after `date`.
pub fn next_monday(date: NaiveDate) -> NaiveDate {
    let days = 7 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days)
}

fn local_datetime(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN));
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Wall-clock time skipped by a DST transition.
        LocalResult::None => tz.from_utc_datetime(&naive),
    }
}

pub fn build_schedule(input: &PackInput, now: DateTime<Utc>) -> ScheduleManifest {
    let tz: Tz = input.timezone.parse().unwrap_or_else(|_| {
        warn!("unknown timezone '{}', scheduling in UTC", input.timezone);
        Tz::UTC
    });

    let today = now.with_timezone(&tz).date_naive();
    let monday = next_monday(today);

    let items = SLOTS
        .iter()
        .map(|slot| {
            let offset = i64::from(slot.weekday.num_days_from_monday());
            let date = monday + Duration::days(offset);
            ScheduleItem {
                day: slot.label,
                platform: slot.platform,
                time: local_datetime(tz, date, slot.hour, slot.minute).to_rfc3339(),
                path: slot_path(slot, &input.slug),
            }
        })
        .collect();

    ScheduleManifest {
        timezone: input.timezone.clone(),
        week_of: monday.format("%Y-%m-%d").to_string(),
        items,
    }
}

/// Pretty JSON for a manifest file.
pub fn to_json<T: Serialize>(manifest: &T) -> String {
    serde_json::to_string_pretty(manifest).unwrap_or_else(|e| {
        error!("manifest serialization failed: {e}");
        "{}".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::models::fixtures::acme_input;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn asset(platform: &str, day: Option<u8>) -> ImageAsset {
        let file = day.map(|d| format!("day-{d}.png")).unwrap_or("hero.png".into());
        ImageAsset {
            platform: platform.into(),
            day,
            public_url: format!("/images/week-1/{platform}/{file}"),
            source_url: "https://picsum.photos/seed/x/1/1".into(),
            prompt: "prompt".into(),
            path: format!("public/images/week-1/{platform}/{file}"),
        }
    }

    #[test]
    fn test_next_monday_is_strictly_after() {
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(next_monday(monday), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(next_monday(sunday), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        let wednesday = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(next_monday(wednesday), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    }

    #[test]
    fn test_schedule_slots_fall_on_their_weekdays() {
        let input = acme_input();
        let now = at(2026, 3, 4, 12);
        let schedule = build_schedule(&input, now);

        assert_eq!(schedule.timezone, "America/Phoenix");
        assert_eq!(schedule.week_of, "2026-03-09");
        assert_eq!(schedule.items.len(), 6);

        let expected = [
            ("Mon", "blog", "2026-03-09T17:00:00-07:00"),
            ("Tue", "linkedin", "2026-03-10T15:30:00-07:00"),
            ("Wed", "facebook", "2026-03-11T17:00:00-07:00"),
            ("Thu", "instagram", "2026-03-12T18:00:00-07:00"),
            ("Fri", "gbp", "2026-03-13T17:00:00-07:00"),
            ("Fri", "youtube", "2026-03-13T20:00:00-07:00"),
        ];
        for (item, (day, platform, time)) in schedule.items.iter().zip(expected) {
            assert_eq!(item.day, day);
            assert_eq!(item.platform, platform);
            assert_eq!(item.time, time);
            let parsed = DateTime::parse_from_rfc3339(&item.time).unwrap();
            assert!(parsed > now);
        }
        assert_eq!(schedule.items[0].path, "/app/blog/week-1/page.html");
        assert_eq!(schedule.items[1].path, "/social/linkedin/week-1/day-2.md");
        assert_eq!(schedule.items[5].path, "/social/youtube/week-1/description.md");
    }

    #[test]
    fn test_schedule_uses_local_date_not_utc_date() {
        // 2026-03-09 03:00 UTC is still Sunday evening in Phoenix.
        let schedule = build_schedule(&acme_input(), at(2026, 3, 9, 3));
        assert_eq!(schedule.week_of, "2026-03-09");
    }

    #[test]
    fn test_schedule_is_deterministic_for_fixed_now() {
        let now = at(2026, 3, 4, 12);
        let a = to_json(&build_schedule(&acme_input(), now));
        let b = to_json(&build_schedule(&acme_input(), now));
        assert_eq!(a, b);
    }

    #[test]
    fn test_review_manifest_for_unseeded_pack() {
        let input = acme_input();
        let images = vec![asset("facebook", Some(1)), asset("blog", None)];
        let usage = UsageTotals {
            ai_calls: 0,
            template_fallbacks: 23,
            tokens_used: 0,
            cost: 0.0,
        };
        let review = build_review(ReviewInputs {
            input: &input,
            blog_html: "<h2>Intro</h2>\n<p class=\"lead\">First <strong>para</strong>.<br>Shared &amp; kept.</p><p>Second</p>",
            yt_title: "Plumbing for Phoenix, AZ Businesses | Acme",
            images: &images,
            usage,
            image_cost_estimate: 0.08,
        });
        let value = serde_json::to_value(&review).unwrap();

        assert_eq!(value["status"], "draft");
        assert_eq!(value["notes"]["seedUrl"], NO_SEED_NOTE);
        assert_eq!(value["notes"]["imagesGenerated"], 2);
        assert_eq!(value["notes"]["imageGenerationCost"], "~$0.16 (estimated)");
        assert_eq!(value["notes"]["templateFallbacks"], 23);
        assert_eq!(value["editable"]["title"], "plumbing");
        assert_eq!(value["editable"]["blogIntro"], "First para. Shared & kept.");
        assert_eq!(value["editable"]["ytTitle"], "Plumbing for Phoenix, AZ Businesses | Acme");
        assert_eq!(value["editable"]["ytDescription"], "");
        assert_eq!(value["assets"]["blog"], "/app/blog/week-1/page.html");
        assert_eq!(
            value["assets"]["platforms"]["gbp"][4],
            "/social/gbp/week-1/day-5.md"
        );
        assert_eq!(value["assets"]["platforms"]["youtube"].as_array().unwrap().len(), 2);
        assert_eq!(value["assets"]["images"]["facebook"][0]["day"], 1);
        assert!(value["assets"]["images"]["blog"][0].get("day").is_none());
        assert_eq!(value["sources"], "/content/week-1/sources.md");
    }
}
