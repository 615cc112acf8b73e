//! Content writer: AI-first text with template fallback, one artifact at a time.
//!
//! Every method has the same contract: ask the `TextGenerator` once, and if it
//! returns nothing (or only whitespace) use the matching function from
//! `generation::templates`. No retries.

use tracing::debug;

use crate::generation::events::{EventSink, PackEvent};
use crate::generation::models::{PackInput, Platform, UsageTotals};
use crate::generation::prompts::{
    platform_guidelines, BLOG_PROMPT_TEMPLATE, BLOG_SYSTEM_TEMPLATE, SOCIAL_PROMPT_TEMPLATE,
    SOCIAL_SYSTEM_TEMPLATE, YOUTUBE_DESCRIPTION_PROMPT_TEMPLATE, YOUTUBE_DESCRIPTION_SYSTEM,
    YOUTUBE_TITLE_PROMPT_TEMPLATE, YOUTUBE_TITLE_SYSTEM,
};
use crate::generation::templates::{self, YOUTUBE_TITLE_MAX_CHARS};
use crate::llm_client::prompts::{voice_directive, PLAIN_OUTPUT_INSTRUCTION};
use crate::llm_client::TextGenerator;

const BLOG_SEED_CHARS: usize = 3000;
const SHORT_SEED_CHARS: usize = 500;

pub struct ContentWriter<'a> {
    llm: &'a dyn TextGenerator,
    model: &'a str,
    events: &'a dyn EventSink,
    usage: UsageTotals,
}

impl<'a> ContentWriter<'a> {
    pub fn new(llm: &'a dyn TextGenerator, model: &'a str, events: &'a dyn EventSink) -> Self {
        Self {
            llm,
            model,
            events,
            usage: UsageTotals::default(),
        }
    }

    pub fn usage(&self) -> UsageTotals {
        self.usage
    }

    /// Blog body as H2/H3 HTML.
    pub async fn blog(&mut self, input: &PackInput, seed: &str) -> String {
        let b = &input.business;
        let source_material = if seed.is_empty() {
            "Create original content based on industry best practices.".to_string()
        } else {
            format!(
                "Base this content on the following source material (paraphrase heavily, add local context):\n\n{}",
                take_chars(seed, BLOG_SEED_CHARS)
            )
        };

        let system = BLOG_SYSTEM_TEMPLATE.replace("{voice_directive}", &voice_directive(b.voice.as_str()));
        let prompt = BLOG_PROMPT_TEMPLATE
            .replace("{business_name}", &b.business_name)
            .replace("{region}", &b.region)
            .replace("{value_prop}", &b.value_prop)
            .replace("{voice}", b.voice.as_str())
            .replace("{primary_keyword}", input.primary_keyword())
            .replace("{keywords}", &input.keyword_list().join(", "))
            .replace("{angle}", input.angle_or_default())
            .replace("{cta_text}", &input.offer.cta_text)
            .replace("{cta_url}", &input.offer.cta_url)
            .replace("{guidance}", &guidance(input))
            .replace("{source_material}", &source_material);

        self.ai_or_template("blog post", &prompt, &system, |text| Some(text.to_string()), || {
            templates::blog_body(input)
        })
        .await
    }

    /// One social post for `platform` on `day`.
    pub async fn social(
        &mut self,
        platform: Platform,
        day: u8,
        input: &PackInput,
        seed: &str,
    ) -> String {
        let b = &input.business;
        let content_seed = if seed.is_empty() {
            format!("Create original content about {}", input.primary_keyword())
        } else {
            format!(
                "Draw inspiration from (but don't copy directly):\n{}",
                take_chars(seed, SHORT_SEED_CHARS)
            )
        };

        let system =
            SOCIAL_SYSTEM_TEMPLATE.replace("{voice_directive}", &voice_directive(b.voice.as_str()));
        let prompt = SOCIAL_PROMPT_TEMPLATE
            .replace("{platform}", platform.slug())
            .replace("{business_name}", &b.business_name)
            .replace("{region}", &b.region)
            .replace("{value_prop}", &b.value_prop)
            .replace("{keywords}", &input.keyword_list().join(", "))
            .replace("{cta_text}", &input.offer.cta_text)
            .replace("{cta_url}", &input.offer.cta_url)
            .replace("{guidelines}", platform_guidelines(platform))
            .replace("{content_seed}", &content_seed)
            .replace("{day}", &day.to_string())
            .replace("{angle_label}", templates::angle_for_day(day).label)
            .replace("{plain_output}", PLAIN_OUTPUT_INSTRUCTION);

        let artifact = format!("{platform} day {day}");
        self.ai_or_template(&artifact, &prompt, &system, |text| Some(text.to_string()), || {
            templates::social_post(platform, day, input)
        })
        .await
    }

    /// Title capped at 70 characters whichever path produced it.
    pub async fn youtube_title(&mut self, input: &PackInput) -> String {
        let b = &input.business;
        let prompt = YOUTUBE_TITLE_PROMPT_TEMPLATE
            .replace("{business_name}", &b.business_name)
            .replace("{region}", &b.region)
            .replace("{primary_keyword}", input.primary_keyword());

        self.ai_or_template(
            "youtube title",
            &prompt,
            YOUTUBE_TITLE_SYSTEM,
            clean_title,
            || templates::youtube_title(input),
        )
        .await
    }

    pub async fn youtube_description(&mut self, input: &PackInput, seed: &str) -> String {
        let b = &input.business;
        let content_theme = if seed.is_empty() {
            format!("Topic: {}", input.primary_keyword())
        } else {
            format!("Based on: {}", take_chars(seed, SHORT_SEED_CHARS))
        };

        let prompt = YOUTUBE_DESCRIPTION_PROMPT_TEMPLATE
            .replace("{business_name}", &b.business_name)
            .replace("{region}", &b.region)
            .replace("{value_prop}", &b.value_prop)
            .replace("{keywords}", &input.keyword_list().join(", "))
            .replace("{cta_text}", &input.offer.cta_text)
            .replace("{cta_url}", &input.offer.cta_url)
            .replace("{website}", &b.website)
            .replace("{content_theme}", &content_theme)
            .replace("{hashtags}", &input.hashtags().join(" "));

        self.ai_or_template(
            "youtube description",
            &prompt,
            YOUTUBE_DESCRIPTION_SYSTEM,
            |text| Some(text.to_string()),
            || templates::youtube_description(input),
        )
        .await
    }

    async fn ai_or_template<A, F>(
        &mut self,
        artifact: &str,
        prompt: &str,
        system: &str,
        accept: A,
        fallback: F,
    ) -> String
    where
        A: FnOnce(&str) -> Option<String>,
        F: FnOnce() -> String,
    {
        let generated = self.llm.generate(prompt, system, Some(self.model)).await;

        if let Some(generation) = generated {
            self.usage.ai_calls += 1;
            self.usage.tokens_used += generation.tokens_used;
            self.usage.cost += generation.cost;

            if let Some(text) = accept(generation.content.trim()).filter(|t| !t.is_empty()) {
                self.events.emit(PackEvent::TextGenerated {
                    artifact: artifact.to_string(),
                    tokens: generation.tokens_used,
                });
                return text;
            }
            debug!("{artifact}: model returned empty content");
        }

        self.usage.template_fallbacks += 1;
        self.events.emit(PackEvent::TextFallback {
            artifact: artifact.to_string(),
        });
        fallback()
    }
}

/// Optional must-include / off-limits lines for the blog prompt.
fn guidance(input: &PackInput) -> String {
    let mut lines = String::new();
    if let Some(must) = input.must_include.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        lines.push_str(&format!("- Must include: {must}\n"));
    }
    if let Some(off) = input.off_limits.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        lines.push_str(&format!("- Off limits (never mention): {off}\n"));
    }
    lines
}

fn take_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn clean_title(raw: &str) -> Option<String> {
    let line = raw.lines().next().unwrap_or_default().trim();
    let unquoted = line.trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”');
    let title = templates::truncate_chars(unquoted.trim(), YOUTUBE_TITLE_MAX_CHARS);
    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
pub(crate) mod stubs {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{AiGeneration, TextGenerator};

    /// Always returns `None`, as an unconfigured client does.
    pub struct NoLlm;

    #[async_trait]
    impl TextGenerator for NoLlm {
        async fn generate(&self, _: &str, _: &str, _: Option<&str>) -> Option<AiGeneration> {
            None
        }
    }

    /// Replies with a fixed text and records every prompt it saw.
    pub struct FixedLlm {
        pub reply: String,
        pub prompts: Mutex<Vec<(String, Option<String>)>>,
    }

    impl FixedLlm {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FixedLlm {
        async fn generate(
            &self,
            prompt: &str,
            _system: &str,
            model: Option<&str>,
        ) -> Option<AiGeneration> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), model.map(str::to_string)));
            Some(AiGeneration {
                content: self.reply.clone(),
                tokens_used: 100,
                cost: 0.01,
            })
        }
    }
}
