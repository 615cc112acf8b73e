// All LLM prompt text for pack generation.
// Templates use `{placeholder}` markers filled by generation::writer.

use crate::generation::models::Platform;

/// Blog system prompt. Replace `{voice_directive}`.
pub const BLOG_SYSTEM_TEMPLATE: &str = "You are an expert content writer specializing in \
    SEO-optimized blog posts for local businesses. {voice_directive} \
    You create engaging, valuable content that ranks well in search engines while providing \
    genuine value to readers. Always include proper HTML structure with h2/h3 headings, \
    paragraphs, and lists.";

/// Blog prompt. Replace: {business_name}, {region}, {value_prop}, {voice}, {primary_keyword},
/// {keywords}, {angle}, {cta_text}, {cta_url}, {source_material}, {guidance}
pub const BLOG_PROMPT_TEMPLATE: &str = r#"Write a comprehensive blog post (800-1200 words) for {business_name}, a business serving {region}.

**Business Info:**
- Value Proposition: {value_prop}
- Region: {region}
- Brand Voice: {voice}

**Content Requirements:**
- Primary Topic: {primary_keyword}
- Keywords to naturally incorporate: {keywords}
- Angle: {angle}
- Call-to-Action: {cta_text} (link to {cta_url})
{guidance}
**Source Material:**
{source_material}

**Structure Required:**
1. Compelling introduction that hooks the reader
2. 4-6 main sections with h2 headings
3. Practical, actionable advice specific to {region}
4. 3-5 FAQ-style questions with answers
5. Strong conclusion with clear CTA

**SEO Guidelines:**
- Write naturally, avoid keyword stuffing
- Include {region} mentions naturally (not forced)
- Make it scannable with subheadings and lists
- Include specific, practical examples

**Output Format:**
Return ONLY the blog content in clean HTML using semantic tags (h2, h3, p, ul, ol, li, strong).
Do NOT include <html>, <head>, or <body> tags. Do NOT include a main title (h1)."#;

/// Social system prompt. Replace `{voice_directive}`.
pub const SOCIAL_SYSTEM_TEMPLATE: &str = "You are a social media expert creating \
    platform-native content for local businesses. {voice_directive} \
    You understand platform algorithms, engagement tactics, and what makes content shareable.";

/// Social prompt. Replace: {platform}, {business_name}, {region}, {value_prop}, {keywords},
/// {cta_text}, {cta_url}, {guidelines}, {content_seed}, {day}, {angle_label}, {plain_output}
pub const SOCIAL_PROMPT_TEMPLATE: &str = r#"Create a {platform} post for {business_name} serving {region}.

**Business Context:**
- Value Proposition: {value_prop}
- Region: {region}
- Keywords: {keywords}
- CTA: {cta_text}
- CTA URL: {cta_url}

**Platform Guidelines:**
{guidelines}

**Content Seed:**
{content_seed}

**This is Day {day} of 5.** Today's angle: {angle_label}.
(Day 1: Problem/Pain point, Day 2: Solution/How-to, Day 3: Social proof/Result,
Day 4: Myth-busting/Common mistake, Day 5: CTA-focused/Offer)

**Output Format:**
Include hashtags where appropriate for the platform.
For Instagram, group hashtags at the end on separate lines.
{plain_output}"#;

pub const YOUTUBE_TITLE_SYSTEM: &str = "You are a YouTube SEO expert. You create click-worthy, \
    search-optimized titles that balance keywords with curiosity.";

/// Replace: {business_name}, {region}, {primary_keyword}
pub const YOUTUBE_TITLE_PROMPT_TEMPLATE: &str = r#"Create a YouTube video title for {business_name} serving {region}.

**Requirements:**
- Maximum 70 characters (strict limit)
- Include primary keyword: {primary_keyword}
- Mention {region} if it fits naturally
- Format: [Main Benefit/Hook] | [Location Context if space]

Output ONLY the title text, nothing else."#;

pub const YOUTUBE_DESCRIPTION_SYSTEM: &str = "You are a YouTube content strategist. You write \
    descriptions that boost SEO, provide value, and drive action.";

/// Replace: {business_name}, {region}, {value_prop}, {keywords}, {cta_text}, {cta_url},
/// {website}, {content_theme}, {hashtags}
pub const YOUTUBE_DESCRIPTION_PROMPT_TEMPLATE: &str = r#"Create a YouTube video description for {business_name} serving {region}.

**Business Context:**
- Value Proposition: {value_prop}
- Keywords: {keywords}
- CTA: {cta_text}
- Website: {website}
- CTA URL: {cta_url}

**Content Theme:**
{content_theme}

**Structure Required:**
1. Hook (2-3 lines): What this video covers and why it matters
2. What You'll Learn (3-5 bullet points)
3. About Section: Brief intro to {business_name}
4. Links:
   - {cta_text}: {cta_url}
   - Website: {website}
5. Hashtags: 5-10 relevant tags ({hashtags})

Front-load important keywords and keep the first 2-3 lines compelling.
Output the complete description ready to paste into YouTube."#;

/// Static format/length/hashtag conventions per platform.
pub fn platform_guidelines(platform: Platform) -> &'static str {
    match platform {
        Platform::Facebook => {
            "Platform: Facebook\n\
             Format: 1-2 short paragraphs, conversational and engaging\n\
             Length: 100-300 characters ideal\n\
             Hashtags: 3-5 relevant hashtags\n\
             Tone: Warm, friendly, community-focused\n\
             Include: Question or conversation starter\n\
             CTA: Soft, inviting"
        }
        Platform::Instagram => {
            "Platform: Instagram\n\
             Format: Scannable caption with line breaks and emojis\n\
             Length: 150-300 characters (keep it punchy)\n\
             Hashtags: 8-15 highly relevant hashtags (group at end)\n\
             Tone: Visual, aesthetic, aspirational\n\
             Include: Hook in first line, value in middle, CTA at end\n\
             Emojis: Use strategically (2-4)"
        }
        Platform::Linkedin => {
            "Platform: LinkedIn\n\
             Format: Professional value-focused post\n\
             Length: 200-400 characters\n\
             Structure: Hook, Value/Insight, 3-4 bullet points, CTA\n\
             Hashtags: 3-6 professional hashtags\n\
             Tone: Professional, authoritative, thought-leadership\n\
             Include: Data point or insight, clear business value"
        }
        Platform::Gbp => {
            "Platform: Google Business Profile\n\
             Format: Ultra-concise business update\n\
             Length: 100-300 characters MAX\n\
             Tone: Direct, action-oriented, local\n\
             Include: One clear benefit + CTA\n\
             No hashtags needed"
        }
    }
}

/// Style modifiers appended to image prompts, keyed by artifact slot.
pub fn image_style_modifier(slot: &str) -> Option<&'static str> {
    match slot {
        "facebook" => Some("Social media friendly, engaging, warm colors."),
        "instagram" => Some("Instagram-style, vibrant, eye-catching, aesthetic composition."),
        "linkedin" => Some("Professional, corporate, business-focused, sophisticated."),
        "gbp" => Some("Local business, inviting, trustworthy, community-focused."),
        "youtube" => Some("Eye-catching thumbnail style, bold, attention-grabbing."),
        "blog" => Some("Hero image style, wide composition, professional photography feel."),
        _ => None,
    }
}
