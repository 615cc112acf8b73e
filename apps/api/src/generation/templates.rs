//! Template fallbacks: deterministic text used wherever the LLM returns nothing.
//!
//! Pure functions of the input: no network, no clock, no randomness. Every
//! output names the business, the region and at least one keyword.

use crate::generation::models::{PackInput, Platform};
use crate::generation::page::escape_html;

pub const YOUTUBE_TITLE_MAX_CHARS: usize = 70;

/// One row of the day-indexed rotation.
#[derive(Debug, Clone, Copy)]
pub struct DayAngle {
    pub label: &'static str,
    pub hook: &'static str,
}

/// Day 1..=5 rotation: problem → solution → social proof → myth-busting → CTA.
pub const DAY_ANGLES: [DayAngle; 5] = [
    DayAngle {
        label: "Problem/Pain point",
        hook: "Did you know?",
    },
    DayAngle {
        label: "Solution/How-to",
        hook: "Pro tip:",
    },
    DayAngle {
        label: "Social proof/Result",
        hook: "Here's why this matters:",
    },
    DayAngle {
        label: "Myth-busting/Common mistake",
        hook: "Common mistake:",
    },
    DayAngle {
        label: "CTA-focused/Offer",
        hook: "Quick win:",
    },
];

/// Angle for a 1-based day; out-of-range days clamp to the nearest end.
pub fn angle_for_day(day: u8) -> DayAngle {
    let idx = usize::from(day.clamp(1, 5)) - 1;
    DAY_ANGLES[idx]
}

fn angle_line(day: u8, input: &PackInput) -> String {
    let region = &input.business.region;
    let name = &input.business.business_name;
    let keyword = input.primary_keyword();
    match day.clamp(1, 5) {
        1 => format!(
            "Too many {region} customers wait until small {keyword} problems turn into expensive ones."
        ),
        2 => format!(
            "A little planning goes a long way. Here's how {region} locals stay ahead on {keyword}."
        ),
        3 => format!(
            "Neighbors across {region} trust {name} for {keyword}, and the results speak for themselves."
        ),
        4 => format!(
            "Myth: {keyword} can always wait. Reality: every delay costs {region} customers more."
        ),
        _ => format!(
            "This week is the perfect time for {region} customers to get {keyword} handled. {} and we'll take it from there.",
            input.offer.cta_text
        ),
    }
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn region_tag(region: &str) -> String {
    let compact: String = region.chars().filter(|c| c.is_alphanumeric()).collect();
    format!("#{compact}")
}

fn first_hashtags(input: &PackInput, n: usize) -> String {
    input
        .hashtags()
        .into_iter()
        .take(n)
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Blog
// ────────────────────────────────────────────────────────────────────────────

/// H2/H3-structured HTML body (no h1, no document wrapper).
///
/// Every interpolated profile field is HTML-escaped.
pub fn blog_body(input: &PackInput) -> String {
    let b = &input.business;
    let name = escape_html(&b.business_name);
    let region = escape_html(&b.region);
    let value_prop = escape_html(&b.value_prop);
    let keyword = escape_html(input.primary_keyword());
    let keyword_title = escape_html(&capitalize_first(input.primary_keyword()));
    let topics = escape_html(&input.keyword_list().join(", "));
    let cta_text = escape_html(&input.offer.cta_text);
    let cta_url = escape_html(&input.offer.cta_url);

    format!(
        r#"<h2>Why {keyword} Matters for {region} Businesses</h2>
<p>In today's competitive landscape, {region} businesses need every advantage. {keyword_title} isn't just a buzzword. It's a proven strategy that drives real results for companies just like yours.</p>
<p>{value_prop} At {name}, we've seen firsthand how the right approach can transform businesses in {region}.</p>

<h2>Understanding the Fundamentals</h2>
<p>Before diving into implementation, it's crucial to understand what makes {keyword} effective. Topics covered in this guide: {topics}.</p>
<ul>
<li><strong>Strategy First:</strong> Start with clear, measurable goals</li>
<li><strong>Customer Focus:</strong> Put your {region} audience at the center</li>
<li><strong>Continuous Improvement:</strong> Measure, learn, and optimize</li>
</ul>

<h2>Practical Implementation Steps</h2>
<h3>Step 1: Assessment</h3>
<p>Begin by evaluating your current position. Understanding your baseline helps you measure progress effectively.</p>
<h3>Step 2: Planning</h3>
<p>Develop a clear roadmap tailored to {region}'s unique market conditions, aligned with your goals and customer needs.</p>
<h3>Step 3: Execution</h3>
<p>Implementation is where strategy meets reality. Focus on consistent execution and adapt as you learn what works.</p>

<h2>Common Challenges and Solutions</h2>
<p>Many {region} businesses face similar obstacles with {keyword}. Here's how to overcome them:</p>
<ul>
<li><strong>Resource Constraints:</strong> Start small and scale based on results</li>
<li><strong>Measurement Difficulties:</strong> Focus on a few key metrics</li>
<li><strong>Market Competition:</strong> Differentiate through authenticity and local expertise</li>
</ul>

<h2>Frequently Asked Questions</h2>
<h3>What are the key benefits of {keyword}?</h3>
<p>The primary benefits include improved efficiency, better customer engagement, and measurable ROI for {region} businesses.</p>
<h3>How can {region} businesses get started with {keyword}?</h3>
<p>Start with a clear strategy, focus on your target audience, and measure results consistently. {name} can help guide you through the process.</p>
<h3>What makes {name} different?</h3>
<p>{value_prop} We specialize in serving {region} with proven strategies and deep local expertise.</p>

<h2>Taking Action</h2>
<p>The best time to start is now. {keyword_title} success doesn't happen overnight, but every journey begins with a single step.</p>
<p>Ready to transform your {region} business? <a href="{cta_url}">{cta_text}</a> and let's create a strategy that works for you.</p>"#
    )
}

/// FAQ pairs mirrored into the page's FAQPage structured data.
pub fn blog_faq(input: &PackInput) -> Vec<(String, String)> {
    let name = &input.business.business_name;
    let region = &input.business.region;
    let keyword = input.primary_keyword();
    vec![
        (
            format!("What are the key benefits of {keyword}?"),
            format!(
                "The primary benefits include improved efficiency, better customer engagement, and measurable ROI for {region} businesses."
            ),
        ),
        (
            format!("How can {region} businesses get started with {keyword}?"),
            format!(
                "Start with a clear strategy, focus on your target audience, and measure results consistently. {name} can help guide you through the process."
            ),
        ),
        (
            format!("What makes {name} different?"),
            format!(
                "{} We specialize in serving {region} with proven strategies and local expertise.",
                input.business.value_prop
            ),
        ),
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Social
// ────────────────────────────────────────────────────────────────────────────

/// One post for `platform` on 1-based `day`.
pub fn social_post(platform: Platform, day: u8, input: &PackInput) -> String {
    let b = &input.business;
    let name = &b.business_name;
    let region = &b.region;
    let hook = angle_for_day(day).hook;
    let line = angle_line(day, input);
    let cta_text = &input.offer.cta_text;
    let cta_url = &input.offer.cta_url;

    match platform {
        Platform::Facebook => format!(
            "{hook} {line}\n\n\
             At {name}, we believe in this: {value_prop}\n\n\
             That's why we're passionate about helping our {region} neighbors. What's the one thing you wish you'd known sooner?\n\n\
             {cta_text}: {cta_url}\n\n\
             {tags}",
            value_prop = b.value_prop,
            tags = first_hashtags(input, 5),
        ),
        Platform::Instagram => format!(
            "{hook}\n\
             {line} 💡\n\n\
             ✨ {name}: {value_prop}\n\n\
             Here's what makes the difference:\n\
             → Clear goals\n\
             → Consistent action\n\
             → Measuring what matters\n\n\
             Ready to level up? 🚀\n\n\
             {cta_text}, link in bio or visit {website}\n\n\
             {tags}\n\
             {region_tag} #LocalBusiness #SmallBusiness",
            value_prop = b.value_prop,
            website = if b.website.is_empty() { cta_url } else { &b.website },
            tags = first_hashtags(input, 12),
            region_tag = region_tag(region),
        ),
        Platform::Linkedin => format!(
            "{hook}\n\n\
             {line}\n\n\
             Key insights for {region}:\n\
             • Strategy must align with local market conditions\n\
             • Customer focus drives sustainable growth\n\
             • Continuous improvement separates leaders from followers\n\n\
             {value_prop}\n\n\
             At {name}, we're committed to helping {region} achieve measurable results.\n\n\
             {cta_text}: {cta_url}\n\n\
             {tags}",
            value_prop = b.value_prop,
            tags = first_hashtags(input, 6),
        ),
        Platform::Gbp => format!(
            "{hook} {line} {name} serves {region} with proven {keyword} expertise. {cta_text} today: {cta_url}",
            keyword = input.primary_keyword(),
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// YouTube
// ────────────────────────────────────────────────────────────────────────────

/// Title of at most 70 characters; shorter layouts are tried before truncating.
pub fn youtube_title(input: &PackInput) -> String {
    let name = &input.business.business_name;
    let region = &input.business.region;
    let keyword = capitalize_first(input.primary_keyword());

    let candidates = [
        format!("{keyword} for {region} Businesses | {name}"),
        format!("{keyword} in {region} | {name}"),
        format!("{keyword} | {name}"),
    ];
    for candidate in &candidates {
        if candidate.chars().count() <= YOUTUBE_TITLE_MAX_CHARS {
            return candidate.clone();
        }
    }
    truncate_chars(&candidates[0], YOUTUBE_TITLE_MAX_CHARS)
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Hook, bullet list, links, about section, optional sources, hashtags.
pub fn youtube_description(input: &PackInput) -> String {
    let b = &input.business;
    let name = &b.business_name;
    let region = &b.region;
    let keyword = input.primary_keyword();
    let sources = input
        .seed_url()
        .map(|url| format!("\n📚 Sources & Research:\n{url}\n"))
        .unwrap_or_default();

    format!(
        "{value_prop}\n\n\
         In this video, we break down exactly what {region} needs to know about {keyword}.\n\n\
         🎯 What You'll Learn:\n\
         • Proven {keyword} strategies that work locally\n\
         • Common mistakes to avoid\n\
         • Practical steps you can take today\n\
         • Real results from {region}\n\n\
         {cta_text}:\n{cta_url}\n\n\
         Learn more about {name}:\n{website}\n\n\
         ---\n\n\
         ABOUT {name_upper}\n\
         {value_prop} We specialize in helping {region} achieve their goals through proven, results-driven strategies.\n\
         {sources}\n\
         ---\n\n\
         CONNECT WITH US\n\
         🌐 Website: {website}\n\
         📍 Serving: {region}\n\n\
         {tags} #LocalBusiness #SmallBusiness {region_tag}",
        value_prop = b.value_prop,
        cta_text = input.offer.cta_text,
        cta_url = input.offer.cta_url,
        website = b.website,
        name_upper = name.to_uppercase(),
        tags = input.hashtags().join(" "),
        region_tag = region_tag(region),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::models::fixtures::acme_input;

    fn assert_grounded(text: &str) {
        assert!(text.contains("Acme"), "missing business name in: {text}");
        assert!(text.contains("Phoenix, AZ"), "missing region in: {text}");
        assert!(
            text.contains("plumbing") || text.contains("Phoenix"),
            "missing keyword in: {text}"
        );
    }

    #[test]
    fn test_blog_body_is_grounded_and_sectioned() {
        let body = blog_body(&acme_input());
        assert_grounded(&body);
        assert!(body.contains("We fix things"));
        assert!(body.contains("<h2>"));
        assert!(body.contains("<h3>"));
        assert!(body.contains("https://acme.test/contact"));
    }

    #[test]
    fn test_blog_body_escapes_profile_fields() {
        let mut input = acme_input();
        input.business.business_name = "Acme <script>alert(1)</script>".into();
        input.offer.cta_url = "https://acme.test/\"onclick=\"x".into();
        let body = blog_body(&input);
        assert!(!body.contains("<script>"));
        assert!(body.contains("Acme &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(body.contains(r#"href="https://acme.test/&quot;onclick=&quot;x""#));
    }

    #[test]
    fn test_every_social_post_is_grounded() {
        let input = acme_input();
        for platform in Platform::ALL {
            for day in 1..=5 {
                assert_grounded(&social_post(platform, day, &input));
            }
        }
    }

    #[test]
    fn test_social_posts_vary_by_day() {
        let input = acme_input();
        for platform in Platform::ALL {
            let posts: std::collections::HashSet<String> =
                (1..=5).map(|d| social_post(platform, d, &input)).collect();
            assert_eq!(posts.len(), 5, "{platform} posts should differ per day");
        }
    }

    #[test]
    fn test_day_angle_hooks_lead_posts() {
        let input = acme_input();
        for day in 1..=5u8 {
            let post = social_post(Platform::Gbp, day, &input);
            assert!(post.starts_with(angle_for_day(day).hook));
        }
        assert_eq!(angle_for_day(0).label, DAY_ANGLES[0].label);
        assert_eq!(angle_for_day(9).label, DAY_ANGLES[4].label);
    }

    #[test]
    fn test_instagram_includes_region_tag() {
        let post = social_post(Platform::Instagram, 1, &acme_input());
        assert!(post.contains("#PhoenixAZ"));
        assert!(post.contains("#plumbing #Phoenix"));
    }

    #[test]
    fn test_youtube_title_fits_limit() {
        let title = youtube_title(&acme_input());
        assert_eq!(title, "Plumbing for Phoenix, AZ Businesses | Acme");

        let mut long = acme_input();
        long.business.business_name = "The Extraordinarily Reliable Plumbing Cooperative".into();
        long.business.region = "Greater Phoenix Metropolitan Area, Arizona".into();
        let title = youtube_title(&long);
        assert!(title.chars().count() <= YOUTUBE_TITLE_MAX_CHARS);
        assert!(title.starts_with("Plumbing"));
    }

    #[test]
    fn test_youtube_description_structure() {
        let mut input = acme_input();
        let desc = youtube_description(&input);
        assert_grounded(&desc);
        assert!(desc.contains("What You'll Learn"));
        assert!(desc.contains("ABOUT ACME"));
        assert!(!desc.contains("Sources & Research"));

        input.seed_url = Some("https://example.test/article".into());
        assert!(youtube_description(&input).contains("https://example.test/article"));
    }

    #[test]
    fn test_templates_are_deterministic() {
        let input = acme_input();
        assert_eq!(blog_body(&input), blog_body(&input));
        assert_eq!(
            social_post(Platform::Linkedin, 3, &input),
            social_post(Platform::Linkedin, 3, &input)
        );
    }
}
