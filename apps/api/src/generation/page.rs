//! Blog page and sources artifacts.
//!
//! The page is a standalone HTML document: meta/OpenGraph tags, Article and
//! FAQPage structured data, the generated body, an optional sources block and
//! a CTA footer.

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::generation::models::PackInput;
use crate::generation::templates::{blog_faq, capitalize_first};

pub fn blog_title(input: &PackInput) -> String {
    format!(
        "{}: Complete Guide for {}",
        capitalize_first(input.primary_keyword()),
        input.business.region
    )
}

pub fn meta_description(input: &PackInput) -> String {
    format!(
        "{} Discover actionable {} strategies for {} businesses.",
        input.business.value_prop,
        input.primary_keyword(),
        input.business.region
    )
}

fn canonical_url(input: &PackInput) -> String {
    format!(
        "{}/blog/{}",
        input.business.website.trim_end_matches('/'),
        input.slug
    )
}

/// Minimal escaping for text and double-quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn article_json_ld(input: &PackInput, seed_url: Option<&str>, published: NaiveDate) -> Value {
    let b = &input.business;
    let organization = json!({
        "@type": "Organization",
        "name": b.business_name,
        "url": b.website,
    });
    let mut article = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": blog_title(input),
        "description": meta_description(input),
        "author": organization,
        "publisher": organization,
        "datePublished": published.format("%Y-%m-%d").to_string(),
        "mainEntityOfPage": canonical_url(input),
    });
    if let Some(url) = seed_url {
        article["isBasedOn"] = json!(url);
    }
    article
}

fn faq_json_ld(input: &PackInput) -> Value {
    let entities: Vec<Value> = blog_faq(input)
        .into_iter()
        .map(|(question, answer)| {
            json!({
                "@type": "Question",
                "name": question,
                "acceptedAnswer": { "@type": "Answer", "text": answer },
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    })
}

/// JSON for an inline `<script>`; angle brackets only occur inside strings,
/// so they can be unicode-escaped without changing the value.
fn script_json(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

/// Renders `app/blog/{slug}/page.html`.
pub fn render_blog_page(
    input: &PackInput,
    body_html: &str,
    seed_url: Option<&str>,
    published: NaiveDate,
) -> String {
    let b = &input.business;
    let title = escape_html(&blog_title(input));
    let description = escape_html(&meta_description(input));
    let canonical = escape_html(&canonical_url(input));
    let site_name = escape_html(&b.business_name);
    let cta_url = escape_html(&input.offer.cta_url);
    let cta_text = escape_html(&input.offer.cta_text);
    let keyword = escape_html(input.primary_keyword());
    let region = escape_html(&b.region);

    let sources = seed_url
        .map(|url| {
            let url = escape_html(url);
            format!(
                r#"
    <section class="sources">
      <h3>Sources</h3>
      <p>This article was informed by research including: <a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a></p>
    </section>
"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <link rel="canonical" href="{canonical}">
  <meta property="og:title" content="{title}">
  <meta property="og:description" content="{description}">
  <meta property="og:url" content="{canonical}">
  <meta property="og:type" content="article">
  <meta property="og:site_name" content="{site_name}">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:title" content="{title}">
  <meta name="twitter:description" content="{description}">
  <script type="application/ld+json">{article}</script>
  <script type="application/ld+json">{faq}</script>
</head>
<body>
  <article>
    <header>
      <h1>{title}</h1>
      <p class="lede">{description}</p>
    </header>

    <section class="content">
{body_html}
    </section>
{sources}
    <footer>
      <p>Want to learn more about {keyword} for your {region} business?</p>
      <a class="cta" href="{cta_url}">{cta_text}</a>
    </footer>
  </article>
</body>
</html>
"#,
        article = script_json(&article_json_ld(input, seed_url, published)),
        faq = script_json(&faq_json_ld(input)),
    )
}

/// Renders `content/{slug}/sources.md`.
pub fn sources_markdown(input: &PackInput, accessed: NaiveDate) -> String {
    let region = &input.business.region;
    let origin = match input.seed_url() {
        Some(url) => format!(
            "## Primary Source\n\
             - **URL:** {url}\n\
             - **Accessed:** {date}\n\
             - **Type:** {kind}\n\n\
             This content was created as an original work informed by the above source material. \
             All content has been significantly paraphrased and restructured to provide unique value for {region} audiences.\n",
            date = accessed.format("%Y-%m-%d"),
            kind = input
                .angle
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or("General research"),
        ),
        None => format!(
            "## Original Content\n\
             This content was created as original material based on industry best practices and expertise serving {region}.\n"
        ),
    };

    format!(
        "# Sources and Attribution\n\n\
         {origin}\n\
         ## Additional Context\n\
         - **Business:** {name}\n\
         - **Target Region:** {region}\n\
         - **Keywords:** {keywords}\n\
         - **Content Angle:** {angle}\n",
        name = input.business.business_name,
        keywords = input.keywords,
        angle = input.angle_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::models::fixtures::acme_input;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()
    }

    fn json_ld_blocks(html: &str) -> Vec<Value> {
        html.split(r#"<script type="application/ld+json">"#)
            .skip(1)
            .filter_map(|chunk| chunk.split("</script>").next())
            .map(|json| serde_json::from_str(json).unwrap())
            .collect()
    }

    #[test]
    fn test_page_has_meta_and_structured_data() {
        let input = acme_input();
        let html = render_blog_page(&input, "<h2>Body</h2>", None, date());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Plumbing: Complete Guide for Phoenix, AZ</title>"));
        assert!(html.contains(r#"<meta property="og:url" content="https://acme.test/blog/week-1">"#));
        assert!(html.contains("<h2>Body</h2>"));
        assert!(html.contains(r#"<a class="cta" href="https://acme.test/contact">Call Now</a>"#));
        assert!(!html.contains("<h3>Sources</h3>"));

        let blocks = json_ld_blocks(&html);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["@type"], "Article");
        assert_eq!(blocks[0]["datePublished"], "2026-03-04");
        assert!(blocks[0].get("isBasedOn").is_none());
        assert_eq!(blocks[1]["@type"], "FAQPage");
        assert_eq!(blocks[1]["mainEntity"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_page_with_seed_lists_source() {
        let html = render_blog_page(
            &acme_input(),
            "<p>x</p>",
            Some("https://news.test/a?b=1&c=2"),
            date(),
        );
        assert!(html.contains("<h3>Sources</h3>"));
        assert!(html.contains("https://news.test/a?b=1&amp;c=2"));
        assert_eq!(json_ld_blocks(&html)[0]["isBasedOn"], "https://news.test/a?b=1&c=2");
    }

    #[test]
    fn test_business_text_is_escaped() {
        let mut input = acme_input();
        input.business.business_name = "Acme <Pipes> & Co <script>alert(1)</script>".into();
        let body = crate::generation::templates::blog_body(&input);
        let html = render_blog_page(&input, &body, None, date());
        assert!(html.contains("Acme &lt;Pipes&gt; &amp; Co"));
        assert!(!html.contains("<Pipes>"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_sources_markdown_variants() {
        let mut input = acme_input();
        let original = sources_markdown(&input, date());
        assert!(original.contains("## Original Content"));
        assert!(original.contains("- **Business:** Acme"));
        assert!(original.contains("- **Content Angle:** General industry insights"));

        input.seed_url = Some("https://news.test/a".into());
        let seeded = sources_markdown(&input, date());
        assert!(seeded.contains("- **URL:** https://news.test/a"));
        assert!(seeded.contains("- **Accessed:** 2026-03-04"));
        assert!(seeded.contains("- **Type:** General research"));
    }
}
