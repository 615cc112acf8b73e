//! CSV export: one row for the blog, one per social artifact.

use super::{day_of, platform_label, social_platform, ExportData};

const HEADER: [&str; 5] = ["Type", "Platform", "Day", "Content", "Image URL"];

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn row(cells: [&str; 5]) -> String {
    cells.iter().map(|c| quote(c)).collect::<Vec<_>>().join(",")
}

/// Every cell quoted, embedded quotes doubled, rows joined by `\n`.
pub fn generate_csv(data: &ExportData) -> String {
    let mut rows = vec![row(HEADER)];

    if let Some(blog) = data.blog_post() {
        rows.push(row(["Blog", "Website", "", &blog.content, ""]));
    }

    for post in data.social_posts() {
        let platform = social_platform(&post.path).unwrap_or_default();
        let day = day_of(&post.path).unwrap_or_default();
        let image_url = if day.is_empty() {
            ""
        } else {
            let platform_segment = format!("/{platform}/");
            let day_segment = format!("day-{day}.");
            data.images
                .iter()
                .find(|img| img.path.contains(&platform_segment) && img.path.contains(&day_segment))
                .map(|img| img.url.as_str())
                .unwrap_or_default()
        };

        rows.push(row([
            "Social",
            platform_label(platform),
            day,
            &post.content,
            image_url,
        ]));
    }

    rows.join("\n")
}
