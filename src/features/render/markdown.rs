//! Markdown to HTML for chat bubbles
//!
//! Replies lean on Markdown for numbered steps, emphasis and "Sources"
//! headings. Raw HTML in the text is escaped rather than passed through, and
//! script-capable link targets are neutralised.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Render bubble text as an HTML fragment safe to insert into the page
pub fn render_markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lowered = url.trim_start().to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_steps_and_emphasis() {
        let html = render_markdown("Steps:\n\n1. Open the app\n2. Press **Start**");

        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>Open the app</li>"));
        assert!(html.contains("<strong>Start</strong>"));
    }

    #[test]
    fn test_sources_heading() {
        let html = render_markdown("Answer.\n\n### Sources\n- [Docs](https://example.com/docs)");

        assert!(html.contains("<h3>Sources</h3>"));
        assert!(html.contains("<a href=\"https://example.com/docs\">Docs</a>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("hi <script>alert(1)</script> <b>bold</b>");

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));

        let block = render_markdown("<div onclick=\"x()\">block</div>");
        assert!(!block.contains("<div"));
    }

    #[test]
    fn test_script_links_neutralised() {
        let html = render_markdown("[click](javascript:alert(1)) ![x](JavaScript:alert(2))");

        assert!(!html.to_ascii_lowercase().contains("javascript:"));
        assert!(html.contains("href=\"#\""));
    }

    #[test]
    fn test_plain_text_is_a_paragraph() {
        assert_eq!(render_markdown("2 + 2 = 4"), "<p>2 + 2 = 4</p>\n");
    }
}
