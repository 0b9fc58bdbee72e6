//! Standalone HTML export with inline styles.

use propel_core::{Prd, Section};

use crate::{display_name, format_date};

const STYLE: &str = r#"
        body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; padding: 2rem; }
        h1 { font-size: 2.5rem; margin-bottom: 0.5rem; color: #111; }
        .meta { color: #666; font-size: 0.9rem; margin-bottom: 2rem; border-bottom: 1px solid #eee; padding-bottom: 1rem; }
        h2 { margin-top: 2rem; border-bottom: 1px solid #eee; padding-bottom: 0.5rem; color: #111; }
        .description { font-size: 1.2rem; color: #555; margin-bottom: 2rem; font-weight: 300; }
        footer { margin-top: 4rem; text-align: center; color: #888; font-size: 0.8rem; }
"#;

/// Render the document as a self-contained HTML page.
pub fn to_html(prd: &Prd) -> String {
    let title = display_name(&prd.product_name);

    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>{} - PRD</title>\n    <style>{}</style>\n</head>\n<body>\n    <header>\n        \
         <h1>{}</h1>\n        <div class=\"description\">{}</div>\n        <div class=\"meta\">\n            \
         <span>Version 1.0</span> &bull;\n            <span>Last Updated: {}</span>\n        </div>\n    \
         </header>\n    <main>",
        escape(title),
        STYLE,
        escape(title),
        escape(&prd.short_description),
        format_date(prd.last_updated),
    );

    for section in prd.sections.iter().filter(|s| s.is_enabled) {
        html.push_str(&format!(
            "\n        <section>\n            <h2>{}</h2>\n            <div>{}</div>\n        </section>",
            escape(&section.title),
            section_body(section),
        ));
    }

    html.push_str("\n    </main>\n    <footer>\n        Generated with Propel PRD\n    </footer>\n</body>\n</html>");
    html
}

/// Paragraphs split on blank lines, single newlines become `<br>`.
fn section_body(section: &Section) -> String {
    if section.content.is_empty() {
        return "<p><em>(No content)</em></p>".to_string();
    }
    section
        .content
        .split("\n\n")
        .map(|paragraph| format!("<p>{}</p>", escape(paragraph).replace('\n', "<br>")))
        .collect()
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sections_and_paragraphs() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.sections[0].content = "first paragraph\nsame paragraph\n\nsecond paragraph".to_string();

        let html = to_html(&prd);

        assert!(html.contains("<title>Acme - PRD</title>"));
        assert!(html.contains("<h2>Executive Summary</h2>"));
        assert!(html.contains("<p>first paragraph<br>same paragraph</p><p>second paragraph</p>"));
    }

    #[test]
    fn empty_sections_render_a_placeholder() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();

        let html = to_html(&prd);
        assert!(html.contains("<p><em>(No content)</em></p>"));
    }

    #[test]
    fn markup_in_content_is_escaped() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.sections[0].content = "<script>alert(1)</script> & more".to_string();

        let html = to_html(&prd);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; more"));
    }

    #[test]
    fn disabled_sections_are_omitted() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.sections[1].is_enabled = false;

        let html = to_html(&prd);
        assert!(!html.contains("<h2>Problem Statement</h2>"));
    }
}
