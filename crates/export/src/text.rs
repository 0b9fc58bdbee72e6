//! Plain-text export.

use propel_core::Prd;

use crate::{display_name, format_date, NO_CONTENT};

/// Render the document as plain text with underlined banners.
pub fn to_text(prd: &Prd) -> String {
    let name = display_name(&prd.product_name);
    let mut out = format!("{name}\n{}\n\n", "=".repeat(name.len()));

    if !prd.short_description.is_empty() {
        out.push_str(&format!("{}\n\n", prd.short_description));
    }

    out.push_str("Version: 1.0\n");
    out.push_str(&format!("Last Updated: {}\n\n", format_date(prd.last_updated)));

    for section in prd.sections.iter().filter(|s| s.is_enabled) {
        out.push_str(&format!("\n{}\n", section.title.to_uppercase()));
        out.push_str(&format!("{}\n", "-".repeat(section.title.len())));
        let content = if section.content.is_empty() {
            NO_CONTENT
        } else {
            &section.content
        };
        out.push_str(&format!("{content}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banners_are_uppercase_and_underlined() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.sections[0].content = "summary".to_string();

        let text = to_text(&prd);

        assert!(text.starts_with("Acme\n====\n\n"));
        assert!(text.contains("\nEXECUTIVE SUMMARY\n-----------------\nsummary\n"));
    }

    #[test]
    fn disabled_sections_are_omitted() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.sections[1].is_enabled = false;

        let text = to_text(&prd);
        assert!(!text.contains("PROBLEM STATEMENT"));
    }
}
