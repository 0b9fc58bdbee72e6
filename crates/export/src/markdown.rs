//! Markdown export.

use propel_core::Prd;

use crate::{display_name, format_date, NO_CONTENT};

/// Render the document as a standalone Markdown file.
pub fn to_markdown(prd: &Prd) -> String {
    let mut md = format!("# {}\n\n", display_name(&prd.product_name));

    if !prd.short_description.is_empty() {
        md.push_str(&format!("> {}\n\n", prd.short_description));
    }

    md.push_str("**Version:** 1.0  \n");
    md.push_str(&format!("**Last Updated:** {}\n\n", format_date(prd.last_updated)));
    md.push_str("---\n\n");

    for section in prd.sections.iter().filter(|s| s.is_enabled) {
        md.push_str(&format!("## {}\n\n", section.title));
        let content = if section.content.is_empty() {
            NO_CONTENT
        } else {
            &section.content
        };
        md.push_str(&format!("{content}\n\n"));
    }

    md.push_str("\n---\n*Generated with Propel PRD*");
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_enabled_sections_in_order() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.short_description = "A product.".to_string();
        prd.sections[0].content = "the summary".to_string();
        prd.sections[1].is_enabled = false;

        let md = to_markdown(&prd);

        assert!(md.starts_with("# Acme\n\n> A product.\n\n"));
        assert!(md.contains("## Executive Summary\n\nthe summary\n\n"));
        assert!(!md.contains("## Problem Statement"));
        // Empty enabled sections render the placeholder.
        assert!(md.contains("## User Stories\n\n(No content)\n\n"));
        // Order follows the document's section order.
        let summary_at = md.find("## Executive Summary").unwrap();
        let stories_at = md.find("## User Stories").unwrap();
        assert!(summary_at < stories_at);
    }

    #[test]
    fn untitled_fallback() {
        let prd = Prd::fresh();
        let md = to_markdown(&prd);
        assert!(md.starts_with("# Untitled Product\n\n"));
        // No description line when the description is empty.
        assert!(!md.contains("> "));
    }
}
