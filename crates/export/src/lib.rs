//! One-way export serializers for a PRD, plus the JSON import path.
//!
//! Every exporter renders enabled sections only, in catalog order (which is
//! the order the document already carries). JSON is the one format that
//! round-trips: importing previously exported JSON reproduces an equivalent
//! document after shape validation and normalization.

pub mod html;
pub mod json;
pub mod markdown;
pub mod text;

use chrono::{DateTime, Utc};

pub use html::to_html;
pub use json::{import_json, to_json};
pub use markdown::to_markdown;
pub use text::to_text;

/// Placeholder rendered for enabled sections that have no content yet.
pub(crate) const NO_CONTENT: &str = "(No content)";

/// Display name for documents without a product name.
pub(crate) fn display_name(product_name: &str) -> &str {
    if product_name.is_empty() {
        "Untitled Product"
    } else {
        product_name
    }
}

/// Human-readable date for the version line of each format.
pub(crate) fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}
