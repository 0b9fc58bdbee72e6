//! Load-boundary normalization.
//!
//! Fetched and imported records arrive as raw JSON that may predate or
//! postdate the current section catalog, or may simply be malformed. All of
//! that is absorbed here, in one place, so the rest of the crate only ever
//! sees a well-formed [`Prd`]:
//!
//! - top-level fields are taken from the record when present and typed
//! - `sections` is rebuilt catalog-first: metadata from the catalog, user
//!   state (`content`, `is_enabled`) from the record, unknown ids dropped
//! - `comments` collapses to empty unless it is a list
//! - `upvotes` collapses to zero unless it is a non-negative number
//! - `approvalStatus` defaults to pending, `publicSettings` merges fetched
//!   keys over defaults

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::document::model::{ApprovalStatus, Comment, DocStatus, Prd};
use crate::schema;

/// Normalize a raw fetched/imported record into a well-formed document.
///
/// Never fails: anything unusable in the record falls back to the defaults
/// of a fresh document.
pub fn normalize_document(raw: &Value) -> Prd {
    let mut prd = Prd::fresh();

    let Some(record) = raw.as_object() else {
        tracing::warn!("fetched record is not an object, starting from defaults");
        return prd;
    };

    if let Some(id) = non_empty_str(record.get("id")) {
        prd.id = id.to_string();
    }
    if let Some(title) = non_empty_str(record.get("title")) {
        prd.title = title.to_string();
    }
    if let Some(name) = record.get("productName").and_then(Value::as_str) {
        prd.product_name = name.to_string();
    }
    if let Some(desc) = record.get("shortDescription").and_then(Value::as_str) {
        prd.short_description = desc.to_string();
    }
    if let Some(is_public) = record.get("isPublic").and_then(Value::as_bool) {
        prd.is_public = is_public;
    }

    // Missing keys get defaults, present keys win; never a full overwrite.
    if let Some(settings) = record.get("publicSettings").and_then(Value::as_object) {
        if let Some(b) = settings.get("allowComments").and_then(Value::as_bool) {
            prd.public_settings.allow_comments = b;
        }
        if let Some(b) = settings.get("allowUpvotes").and_then(Value::as_bool) {
            prd.public_settings.allow_upvotes = b;
        }
        if let Some(b) = settings.get("enableApprovalFlow").and_then(Value::as_bool) {
            prd.public_settings.enable_approval_flow = b;
        }
    }

    prd.upvotes = record
        .get("upvotes")
        .and_then(Value::as_i64)
        .unwrap_or(0)
        .max(0);

    prd.comments = match record.get("comments") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| serde_json::from_value::<Comment>(entry.clone()).ok())
            .collect(),
        _ => Vec::new(),
    };

    if let Some(ts) = record.get("lastUpdated").and_then(Value::as_str) {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(ts) {
            prd.last_updated = parsed.with_timezone(&Utc);
        }
    }

    if record.get("status").and_then(Value::as_str) == Some("published") {
        prd.status = DocStatus::Published;
    }

    prd.approval_status = match record.get("approvalStatus").and_then(Value::as_str) {
        Some("approved") => ApprovalStatus::Approved,
        Some("rejected") => ApprovalStatus::Rejected,
        _ => ApprovalStatus::Pending,
    };

    if let Some(ts) = record.get("createdAt").and_then(Value::as_str) {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(ts) {
            prd.created_at = Some(parsed.with_timezone(&Utc));
        }
    }
    if let Some(by) = non_empty_str(record.get("createdBy")) {
        prd.created_by = Some(by.to_string());
    }

    // Catalog-first section rebuild. Exactly one section per catalog id, in
    // catalog order; record entries contribute user state only.
    let saved_sections = record.get("sections").and_then(Value::as_array);
    prd.sections = schema::CATALOG
        .iter()
        .map(|def| {
            let mut section = def.instantiate();
            let saved = saved_sections.and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e.get("id").and_then(Value::as_str) == Some(def.id))
            });
            if let Some(entry) = saved {
                if let Some(content) = entry.get("content").and_then(Value::as_str) {
                    section.content = content.to_string();
                }
                if let Some(enabled) = entry.get("isEnabled").and_then(Value::as_bool) {
                    section.is_enabled = enabled;
                }
            }
            section
        })
        .collect();

    prd
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sections_missing_from_record_get_catalog_defaults() {
        let raw = json!({
            "id": "doc1",
            "productName": "Acme",
            "sections": [
                { "id": "problem_statement", "content": "a problem", "isEnabled": false }
            ]
        });
        let prd = normalize_document(&raw);

        assert_eq!(prd.sections.len(), schema::CATALOG.len());
        let problem = prd.section("problem_statement").unwrap();
        assert_eq!(problem.content, "a problem");
        assert!(!problem.is_enabled);

        // Everything not in the record is a clean default.
        let summary = prd.section("executive_summary").unwrap();
        assert_eq!(summary.content, "");
        assert!(summary.is_enabled);
    }

    #[test]
    fn unknown_section_ids_are_dropped() {
        let raw = json!({
            "id": "doc1",
            "sections": [
                { "id": "legacy_budget_section", "content": "old", "isEnabled": true },
                { "id": "user_stories", "content": "stories", "isEnabled": true }
            ]
        });
        let prd = normalize_document(&raw);

        assert_eq!(prd.sections.len(), schema::CATALOG.len());
        assert!(prd.section("legacy_budget_section").is_none());
        assert_eq!(prd.section("user_stories").unwrap().content, "stories");
        // Order is catalog order, not record order.
        for (section, def) in prd.sections.iter().zip(schema::CATALOG) {
            assert_eq!(section.id, def.id);
        }
    }

    #[test]
    fn schema_metadata_wins_over_persisted_metadata() {
        let raw = json!({
            "sections": [{
                "id": "risks",
                "title": "Stale Title",
                "description": "stale",
                "placeholder": "stale",
                "content": "risk content",
                "isEnabled": true
            }]
        });
        let prd = normalize_document(&raw);
        let risks = prd.section("risks").unwrap();

        let def = schema::find("risks").unwrap();
        assert_eq!(risks.title, def.title);
        assert_eq!(risks.description, def.description);
        assert_eq!(risks.placeholder, def.placeholder);
        assert_eq!(risks.content, "risk content");
        assert!(risks.is_enabled);
    }

    #[test]
    fn malformed_collections_collapse_to_defaults() {
        let raw = json!({
            "id": "doc1",
            "comments": "not a list",
            "upvotes": "not a number",
            "sections": "not a list either"
        });
        let prd = normalize_document(&raw);

        assert!(prd.comments.is_empty());
        assert_eq!(prd.upvotes, 0);
        assert_eq!(prd.sections.len(), schema::CATALOG.len());
    }

    #[test]
    fn negative_upvotes_floor_at_zero() {
        let prd = normalize_document(&json!({ "upvotes": -3 }));
        assert_eq!(prd.upvotes, 0);
    }

    #[test]
    fn missing_approval_status_defaults_to_pending() {
        let prd = normalize_document(&json!({ "id": "doc1" }));
        assert_eq!(prd.approval_status, ApprovalStatus::Pending);

        let prd = normalize_document(&json!({ "approvalStatus": "approved" }));
        assert_eq!(prd.approval_status, ApprovalStatus::Approved);

        let prd = normalize_document(&json!({ "approvalStatus": "nonsense" }));
        assert_eq!(prd.approval_status, ApprovalStatus::Pending);
    }

    #[test]
    fn partial_public_settings_merge_over_defaults() {
        let prd = normalize_document(&json!({
            "publicSettings": { "allowComments": false }
        }));
        assert!(!prd.public_settings.allow_comments);
        assert!(prd.public_settings.allow_upvotes);
        assert!(!prd.public_settings.enable_approval_flow);
    }

    #[test]
    fn malformed_comment_entries_are_skipped() {
        let prd = normalize_document(&json!({
            "comments": [
                { "id": "c1", "author": "A", "avatar": "", "text": "first", "date": "today" },
                { "bogus": true },
                42
            ]
        }));
        assert_eq!(prd.comments.len(), 1);
        assert_eq!(prd.comments[0].text, "first");
    }

    #[test]
    fn non_object_record_yields_fresh_document() {
        let prd = normalize_document(&json!("scalar"));
        assert_eq!(prd.sections.len(), schema::CATALOG.len());
        assert_eq!(prd.status, DocStatus::Draft);
        assert!(!prd.id.is_empty());
    }

    #[test]
    fn published_status_and_timestamps_survive() {
        let raw = json!({
            "id": "doc1",
            "status": "published",
            "isPublic": true,
            "lastUpdated": "2025-03-01T12:00:00Z",
            "createdAt": "2025-02-01T08:30:00Z",
            "createdBy": "pm@example.com"
        });
        let prd = normalize_document(&raw);
        assert_eq!(prd.status, DocStatus::Published);
        assert!(prd.is_public);
        assert_eq!(prd.last_updated.to_rfc3339(), "2025-03-01T12:00:00+00:00");
        assert!(prd.created_at.is_some());
        assert_eq!(prd.created_by.as_deref(), Some("pm@example.com"));
    }
}
