use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::id::new_document_id;
use crate::schema;

/// One named, independently toggled block of a PRD.
///
/// `title`, `description` and `placeholder` are owned by the section catalog
/// and refreshed on every load; `content` and `is_enabled` are user state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub is_enabled: bool,
    pub placeholder: String,
}

/// A public-view comment. Immutable once created; lists are newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub avatar: String,
    pub text: String,
    pub date: String,
}

/// Per-document sharing switches. Independent booleans, no cross-constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettings {
    pub allow_comments: bool,
    pub allow_upvotes: bool,
    pub enable_approval_flow: bool,
}

impl Default for PublicSettings {
    fn default() -> Self {
        Self {
            allow_comments: true,
            allow_upvotes: true,
            enable_approval_flow: false,
        }
    }
}

/// Draft/published lifecycle flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    Draft,
    Published,
}

/// Approval workflow flag, settable only from the public view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// Default generation model when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Process-wide settings, persisted independently of any document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub gemini_model: String,
    pub gemini_api_key: String,
    pub webhook_url: String,
    pub email: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_api_key: String::new(),
            webhook_url: String::new(),
            email: String::new(),
        }
    }
}

/// Snapshot passed to the generation capability to ground its output.
/// Rebuilt on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub product_name: String,
    pub short_description: String,
    /// Section title -> content, restricted to enabled sections with content.
    pub existing_sections: BTreeMap<String, String>,
}

/// The structured document this system edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prd {
    pub id: String,
    pub title: String,
    pub product_name: String,
    pub short_description: String,
    /// Always exactly one entry per catalog id, in catalog order.
    pub sections: Vec<Section>,
    pub is_public: bool,
    pub public_settings: PublicSettings,
    pub upvotes: i64,
    /// Newest first.
    pub comments: Vec<Comment>,
    pub last_updated: DateTime<Utc>,
    pub status: DocStatus,
    pub approval_status: ApprovalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Prd {
    /// A fresh draft with a new id and the full default section set.
    pub fn fresh() -> Self {
        Self {
            id: new_document_id(),
            title: "New PRD".to_string(),
            product_name: String::new(),
            short_description: String::new(),
            sections: schema::default_sections(),
            is_public: false,
            public_settings: PublicSettings::default(),
            upvotes: 0,
            comments: Vec::new(),
            last_updated: Utc::now(),
            status: DocStatus::Draft,
            approval_status: ApprovalStatus::Pending,
            created_at: None,
            created_by: None,
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Whether the document carries state worth persisting.
    /// Guards autosave against writing empty scratch documents.
    pub fn is_meaningful(&self) -> bool {
        !self.product_name.is_empty() || self.sections.iter().any(|s| !s.content.is_empty())
    }

    /// Build the context snapshot for a generation call.
    pub fn generation_context(&self) -> GenerationContext {
        let existing_sections = self
            .sections
            .iter()
            .filter(|s| s.is_enabled && !s.content.is_empty())
            .map(|s| (s.title.clone(), s.content.clone()))
            .collect();
        GenerationContext {
            product_name: self.product_name.clone(),
            short_description: self.short_description.clone(),
            existing_sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_prd_matches_catalog() {
        let prd = Prd::fresh();
        assert_eq!(prd.sections.len(), schema::CATALOG.len());
        for (section, def) in prd.sections.iter().zip(schema::CATALOG) {
            assert_eq!(section.id, def.id);
            assert_eq!(section.title, def.title);
            assert_eq!(section.content, "");
            assert_eq!(section.is_enabled, def.enabled_by_default);
        }
        assert_eq!(prd.status, DocStatus::Draft);
        assert_eq!(prd.approval_status, ApprovalStatus::Pending);
        assert!(!prd.is_public);
        assert_eq!(prd.upvotes, 0);
        assert!(prd.comments.is_empty());
    }

    #[test]
    fn meaningful_requires_name_or_content() {
        let mut prd = Prd::fresh();
        assert!(!prd.is_meaningful());

        prd.product_name = "Acme".to_string();
        assert!(prd.is_meaningful());

        prd.product_name.clear();
        prd.sections[0].content = "overview".to_string();
        assert!(prd.is_meaningful());
    }

    #[test]
    fn generation_context_restricts_to_enabled_with_content() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.sections[0].content = "summary text".to_string();
        prd.sections[1].content = "problem text".to_string();
        prd.sections[1].is_enabled = false;

        let ctx = prd.generation_context();
        assert_eq!(ctx.product_name, "Acme");
        assert_eq!(ctx.existing_sections.len(), 1);
        assert_eq!(
            ctx.existing_sections.get(&prd.sections[0].title),
            Some(&"summary text".to_string())
        );
    }

    #[test]
    fn wire_names_are_camel_case() {
        let prd = Prd::fresh();
        let value = serde_json::to_value(&prd).unwrap();
        assert!(value.get("productName").is_some());
        assert!(value.get("shortDescription").is_some());
        assert!(value.get("publicSettings").is_some());
        assert!(value.get("lastUpdated").is_some());
        assert!(value.get("approvalStatus").is_some());
        assert_eq!(value["status"], "draft");
        assert!(value["sections"][0].get("isEnabled").is_some());
        // Optional provenance fields stay off the wire until set.
        assert!(value.get("createdAt").is_none());
    }
}
