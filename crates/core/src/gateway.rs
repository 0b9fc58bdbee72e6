//! Contracts for the external collaborators the controller talks to.
//!
//! The controller never sees concrete transports: the persistence backend is
//! an opaque key-addressed store, text generation is an opaque capability,
//! and webhook delivery is fire-and-forget. Every operation here may fail;
//! the controller treats all failures as non-fatal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::document::model::{ApprovalStatus, AppSettings, Comment, GenerationContext, Prd};

/// Persistence failures. All non-fatal to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("store request failed: {0}")]
    Unavailable(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// The opaque key-addressed persistence backend.
///
/// `fetch` hands back the raw stored record: the load boundary owns all
/// shape coercion, so the store is never trusted to return a well-formed
/// document. `save` has upsert semantics and is idempotent on repeated
/// identical calls. For comments the store is the source of truth for
/// ordering and returns the full list, not a delta.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Option<Value>, StoreError>;
    async fn save(&self, prd: &Prd) -> Result<Prd, StoreError>;
    async fn add_comment(&self, prd_id: &str, comment: &Comment) -> Result<Vec<Comment>, StoreError>;
    /// Returns the new count; decrements floor at zero.
    async fn toggle_upvote(&self, prd_id: &str, increment: bool) -> Result<i64, StoreError>;
    async fn update_status(&self, prd_id: &str, status: ApprovalStatus) -> Result<(), StoreError>;
    async fn get_settings(&self) -> Result<AppSettings, StoreError>;
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StoreError>;
}

/// Generation failures. Empty or failed output means "no change" upstream.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation credential is not configured")]
    MissingApiKey,
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation returned an unusable response: {0}")]
    BadResponse(String),
}

/// The opaque text-generation capability.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_section(
        &self,
        title: &str,
        context: &GenerationContext,
    ) -> Result<String, GenerationError>;
    async fn generate_description(&self, product_name: &str) -> Result<String, GenerationError>;
    async fn enhance(&self, text: &str, instruction: &str) -> Result<String, GenerationError>;
}

/// Event delivered when a document's approval status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEvent {
    pub event: String,
    pub prd_id: String,
    pub title: String,
    pub status: ApprovalStatus,
    pub approver: Approver,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_test: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub name: String,
    pub email: String,
}

/// Approver metadata supplied by the public view on a status change.
#[derive(Debug, Clone, Default)]
pub struct ApproverDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub comment: Option<String>,
}

pub const APPROVAL_EVENT_NAME: &str = "prd_approval_status_changed";

impl ApprovalEvent {
    /// Build the delivery payload, filling the documented defaults for
    /// omitted approver fields.
    pub fn new(
        prd_id: &str,
        title: &str,
        status: ApprovalStatus,
        details: &ApproverDetails,
    ) -> Self {
        Self {
            event: APPROVAL_EVENT_NAME.to_string(),
            prd_id: prd_id.to_string(),
            title: title.to_string(),
            status,
            approver: Approver {
                name: details
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "Anonymous".to_string()),
                email: details
                    .email
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Not provided".to_string()),
            },
            comment: details.comment.clone().unwrap_or_default(),
            timestamp: Utc::now(),
            is_test: None,
        }
    }

    /// A canned event for verifying webhook connectivity and schema handling.
    pub fn test_event() -> Self {
        Self {
            event: APPROVAL_EVENT_NAME.to_string(),
            prd_id: "test_prd_id_12345".to_string(),
            title: "Test Product Requirements Document".to_string(),
            status: ApprovalStatus::Approved,
            approver: Approver {
                name: "Test Approver".to_string(),
                email: "approver@example.com".to_string(),
            },
            comment: "This is a test event to verify webhook payload structure and connectivity."
                .to_string(),
            timestamp: Utc::now(),
            is_test: Some(true),
        }
    }
}

/// Fire-and-forget webhook delivery. The result is advisory only and never
/// blocks or reverts the caller's state transition.
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    async fn deliver(&self, url: &str, event: &ApprovalEvent) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_event_fills_defaults() {
        let event = ApprovalEvent::new("p1", "Acme", ApprovalStatus::Rejected, &ApproverDetails::default());
        assert_eq!(event.event, APPROVAL_EVENT_NAME);
        assert_eq!(event.approver.name, "Anonymous");
        assert_eq!(event.approver.email, "Not provided");
        assert_eq!(event.comment, "");
        assert!(event.is_test.is_none());
    }

    #[test]
    fn approval_event_keeps_supplied_details() {
        let details = ApproverDetails {
            name: Some("Dana".to_string()),
            email: Some("dana@example.com".to_string()),
            comment: Some("ship it".to_string()),
        };
        let event = ApprovalEvent::new("p1", "Acme", ApprovalStatus::Approved, &details);
        assert_eq!(event.approver.name, "Dana");
        assert_eq!(event.approver.email, "dana@example.com");
        assert_eq!(event.comment, "ship it");
    }

    #[test]
    fn approval_event_wire_shape() {
        let value = serde_json::to_value(ApprovalEvent::test_event()).unwrap();
        assert_eq!(value["event"], "prd_approval_status_changed");
        assert_eq!(value["status"], "approved");
        assert_eq!(value["isTest"], true);
        assert!(value.get("prdId").is_some());
        assert!(value["approver"].get("name").is_some());
    }
}
