//! In-memory gateway doubles shared by tests across the workspace.
//!
//! [`MemoryStore`] reproduces the persistence contract faithfully enough to
//! exercise the controller end to end: fetch-by-id over raw records, upsert
//! saves, prepend-ordered comments, an atomic upvote counter that floors at
//! zero, and a settings singleton. Each read-modify-write runs under one
//! lock, so concurrent upvotes never lose updates.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::model::{
    ApprovalStatus, AppSettings, Comment, GenerationContext, Prd,
};
use crate::gateway::{
    ApprovalEvent, ContentGenerator, DocumentStore, GenerationError, StoreError, WebhookNotifier,
};

/// In-memory key-addressed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    documents: HashMap<String, Value>,
    settings: Option<AppSettings>,
    saves: u64,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw record, bypassing the typed model. Used to exercise the
    /// load-boundary normalization against malformed data.
    pub fn insert_raw(&self, id: &str, record: Value) {
        self.inner.lock().unwrap().documents.insert(id.to_string(), record);
    }

    pub fn insert(&self, prd: &Prd) {
        self.insert_raw(&prd.id, serde_json::to_value(prd).expect("prd serializes"));
    }

    /// Make every subsequent operation fail, or stop failing.
    pub fn set_fail(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> u64 {
        self.inner.lock().unwrap().saves
    }

    pub fn stored(&self, id: &str) -> Option<Value> {
        self.inner.lock().unwrap().documents.get(id).cloned()
    }

    fn check_fail(state: &StoreState) -> Result<(), StoreError> {
        if state.fail {
            Err(StoreError::Unavailable("scripted store failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, id: &str) -> Result<Option<Value>, StoreError> {
        let state = self.inner.lock().unwrap();
        Self::check_fail(&state)?;
        Ok(state.documents.get(id).cloned())
    }

    async fn save(&self, prd: &Prd) -> Result<Prd, StoreError> {
        let mut state = self.inner.lock().unwrap();
        Self::check_fail(&state)?;
        let record = serde_json::to_value(prd)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        state.documents.insert(prd.id.clone(), record);
        state.saves += 1;
        Ok(prd.clone())
    }

    async fn add_comment(
        &self,
        prd_id: &str,
        comment: &Comment,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut state = self.inner.lock().unwrap();
        Self::check_fail(&state)?;
        let record = state
            .documents
            .get_mut(prd_id)
            .ok_or_else(|| StoreError::NotFound(prd_id.to_string()))?;

        let mut comments = match record.get("comments") {
            Some(Value::Array(entries)) => entries.clone(),
            _ => Vec::new(),
        };
        comments.insert(0, serde_json::to_value(comment).expect("comment serializes"));
        record["comments"] = Value::Array(comments.clone());

        Ok(comments
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect())
    }

    async fn toggle_upvote(&self, prd_id: &str, increment: bool) -> Result<i64, StoreError> {
        let mut state = self.inner.lock().unwrap();
        Self::check_fail(&state)?;
        let record = state
            .documents
            .get_mut(prd_id)
            .ok_or_else(|| StoreError::NotFound(prd_id.to_string()))?;

        let current = record.get("upvotes").and_then(Value::as_i64).unwrap_or(0);
        let next = if increment { current + 1 } else { (current - 1).max(0) };
        record["upvotes"] = Value::from(next);
        Ok(next)
    }

    async fn update_status(&self, prd_id: &str, status: ApprovalStatus) -> Result<(), StoreError> {
        let mut state = self.inner.lock().unwrap();
        Self::check_fail(&state)?;
        let record = state
            .documents
            .get_mut(prd_id)
            .ok_or_else(|| StoreError::NotFound(prd_id.to_string()))?;
        record["approvalStatus"] = Value::from(status.as_str());
        Ok(())
    }

    async fn get_settings(&self) -> Result<AppSettings, StoreError> {
        let state = self.inner.lock().unwrap();
        Self::check_fail(&state)?;
        Ok(state.settings.clone().unwrap_or_default())
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StoreError> {
        let mut state = self.inner.lock().unwrap();
        Self::check_fail(&state)?;
        state.settings = Some(settings.clone());
        Ok(())
    }
}

/// One recorded generation call.
#[derive(Debug, Clone)]
pub enum GeneratorCall {
    Section {
        title: String,
        context: GenerationContext,
    },
    Description {
        product_name: String,
    },
    Enhance {
        text: String,
        instruction: String,
    },
}

/// Canned generator that records every call.
#[derive(Debug)]
pub struct ScriptedGenerator {
    response: Option<String>,
    error: fn() -> GenerationError,
    calls: Mutex<Vec<GeneratorCall>>,
}

impl ScriptedGenerator {
    /// Succeed every call with the given text.
    pub fn returning(text: &str) -> Self {
        Self {
            response: Some(text.to_string()),
            error: || GenerationError::Request("unused".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with a transport error.
    pub fn failing() -> Self {
        Self {
            response: None,
            error: || GenerationError::Request("scripted generation failure".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call as if no credential were configured.
    pub fn missing_key() -> Self {
        Self {
            response: None,
            error: || GenerationError::MissingApiKey,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Titles of the recorded section calls, in call order.
    pub fn section_titles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GeneratorCall::Section { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GeneratorCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn respond(&self) -> Result<String, GenerationError> {
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err((self.error)()),
        }
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_section(
        &self,
        title: &str,
        context: &GenerationContext,
    ) -> Result<String, GenerationError> {
        self.record(GeneratorCall::Section {
            title: title.to_string(),
            context: context.clone(),
        });
        self.respond()
    }

    async fn generate_description(&self, product_name: &str) -> Result<String, GenerationError> {
        self.record(GeneratorCall::Description {
            product_name: product_name.to_string(),
        });
        self.respond()
    }

    async fn enhance(&self, text: &str, instruction: &str) -> Result<String, GenerationError> {
        self.record(GeneratorCall::Enhance {
            text: text.to_string(),
            instruction: instruction.to_string(),
        });
        self.respond()
    }
}

/// Notifier that records deliveries and returns a fixed outcome.
#[derive(Debug)]
pub struct RecordingNotifier {
    outcome: bool,
    deliveries: Mutex<Vec<(String, ApprovalEvent)>>,
}

impl RecordingNotifier {
    pub fn delivering(outcome: bool) -> Self {
        Self {
            outcome,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn deliveries(&self) -> Vec<(String, ApprovalEvent)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookNotifier for RecordingNotifier {
    async fn deliver(&self, url: &str, event: &ApprovalEvent) -> bool {
        self.deliveries
            .lock()
            .unwrap()
            .push((url.to_string(), event.clone()));
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn upvotes_floor_at_zero() {
        let store = MemoryStore::new();
        let prd = Prd::fresh();
        store.insert(&prd);

        assert_eq!(store.toggle_upvote(&prd.id, false).await.unwrap(), 0);
        assert_eq!(store.toggle_upvote(&prd.id, true).await.unwrap(), 1);
        assert_eq!(store.toggle_upvote(&prd.id, true).await.unwrap(), 2);
        assert_eq!(store.toggle_upvote(&prd.id, false).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_upvotes_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let prd = Prd::fresh();
        store.insert(&prd);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let id = prd.id.clone();
            handles.push(tokio::spawn(async move {
                store.toggle_upvote(&id, true).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = store.stored(&prd.id).unwrap();
        assert_eq!(record["upvotes"], 16);
    }

    #[tokio::test]
    async fn comments_prepend_newest_first() {
        let store = MemoryStore::new();
        let prd = Prd::fresh();
        store.insert(&prd);

        let first = Comment {
            id: "c1".to_string(),
            author: "A".to_string(),
            avatar: String::new(),
            text: "first".to_string(),
            date: "2025-01-01".to_string(),
        };
        let second = Comment {
            text: "second".to_string(),
            id: "c2".to_string(),
            ..first.clone()
        };

        store.add_comment(&prd.id, &first).await.unwrap();
        let list = store.add_comment(&prd.id, &second).await.unwrap();
        assert_eq!(list[0].text, "second");
        assert_eq!(list[1].text, "first");
    }

    #[tokio::test]
    async fn comment_on_unknown_document_is_not_found() {
        let store = MemoryStore::new();
        let comment = Comment {
            id: "c1".to_string(),
            author: "A".to_string(),
            avatar: String::new(),
            text: "hello".to_string(),
            date: "2025-01-01".to_string(),
        };
        let err = store.add_comment("missing", &comment).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
