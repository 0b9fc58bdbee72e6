//! The document state controller.
//!
//! Single source of truth for the active document, the current view, and
//! in-flight operation flags. All reads and writes to the persistence and
//! generation gateways go through here. Actions are whole-document
//! read-modify-write under one lock, never held across an await; overlapping
//! async operations are re-entrant and last-write-wins per section.

pub mod routing;
pub mod state;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::document::id::{is_plausible_id, new_comment_id};
use crate::document::model::{ApprovalStatus, AppSettings, Comment, DocStatus, PublicSettings};
use crate::document::normalize::normalize_document;
use crate::gateway::{
    ApprovalEvent, ApproverDetails, ContentGenerator, DocumentStore, WebhookNotifier,
};

pub use routing::{AddressBar, MemoryAddressBar, RouteQuery, ViewState};
pub use state::{BusyFlags, ControllerState};

/// Debounce window for autosave.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(2);

/// Which top-level product field a context edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextField {
    ProductName,
    ShortDescription,
}

/// The controller. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct DocumentController {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn ContentGenerator>,
    notifier: Arc<dyn WebhookNotifier>,
    address: Arc<dyn AddressBar>,
    state: Mutex<ControllerState>,
    /// The single latest-scheduled autosave. A new mutation aborts and
    /// replaces it; there is never a queue of pending saves.
    save_task: Mutex<Option<JoinHandle<()>>>,
    save_delay: Duration,
}

impl DocumentController {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn ContentGenerator>,
        notifier: Arc<dyn WebhookNotifier>,
        address: Arc<dyn AddressBar>,
    ) -> Self {
        Self::with_save_delay(store, generator, notifier, address, DEFAULT_AUTOSAVE_DELAY)
    }

    pub fn with_save_delay(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn ContentGenerator>,
        notifier: Arc<dyn WebhookNotifier>,
        address: Arc<dyn AddressBar>,
        save_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                generator,
                notifier,
                address,
                state: Mutex::new(ControllerState::new()),
                save_task: Mutex::new(None),
                save_delay,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.state.lock().unwrap()
    }

    // --- Startup resolution -------------------------------------------------

    /// Resolve initial state from the routing context. Run once.
    pub async fn startup(&self) {
        match self.inner.store.get_settings().await {
            Ok(settings) => self.lock().settings = settings,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load settings, using defaults");
            }
        }

        let query = self.inner.address.current();
        if let Some(id) = query.id.as_deref().filter(|id| is_plausible_id(id)) {
            match self.inner.store.fetch(id).await {
                Ok(Some(raw)) => {
                    let prd = normalize_document(&raw);
                    let view = query.view_state().unwrap_or(ViewState::Config);
                    let mut state = self.lock();
                    state.prd = prd;
                    state.view = view;
                }
                Ok(None) => {
                    // Unknown ids are never adopted; stay on landing with a
                    // fresh document.
                    tracing::warn!(id, "document not found, starting fresh");
                }
                Err(err) => {
                    tracing::error!(id, error = %err, "failed to fetch document");
                }
            }
        }

        self.lock().loading = false;
    }

    // --- Reads --------------------------------------------------------------

    pub fn snapshot(&self) -> ControllerState {
        self.lock().clone()
    }

    pub fn view(&self) -> ViewState {
        self.lock().view
    }

    pub fn settings(&self) -> AppSettings {
        self.lock().settings.clone()
    }

    // --- View transitions ---------------------------------------------------

    pub fn set_view(&self, view: ViewState) {
        self.lock().view = view;
    }

    // --- Document mutations -------------------------------------------------

    /// Toggle a section on or off. Does not touch `last_updated`.
    pub fn toggle_section(&self, id: &str) {
        {
            let mut state = self.lock();
            let Some(section) = state.prd.section_mut(id) else {
                return;
            };
            section.is_enabled = !section.is_enabled;
        }
        self.after_mutation();
    }

    /// Replace a section's content.
    pub fn update_section_content(&self, id: &str, content: &str) {
        {
            let mut state = self.lock();
            let Some(section) = state.prd.section_mut(id) else {
                return;
            };
            section.content = content.to_string();
            state.prd.last_updated = Utc::now();
        }
        self.after_mutation();
    }

    /// Edit one of the top-level product fields.
    pub fn update_context(&self, field: ContextField, value: &str) {
        {
            let mut state = self.lock();
            match field {
                ContextField::ProductName => state.prd.product_name = value.to_string(),
                ContextField::ShortDescription => {
                    state.prd.short_description = value.to_string()
                }
            }
            state.prd.last_updated = Utc::now();
        }
        self.after_mutation();
    }

    /// Replace the process-wide settings and persist them.
    pub async fn update_settings(&self, settings: AppSettings) {
        self.lock().settings = settings.clone();
        if let Err(err) = self.inner.store.save_settings(&settings).await {
            tracing::warn!(error = %err, "failed to persist settings");
        }
    }

    // --- Generation orchestration -------------------------------------------

    /// Generate the short product description. No-op without a product name.
    pub async fn generate_description(&self) {
        let name = self.lock().prd.product_name.trim().to_string();
        if name.is_empty() {
            return;
        }

        self.lock().busy.generating_description = true;
        let result = self.inner.generator.generate_description(&name).await;
        {
            let mut state = self.lock();
            state.busy.generating_description = false;
            // Empty output means no change.
            if let Ok(description) = &result {
                if !description.is_empty() {
                    state.prd.short_description = description.clone();
                    state.prd.last_updated = Utc::now();
                }
            }
        }
        match result {
            Ok(_) => self.after_mutation(),
            Err(err) => tracing::warn!(error = %err, "description generation failed"),
        }
    }

    /// Generate one section. Per-section busy flag; concurrent calls for
    /// different sections do not block each other.
    pub async fn generate_section(&self, id: &str) {
        let (has_name, title) = {
            let state = self.lock();
            (
                !state.prd.product_name.is_empty(),
                state.prd.section(id).map(|s| s.title.clone()),
            )
        };
        let Some(title) = title else {
            return;
        };
        if !has_name {
            return;
        }

        self.lock().busy.mark_section(id);
        // Snapshot at call time, never cached.
        let context = self.lock().prd.generation_context();
        let result = self.inner.generator.generate_section(&title, &context).await;
        self.finish_section_write(id, result, "section generation failed");
    }

    /// Generate every enabled, still-empty section, strictly in order.
    ///
    /// Sequential by design: the context snapshot is rebuilt before each call
    /// so later sections observe earlier sections' freshly written content.
    pub async fn generate_all(&self) {
        let batch: Vec<(String, String)> = {
            let state = self.lock();
            if state.prd.product_name.is_empty() {
                return;
            }
            state
                .prd
                .sections
                .iter()
                .filter(|s| s.is_enabled && s.content.is_empty())
                .map(|s| (s.id.clone(), s.title.clone()))
                .collect()
        };

        self.lock().busy.generating_all = true;
        for (id, title) in &batch {
            self.lock().busy.mark_section(id);
            let context = self.lock().prd.generation_context();
            let result = self.inner.generator.generate_section(title, &context).await;
            self.finish_section_write(id, result, "section generation failed");
        }
        self.lock().busy.generating_all = false;
    }

    /// Rewrite a section's existing content per an instruction.
    pub async fn enhance_section(&self, id: &str, instruction: &str) {
        let text = {
            let state = self.lock();
            match state.prd.section(id) {
                Some(section) if !section.content.is_empty() => section.content.clone(),
                _ => return,
            }
        };

        self.lock().busy.mark_section(id);
        let result = self.inner.generator.enhance(&text, instruction).await;
        self.finish_section_write(id, result, "section enhancement failed");
    }

    /// Shared tail of every per-section generation call: clear the busy flag
    /// whatever happened, write content only on success.
    fn finish_section_write(
        &self,
        id: &str,
        result: Result<String, crate::gateway::GenerationError>,
        failure_msg: &'static str,
    ) {
        let mut wrote = false;
        {
            let mut state = self.lock();
            state.busy.clear_section(id);
            // Empty output means no change.
            if let Ok(content) = &result {
                if !content.is_empty() {
                    if let Some(section) = state.prd.section_mut(id) {
                        section.content = content.clone();
                        wrote = true;
                    }
                    if wrote {
                        state.prd.last_updated = Utc::now();
                    }
                }
            }
        }
        match result {
            Ok(_) => {
                if wrote {
                    self.after_mutation();
                }
            }
            Err(err) => tracing::warn!(section = id, error = %err, "{failure_msg}"),
        }
    }

    // --- Publish ------------------------------------------------------------

    /// Confirm publish with the chosen public settings.
    ///
    /// The document mutation is applied before the save and is not rolled
    /// back if the save fails; the view switch and history push happen only
    /// after a successful save. Repeating the call overwrites settings and
    /// leaves status published.
    pub async fn publish(&self, settings: PublicSettings) {
        let prd = {
            let mut state = self.lock();
            state.prd.public_settings = settings;
            state.prd.is_public = true;
            state.prd.status = DocStatus::Published;
            state.prd.clone()
        };

        // Immediate save, not debounced.
        if let Err(err) = self.inner.store.save(&prd).await {
            tracing::error!(error = %err, "publish save failed");
            return;
        }

        self.lock().view = ViewState::Public;
        // Publish is a navigable event: push, don't replace.
        self.inner
            .address
            .push(&RouteQuery::with_id_and_view(&prd.id, ViewState::Public));
    }

    // --- Public-view actions (optimistic, never rolled back) ----------------

    /// Add a guest comment. Prepended locally, then persisted.
    pub async fn add_comment(&self, text: &str) -> Comment {
        let comment_id = new_comment_id();
        let comment = Comment {
            avatar: format!("https://picsum.photos/seed/{}/64/64", &comment_id[..8]),
            id: comment_id,
            author: "Guest User".to_string(),
            text: text.to_string(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
        };

        let prd_id = {
            let mut state = self.lock();
            state.prd.comments.insert(0, comment.clone());
            state.prd.id.clone()
        };
        self.after_mutation();

        if let Err(err) = self.inner.store.add_comment(&prd_id, &comment).await {
            tracing::warn!(error = %err, "failed to persist comment");
        }
        comment
    }

    /// Adjust the upvote counter. The optimistic count floors at zero, the
    /// store's count is authoritative but not reconciled back.
    pub async fn toggle_upvote(&self, increment: bool) {
        let prd_id = {
            let mut state = self.lock();
            state.prd.upvotes = if increment {
                state.prd.upvotes + 1
            } else {
                (state.prd.upvotes - 1).max(0)
            };
            state.prd.id.clone()
        };
        self.after_mutation();

        if let Err(err) = self.inner.store.toggle_upvote(&prd_id, increment).await {
            tracing::warn!(error = %err, "failed to persist upvote");
        }
    }

    /// Change the approval status. With approver details supplied, also
    /// delivers the webhook event; delivery is advisory and never reverts
    /// the already-applied status.
    pub async fn change_status(&self, status: ApprovalStatus, details: Option<ApproverDetails>) {
        let (prd_id, title, webhook_url) = {
            let mut state = self.lock();
            state.prd.approval_status = status;
            (
                state.prd.id.clone(),
                state.prd.product_name.clone(),
                state.settings.webhook_url.clone(),
            )
        };
        self.after_mutation();

        if let Err(err) = self.inner.store.update_status(&prd_id, status).await {
            tracing::warn!(error = %err, "failed to persist status change");
        }

        if let Some(details) = details {
            let event = ApprovalEvent::new(&prd_id, &title, status, &details);
            if webhook_url.starts_with("http") {
                if !self.inner.notifier.deliver(&webhook_url, &event).await {
                    tracing::warn!(url = %webhook_url, "webhook delivery failed");
                }
            } else {
                tracing::debug!("no valid webhook url configured, skipping delivery");
            }
        }
    }

    // --- Autosave and routing sync ------------------------------------------

    /// Runs after every document mutation: keeps the address bar pointing at
    /// the document and reschedules the debounced save. Suppressed during
    /// initial load and on the landing view.
    fn after_mutation(&self) {
        let (suppressed, id) = {
            let state = self.lock();
            (
                state.loading || state.view == ViewState::Landing,
                state.prd.id.clone(),
            )
        };
        if suppressed {
            return;
        }

        if self.inner.address.current().id.is_none() {
            self.inner.address.replace(&RouteQuery::with_id(&id));
        }
        self.schedule_save();
    }

    fn schedule_save(&self) {
        let controller = self.clone();
        let delay = self.inner.save_delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.flush_save().await;
        });

        let mut slot = self.inner.save_task.lock().unwrap();
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    /// Persist the current document if it carries meaningful state.
    /// Failures are logged and swallowed; the next mutation retries.
    async fn flush_save(&self) {
        let prd = {
            let state = self.lock();
            if !state.prd.is_meaningful() {
                return;
            }
            state.prd.clone()
        };
        if let Err(err) = self.inner.store.save(&prd).await {
            tracing::warn!(error = %err, "autosave failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, RecordingNotifier, ScriptedGenerator};

    fn controller_at(query: RouteQuery) -> (DocumentController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let controller = DocumentController::with_save_delay(
            store.clone(),
            Arc::new(ScriptedGenerator::returning("generated")),
            Arc::new(RecordingNotifier::delivering(true)),
            Arc::new(MemoryAddressBar::starting_at(query)),
            Duration::from_millis(10),
        );
        (controller, store)
    }

    #[tokio::test]
    async fn startup_without_id_lands_on_landing() {
        let (controller, _store) = controller_at(RouteQuery::default());
        controller.startup().await;

        let state = controller.snapshot();
        assert!(!state.loading);
        assert_eq!(state.view, ViewState::Landing);
        assert_eq!(state.prd.status, DocStatus::Draft);
    }

    #[tokio::test]
    async fn startup_with_unknown_id_falls_back_to_landing() {
        let (controller, _store) = controller_at(RouteQuery::with_id("nope"));
        controller.startup().await;

        let state = controller.snapshot();
        assert_eq!(state.view, ViewState::Landing);
        // The unknown id is not adopted.
        assert_ne!(state.prd.id, "nope");
    }

    #[tokio::test]
    async fn toggle_twice_restores_state_without_touching_content() {
        let (controller, _store) = controller_at(RouteQuery::default());
        controller.startup().await;

        let before = controller.snapshot().prd;
        let id = before.sections[0].id.clone();

        controller.toggle_section(&id);
        controller.toggle_section(&id);

        let after = controller.snapshot().prd;
        assert_eq!(
            after.section(&id).unwrap().is_enabled,
            before.section(&id).unwrap().is_enabled
        );
        assert_eq!(after.section(&id).unwrap().content, "");
        // Toggling never touches the timestamp.
        assert_eq!(after.last_updated, before.last_updated);
    }

    #[tokio::test]
    async fn content_edit_bumps_last_updated() {
        let (controller, _store) = controller_at(RouteQuery::default());
        controller.startup().await;

        let before = controller.snapshot().prd;
        let id = before.sections[0].id.clone();
        controller.update_section_content(&id, "new content");

        let after = controller.snapshot().prd;
        assert_eq!(after.section(&id).unwrap().content, "new content");
        assert!(after.last_updated >= before.last_updated);
    }
}
