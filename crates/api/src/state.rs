use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::PgStore;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor. Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pub store: PgStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: PgStore, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(InnerState { store, config }),
        }
    }

    pub fn store(&self) -> &PgStore {
        &self.inner.store
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }
}
