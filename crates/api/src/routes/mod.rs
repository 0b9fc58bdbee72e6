pub mod health;
pub mod prds;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(prds::routes())
        .merge(settings::routes())
        .with_state(state)
}
