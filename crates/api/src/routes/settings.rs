use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use propel_core::AppSettings;

use crate::error::ApiResult;
use crate::state::AppState;

/// Settings routes. A single process-wide record; GET falls back to
/// defaults when nothing has been saved yet.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/settings", get(get_settings).put(save_settings))
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<AppSettings>> {
    Ok(Json(state.store().get_settings().await?))
}

async fn save_settings(
    State(state): State<AppState>,
    Json(settings): Json<AppSettings>,
) -> ApiResult<Json<Value>> {
    state.store().save_settings(&settings).await?;
    Ok(Json(json!({ "status": "ok" })))
}
