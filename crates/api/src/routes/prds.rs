use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use propel_core::{ApprovalStatus, Comment, Prd};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/prds", put(save_prd))
        .route("/v1/prds/{id}", get(get_prd))
        .route("/v1/prds/{id}/comments", post(add_comment))
        .route("/v1/prds/{id}/upvote", post(toggle_upvote))
        .route("/v1/prds/{id}/status", put(update_status))
}

/// Fetch the raw stored record. The client's load boundary owns all shape
/// coercion, so the record goes out as stored.
async fn get_prd(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    match state.store().fetch(&id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("prd {id}"))),
    }
}

/// Upsert a document. Idempotent on repeated identical calls.
async fn save_prd(State(state): State<AppState>, Json(prd): Json<Prd>) -> ApiResult<Json<Prd>> {
    if prd.id.is_empty() {
        return Err(ApiError::BadRequest("document id is required".to_string()));
    }
    let saved = state.store().save(&prd).await?;
    Ok(Json(saved))
}

/// Add a comment; responds with the full list, newest first.
async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(comment): Json<Comment>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = state.store().add_comment(&id, &comment).await?;
    Ok(Json(comments))
}

#[derive(Debug, Deserialize)]
struct UpvoteBody {
    increment: bool,
}

/// Adjust the upvote counter; the response carries the new count.
async fn toggle_upvote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpvoteBody>,
) -> ApiResult<Json<Value>> {
    let upvotes = state.store().toggle_upvote(&id, body.increment).await?;
    Ok(Json(json!({ "upvotes": upvotes })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    approval_status: ApprovalStatus,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Value>> {
    state
        .store()
        .update_status(&id, body.approval_status.as_str())
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}
