//! Postgres persistence for documents, comments, and settings.
//!
//! The document body is stored as JSONB addressed by the client-generated
//! id. The upvote counter, approval status, and comments live in their own
//! columns and table: the server stays authoritative for them, so a stale
//! autosaved body can never clobber a concurrent upvote or status change.
//! `fetch` composes the stored body with those authoritative values.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Row};

use propel_core::{AppSettings, Comment, Prd};

use crate::error::{ApiError, ApiResult};

const SETTINGS_KEY: &str = "app";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch the raw record for a document, or None when unknown.
    pub async fn fetch(&self, prd_id: &str) -> ApiResult<Option<Value>> {
        let row = sqlx::query("SELECT content, upvotes, approval_status FROM prds WHERE prd_id = $1")
            .bind(prd_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut content: Value = row.get("content");
        if !content.is_object() {
            return Err(ApiError::Internal(format!(
                "stored document {prd_id} is not an object"
            )));
        }

        let upvotes: i64 = row.get("upvotes");
        let approval_status: String = row.get("approval_status");
        content["upvotes"] = Value::from(upvotes);
        content["approvalStatus"] = Value::from(approval_status);
        content["comments"] = Value::Array(
            self.comments(prd_id)
                .await?
                .into_iter()
                .map(|c| serde_json::to_value(c).expect("comment serializes"))
                .collect(),
        );

        Ok(Some(content))
    }

    /// Upsert a document body. Counter and status columns are only seeded on
    /// first insert; afterwards they change through their own operations.
    pub async fn save(&self, prd: &Prd) -> ApiResult<Prd> {
        let content =
            serde_json::to_value(prd).map_err(|e| ApiError::Internal(e.to_string()))?;
        sqlx::query(
            "INSERT INTO prds (prd_id, content, upvotes, approval_status) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (prd_id) \
             DO UPDATE SET content = EXCLUDED.content, updated_at = now()",
        )
        .bind(&prd.id)
        .bind(&content)
        .bind(prd.upvotes)
        .bind(prd.approval_status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(prd.clone())
    }

    /// Insert a comment and return the full list, newest first.
    pub async fn add_comment(&self, prd_id: &str, comment: &Comment) -> ApiResult<Vec<Comment>> {
        self.require_prd(prd_id).await?;
        sqlx::query(
            "INSERT INTO comments (id, prd_id, author, avatar, text) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&comment.id)
        .bind(prd_id)
        .bind(&comment.author)
        .bind(&comment.avatar)
        .bind(&comment.text)
        .execute(&self.pool)
        .await?;
        self.comments(prd_id).await
    }

    /// Atomically adjust the upvote counter; floors at zero on decrement.
    pub async fn toggle_upvote(&self, prd_id: &str, increment: bool) -> ApiResult<i64> {
        let delta: i64 = if increment { 1 } else { -1 };
        let row = sqlx::query(
            "UPDATE prds SET upvotes = GREATEST(upvotes + $2, 0), updated_at = now() \
             WHERE prd_id = $1 RETURNING upvotes",
        )
        .bind(prd_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| r.get("upvotes"))
            .ok_or_else(|| ApiError::NotFound(format!("prd {prd_id}")))
    }

    pub async fn update_status(&self, prd_id: &str, status: &str) -> ApiResult<()> {
        let result =
            sqlx::query("UPDATE prds SET approval_status = $2, updated_at = now() WHERE prd_id = $1")
                .bind(prd_id)
                .bind(status)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("prd {prd_id}")));
        }
        Ok(())
    }

    pub async fn get_settings(&self) -> ApiResult<AppSettings> {
        let row = sqlx::query("SELECT content FROM settings WHERE key = $1")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row
            .map(|r| {
                let content: Value = r.get("content");
                serde_json::from_value(content).unwrap_or_default()
            })
            .unwrap_or_default())
    }

    pub async fn save_settings(&self, settings: &AppSettings) -> ApiResult<()> {
        let content =
            serde_json::to_value(settings).map_err(|e| ApiError::Internal(e.to_string()))?;
        sqlx::query(
            "INSERT INTO settings (key, content) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET content = EXCLUDED.content, updated_at = now()",
        )
        .bind(SETTINGS_KEY)
        .bind(&content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn comments(&self, prd_id: &str) -> ApiResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, author, avatar, text, created_at FROM comments \
             WHERE prd_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(prd_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let created_at: DateTime<Utc> = row.get("created_at");
                Comment {
                    id: row.get("id"),
                    author: row.get("author"),
                    avatar: row.get("avatar"),
                    text: row.get("text"),
                    date: created_at.format("%Y-%m-%d").to_string(),
                }
            })
            .collect())
    }

    async fn require_prd(&self, prd_id: &str) -> ApiResult<()> {
        let row = sqlx::query("SELECT 1 FROM prds WHERE prd_id = $1")
            .bind(prd_id)
            .fetch_optional(&self.pool)
            .await?;
        if row.is_none() {
            return Err(ApiError::NotFound(format!("prd {prd_id}")));
        }
        Ok(())
    }
}
