//! HTTP client implementation of the document store contract, speaking to
//! the persistence service's `/v1` routes.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use propel_core::normalize_document;
use propel_core::{ApprovalStatus, AppSettings, Comment, DocumentStore, Prd, StoreError};

pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct UpvoteBody {
    increment: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    approval_status: ApprovalStatus,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn expect_success(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, StoreError> {
        let response = response.map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(StoreError::Unavailable(format!(
                "store returned {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn fetch(&self, id: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .http
            .get(self.url(&format!("/v1/prds/{id}")))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "store returned {}",
                response.status()
            )));
        }
        let record = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(Some(record))
    }

    async fn save(&self, prd: &Prd) -> Result<Prd, StoreError> {
        let response =
            Self::expect_success(self.http.put(self.url("/v1/prds")).json(prd).send().await)
                .await?;
        let record: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(normalize_document(&record))
    }

    async fn add_comment(
        &self,
        prd_id: &str,
        comment: &Comment,
    ) -> Result<Vec<Comment>, StoreError> {
        let response = Self::expect_success(
            self.http
                .post(self.url(&format!("/v1/prds/{prd_id}/comments")))
                .json(comment)
                .send()
                .await,
        )
        .await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn toggle_upvote(&self, prd_id: &str, increment: bool) -> Result<i64, StoreError> {
        let response = Self::expect_success(
            self.http
                .post(self.url(&format!("/v1/prds/{prd_id}/upvote")))
                .json(&UpvoteBody { increment })
                .send()
                .await,
        )
        .await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        body["upvotes"]
            .as_i64()
            .ok_or_else(|| StoreError::Malformed("upvote response missing count".to_string()))
    }

    async fn update_status(&self, prd_id: &str, status: ApprovalStatus) -> Result<(), StoreError> {
        Self::expect_success(
            self.http
                .put(self.url(&format!("/v1/prds/{prd_id}/status")))
                .json(&StatusBody {
                    approval_status: status,
                })
                .send()
                .await,
        )
        .await?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<AppSettings, StoreError> {
        let response =
            Self::expect_success(self.http.get(self.url("/v1/settings")).send().await).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StoreError> {
        Self::expect_success(
            self.http
                .put(self.url("/v1/settings"))
                .json(settings)
                .send()
                .await,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_without_duplicate_slashes() {
        let store = HttpStore::new("http://localhost:3030/");
        assert_eq!(store.url("/v1/prds"), "http://localhost:3030/v1/prds");
        assert_eq!(
            store.url("/v1/prds/abc/upvote"),
            "http://localhost:3030/v1/prds/abc/upvote"
        );
    }

    #[test]
    fn status_body_uses_wire_casing() {
        let body = serde_json::to_value(StatusBody {
            approval_status: ApprovalStatus::Approved,
        })
        .unwrap();
        assert_eq!(body["approvalStatus"], "approved");
    }
}
