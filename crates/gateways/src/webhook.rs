//! Webhook delivery with a best-effort fallback.
//!
//! Delivery is advisory: the caller's state transition has already happened
//! by the time this runs, and nothing here can block or revert it. A standard
//! JSON POST is attempted first; if the request itself fails (connect error,
//! timeout), a bare text POST is tried once, which cannot confirm success
//! beyond having been sent.

use std::time::Duration;

use async_trait::async_trait;

use propel_core::{ApprovalEvent, WebhookNotifier};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WebhookClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout: DELIVERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send the canned test event so receivers can verify connectivity and
    /// the payload schema. Returns false without a request for non-HTTP urls.
    pub async fn test_connection(&self, url: &str) -> bool {
        if !url.starts_with("http") {
            return false;
        }
        self.deliver(url, &ApprovalEvent::test_event()).await
    }

    async fn fallback(&self, url: &str, body: String) -> bool {
        match self
            .http
            .post(url)
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
        {
            // Opaque mode: having been sent is all we can confirm.
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(url, error = %err, "webhook fallback delivery failed");
                false
            }
        }
    }
}

#[async_trait]
impl WebhookNotifier for WebhookClient {
    async fn deliver(&self, url: &str, event: &ApprovalEvent) -> bool {
        let body = match serde_json::to_string(event) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "webhook payload failed to serialize");
                return false;
            }
        };

        match self
            .http
            .post(url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.clone())
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(url, error = %err, "webhook delivery failed, trying fallback");
                self.fallback(url, body).await
            }
        }
    }
}
