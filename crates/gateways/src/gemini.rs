//! Gemini-backed implementation of the generation contract.
//!
//! Talks to the `generateContent` REST endpoint. The credential is checked
//! lazily, per call, so an unconfigured client constructs fine and every
//! operation fails with a typed error instead.

use async_trait::async_trait;
use serde_json::{json, Value};

use propel_core::{ContentGenerator, GenerationContext, GenerationError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client for the given model and key. An empty key is allowed;
    /// calls will fail with [`GenerationError::MissingApiKey`].
    pub fn new(model: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Request(format!(
                "generateContent returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::BadResponse(e.to_string()))?;
        Ok(extract_text(&payload))
    }
}

/// Concatenated text parts of the first candidate; empty when absent.
fn extract_text(payload: &Value) -> String {
    payload["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

fn section_prompt(title: &str, context: &GenerationContext) -> String {
    let existing =
        serde_json::to_string(&context.existing_sections).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are an expert Product Manager at a top-tier tech company.\n\
         Your task is to write the specific section: \"{title}\" for a Product Requirements Document (PRD).\n\
         \n\
         Product Context:\n\
         - Product Name: {}\n\
         - Brief Description: {}\n\
         \n\
         Existing Content Context (if any):\n\
         {existing}\n\
         \n\
         Instructions:\n\
         - Write only the content for the \"{title}\" section.\n\
         - Be professional, concise, and structured.\n\
         - Use bullet points where appropriate.\n\
         - Do not include the section title in the output, just the content.\n\
         - Format using Markdown.",
        context.product_name, context.short_description
    )
}

fn description_prompt(product_name: &str) -> String {
    format!(
        "Write a concise, compelling 2-3 sentence product description for a product named \"{product_name}\". \
         Focus on what it might do and who it is for."
    )
}

fn enhance_prompt(text: &str, instruction: &str) -> String {
    format!(
        "You are an expert editor.\n\
         Instruction: {instruction}\n\
         Original Text:\n\
         \"{text}\"\n\
         \n\
         Output the improved text only. Keep the same format (Markdown)."
    )
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_section(
        &self,
        title: &str,
        context: &GenerationContext,
    ) -> Result<String, GenerationError> {
        self.generate(&section_prompt(title, context)).await
    }

    async fn generate_description(&self, product_name: &str) -> Result<String, GenerationError> {
        self.generate(&description_prompt(product_name)).await
    }

    async fn enhance(&self, text: &str, instruction: &str) -> Result<String, GenerationError> {
        self.generate(&enhance_prompt(text, instruction)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn section_prompt_carries_the_context_snapshot() {
        let mut context = GenerationContext {
            product_name: "Acme".to_string(),
            short_description: "A product.".to_string(),
            existing_sections: Default::default(),
        };
        context
            .existing_sections
            .insert("Executive Summary".to_string(), "done already".to_string());

        let prompt = section_prompt("User Stories", &context);
        assert!(prompt.contains("\"User Stories\""));
        assert!(prompt.contains("Product Name: Acme"));
        assert!(prompt.contains("done already"));
        assert!(prompt.contains("Format using Markdown."));
    }

    #[test]
    fn extract_text_joins_parts_and_defaults_to_empty() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }]
        });
        assert_eq!(extract_text(&payload), "Hello world");
        assert_eq!(extract_text(&json!({})), "");
        assert_eq!(extract_text(&json!({ "candidates": [] })), "");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new("gemini-2.5-flash", "");
        let err = client.generate_description("Acme").await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}
