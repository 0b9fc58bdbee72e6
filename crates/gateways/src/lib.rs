//! Concrete gateway implementations: the HTTP document store client, the
//! Gemini generation client, and the webhook notifier.

pub mod gemini;
pub mod http_store;
pub mod webhook;

pub use gemini::GeminiClient;
pub use http_store::HttpStore;
pub use webhook::WebhookClient;
