/// Document and comment identifiers.
///
/// Ids are opaque, generated client-side when a fresh document is created,
/// and never parsed for meaning. UUID v4 without hyphens keeps them short
/// enough for a query parameter.
use uuid::Uuid;

/// Generate a new opaque document id.
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generate a new comment id.
pub fn new_comment_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Whether a string is plausible as an id coming in from the routing layer.
/// Rejects empties and whitespace so garbage query parameters never reach
/// the store.
pub fn is_plausible_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_plausible() {
        let a = new_document_id();
        let b = new_document_id();
        assert_ne!(a, b);
        assert!(is_plausible_id(&a));
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn rejects_garbage_route_ids() {
        assert!(!is_plausible_id(""));
        assert!(!is_plausible_id("has space"));
        assert!(is_plausible_id("abc123"));
    }
}
