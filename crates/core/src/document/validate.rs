/// Minimal shape validation for imported documents.
///
/// Import accepts previously exported JSON only. The check is deliberately
/// shallow: a product name and a sections field must exist. Everything else
/// is absorbed by normalization after the import is accepted.
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("not valid JSON: {0}")]
    Syntax(String),
    #[error("imported document must be a JSON object")]
    NotAnObject,
    #[error("imported document has no product name")]
    MissingProductName,
    #[error("imported document has no sections")]
    MissingSections,
}

/// Validate the minimal shape of an imported document.
/// Rejection means no partial apply: the caller keeps its current document.
pub fn validate_import(value: &Value) -> Result<(), ImportError> {
    let Some(record) = value.as_object() else {
        return Err(ImportError::NotAnObject);
    };
    match record.get("productName").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => {}
        _ => return Err(ImportError::MissingProductName),
    }
    if record.get("sections").is_none() {
        return Err(ImportError::MissingSections);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_shape() {
        let value = json!({ "productName": "Acme", "sections": [] });
        assert_eq!(validate_import(&value), Ok(()));
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(validate_import(&json!([1, 2])), Err(ImportError::NotAnObject));
        assert_eq!(validate_import(&json!("text")), Err(ImportError::NotAnObject));
    }

    #[test]
    fn rejects_missing_or_empty_product_name() {
        assert_eq!(
            validate_import(&json!({ "sections": [] })),
            Err(ImportError::MissingProductName)
        );
        assert_eq!(
            validate_import(&json!({ "productName": "", "sections": [] })),
            Err(ImportError::MissingProductName)
        );
    }

    #[test]
    fn rejects_missing_sections() {
        assert_eq!(
            validate_import(&json!({ "productName": "Acme" })),
            Err(ImportError::MissingSections)
        );
    }
}
