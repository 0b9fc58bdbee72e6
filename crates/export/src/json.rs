//! JSON export and the import path.

use propel_core::document::normalize::normalize_document;
use propel_core::document::validate::{validate_import, ImportError};
use propel_core::Prd;

/// Serialize the full document.
pub fn to_json(prd: &Prd) -> String {
    serde_json::to_string_pretty(prd).expect("document serializes to JSON")
}

/// Import a previously exported document.
///
/// Validation is minimal by design (a product name and a sections field must
/// exist); everything else is absorbed by normalization. Rejection leaves the
/// caller's document untouched.
pub fn import_json(input: &str) -> Result<Prd, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(input).map_err(|e| ImportError::Syntax(e.to_string()))?;
    validate_import(&value)?;
    let prd = normalize_document(&value);
    tracing::debug!(id = %prd.id, "imported document");
    Ok(prd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_then_import_reproduces_the_document() {
        let mut prd = Prd::fresh();
        prd.product_name = "Acme".to_string();
        prd.short_description = "A product.".to_string();
        prd.sections[0].content = "summary".to_string();
        prd.sections[2].is_enabled = false;

        let imported = import_json(&to_json(&prd)).unwrap();

        assert_eq!(imported.id, prd.id);
        assert_eq!(imported.product_name, prd.product_name);
        assert_eq!(imported.sections, prd.sections);
        assert_eq!(imported.public_settings, prd.public_settings);
    }

    #[test]
    fn import_rejects_garbage_without_partial_apply() {
        assert!(matches!(import_json("{not json"), Err(ImportError::Syntax(_))));
        assert!(matches!(
            import_json("[1,2,3]"),
            Err(ImportError::NotAnObject)
        ));
        assert!(matches!(
            import_json(r#"{"sections": []}"#),
            Err(ImportError::MissingProductName)
        ));
        assert!(matches!(
            import_json(r#"{"productName": "Acme"}"#),
            Err(ImportError::MissingSections)
        ));
    }

    #[test]
    fn import_normalizes_stale_section_sets() {
        let input = r#"{
            "productName": "Acme",
            "sections": [
                { "id": "unknown_section", "content": "stale", "isEnabled": true }
            ]
        }"#;
        let imported = import_json(input).unwrap();
        assert_eq!(imported.sections.len(), propel_core::schema::CATALOG.len());
        assert!(imported.section("unknown_section").is_none());
    }
}
