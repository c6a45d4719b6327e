use serde_json::{Map, Value};

use crate::error::SchemaError;

pub const META_KEY: &str = "meta";
pub const SUMMARY_KEY: &str = "resumen";
pub const ADS_KEY: &str = "anuncios";

/// Borrowed view over a document that passed the top-level shape check.
/// Nothing below the top level has been inspected yet.
#[derive(Debug, Clone, Copy)]
pub struct RawDocument<'a> {
    pub meta: &'a Map<String, Value>,
    pub summary: &'a Map<String, Value>,
    pub ads: &'a [Value],
    root: &'a Map<String, Value>,
}

impl<'a> RawDocument<'a> {
    /// Optional top-level section; explicit `null` counts as absent.
    pub fn section(&self, key: &str) -> Option<&'a Value> {
        self.root.get(key).filter(|value| !value.is_null())
    }
}

pub fn parse_document(bytes: &[u8]) -> Result<Value, SchemaError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn validate_document(value: &Value) -> Result<RawDocument<'_>, SchemaError> {
    let root = value
        .as_object()
        .ok_or_else(|| SchemaError::shape("top-level value must be an object"))?;

    let meta = required_object(root, META_KEY)?;
    let summary = required_object(root, SUMMARY_KEY)?;
    let ads = root
        .get(ADS_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| SchemaError::shape(format!("`{ADS_KEY}` must be an array")))?;

    Ok(RawDocument {
        meta,
        summary,
        ads: ads.as_slice(),
        root,
    })
}

fn required_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, SchemaError> {
    root.get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| SchemaError::shape(format!("`{key}` must be an object")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_empty_object() {
        let err = validate_document(&json!({})).expect_err("empty object must fail");
        assert!(err.to_string().contains("`meta`"));
    }

    #[test]
    fn rejects_missing_ads_array() {
        let err = validate_document(&json!({ "meta": {}, "resumen": {} }))
            .expect_err("missing anuncios must fail");
        assert!(err.to_string().contains("`anuncios`"));
    }

    #[test]
    fn rejects_mistyped_sections() {
        assert!(validate_document(&json!({ "meta": {}, "resumen": {}, "anuncios": {} })).is_err());
        assert!(validate_document(&json!({ "meta": "x", "resumen": {}, "anuncios": [] })).is_err());
        assert!(validate_document(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn accepts_minimal_document() {
        let value = json!({ "meta": {}, "resumen": {}, "anuncios": [] });
        let document = validate_document(&value).expect("minimal document is valid");
        assert!(document.ads.is_empty());
        assert!(document.section("historico").is_none());
    }

    #[test]
    fn null_optional_section_counts_as_absent() {
        let value = json!({ "meta": {}, "resumen": {}, "anuncios": [], "historico": null });
        let document = validate_document(&value).expect("document is valid");
        assert!(document.section("historico").is_none());
    }

    #[test]
    fn parse_document_reports_syntax_errors() {
        let err = parse_document(b"{ not json").expect_err("garbage must fail");
        assert!(matches!(err, SchemaError::Syntax(_)));
    }
}
