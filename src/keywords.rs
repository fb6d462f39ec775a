//! Lenient readers for schema keywords.
//!
//! Schemas in the wild put `"true"` where a boolean belongs and `"3"` where a
//! number belongs; these coerce the way the keyword consumers expect.
use serde_json::Value;

/// Parsed JSON; never mutated after load.
pub type SchemaNode = Value;

pub const REF: &str = "$ref";
pub const LOCAL_ID: &str = "_localId";

pub fn ref_of(node: &SchemaNode) -> Option<&str> {
    node.get(REF).and_then(Value::as_str)
}

/// `$ref` of the node itself, else of its `items` child.
pub fn indirection_of(node: &SchemaNode) -> Option<&str> {
    ref_of(node).or_else(|| node.get("items").and_then(ref_of))
}

/// Scalar text; containers have none.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
    }
}

/// Non-empty text of `node[key]`.
pub fn non_empty_text(node: &SchemaNode, key: &str) -> Option<String> {
    node.get(key).map(text).filter(|s| !s.is_empty())
}

pub fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

pub fn integer_or(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

pub fn unsigned(node: &SchemaNode, key: &str) -> Option<u64> {
    let value = node.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

/// The declared `type`; for a type list, the first entry that is not `null`.
pub fn declared_type(node: &SchemaNode) -> Option<&str> {
    match node.get("type")? {
        Value::String(s) => Some(s),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .or_else(|| types.first().and_then(Value::as_str)),
        _ => None,
    }
}

pub fn is_type(node: &SchemaNode, ty: &str) -> bool {
    declared_type(node) == Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coercions() {
        assert!(boolean(&json!("TRUE")));
        assert!(boolean(&json!(1)));
        assert!(!boolean(&json!({})));
        assert_eq!(integer_or(Some(&json!("7")), 1000), 7);
        assert_eq!(integer_or(Some(&json!(2.9)), 1000), 2);
        assert_eq!(integer_or(Some(&json!("x")), 1000), 1000);
        assert_eq!(integer_or(None, 1000), 1000);
        assert_eq!(text(&json!(12)), "12");
        assert_eq!(text(&json!({"en": "Name"})), "");
        assert_eq!(non_empty_text(&json!({"title": ["a"]}), "title"), None);
        assert_eq!(unsigned(&json!({"minItems": 2.0}), "minItems"), Some(2));
        assert_eq!(unsigned(&json!({"minItems": -1}), "minItems"), None);
    }

    #[test]
    fn type_lists_skip_null() {
        assert_eq!(declared_type(&json!({"type": ["null", "string"]})), Some("string"));
        assert_eq!(declared_type(&json!({"type": ["null"]})), Some("null"));
        assert_eq!(declared_type(&json!({})), None);
    }

    #[test]
    fn indirection_prefers_own_ref() {
        let node = json!({"$ref": "#/a", "items": {"$ref": "#/b"}});
        assert_eq!(indirection_of(&node), Some("#/a"));
        let node = json!({"type": "array", "items": {"$ref": "#/b"}});
        assert_eq!(indirection_of(&node), Some("#/b"));
        assert_eq!(indirection_of(&json!({"type": "string"})), None);
    }
}
