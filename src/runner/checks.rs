//! Assertions over JSON response bodies.

use anyhow::{Context, Result, ensure};
use serde_json::Value;

/// The body's `success` flag must be `true`.
pub fn expect_success(body: &Value) -> Result<()> {
    let flag = field(body, "success")?;
    ensure!(
        flag.as_bool() == Some(true),
        "expected success == true, got {flag}"
    );
    Ok(())
}

pub fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    value
        .get(name)
        .with_context(|| format!("Missing field: {name}"))
}

pub fn array_field<'a>(value: &'a Value, name: &str) -> Result<&'a Vec<Value>> {
    field(value, name)?
        .as_array()
        .with_context(|| format!("field {name} is not an array"))
}

pub fn number_field(value: &Value, name: &str) -> Result<f64> {
    field(value, name)?
        .as_f64()
        .with_context(|| format!("field {name} is not a number"))
}

pub fn str_field<'a>(value: &'a Value, name: &str) -> Result<&'a str> {
    field(value, name)?
        .as_str()
        .with_context(|| format!("field {name} is not a string"))
}

pub fn require_fields(value: &Value, names: &[&str]) -> Result<()> {
    for name in names {
        field(value, name)?;
    }
    Ok(())
}

/// Every element of `items` must carry all of `names`.
pub fn require_fields_each(items: &[Value], names: &[&str]) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        require_fields(item, names).with_context(|| format!("entry {i}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_flag() {
        assert!(expect_success(&json!({ "success": true })).is_ok());
        assert!(expect_success(&json!({ "success": false })).is_err());
        assert!(expect_success(&json!({ "success": "true" })).is_err());

        let err = expect_success(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: success");
    }

    #[test]
    fn typed_fields() {
        let body = json!({ "count": 3, "label": "x", "items": [1, 2] });
        assert_eq!(number_field(&body, "count").unwrap(), 3.0);
        assert_eq!(str_field(&body, "label").unwrap(), "x");
        assert_eq!(array_field(&body, "items").unwrap().len(), 2);
        assert!(array_field(&body, "label").is_err());
        assert!(number_field(&body, "label").is_err());
    }

    #[test]
    fn missing_field_names_the_field() {
        let suggestion = json!({ "id": "S1", "title": "t", "description": "d", "impact": "low" });
        let err = require_fields(
            &suggestion,
            &["id", "title", "description", "effectiveness", "impact"],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing field: effectiveness");
    }

    #[test]
    fn each_entry_is_checked() {
        let items = vec![json!({ "id": 1 }), json!({ "name": "x" })];
        let err = require_fields_each(&items, &["id"]).unwrap_err();
        assert_eq!(format!("{err:#}"), "entry 1: Missing field: id");
    }
}
