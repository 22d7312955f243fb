//! Presence check.

use serde_json::Value;

use crate::outcome::ValidationError;

crate::check! {
    /// Passes when the value is present and non-empty.
    ///
    /// `null`, `""`, `false`, `0`, `[]` and `{}` are all treated as missing.
    pub Required;
    rule(value) {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }
    error() { ValidationError::new("required", "Can not be empty") }
}
