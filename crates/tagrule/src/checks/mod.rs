//! Built-in checks.
//!
//! Each check is a predicate over a field's JSON value plus the error to
//! record when the predicate does not hold. [`register_builtins`] exposes them
//! as rules:
//!
//! | Rule | Arguments | Passes when |
//! |------|-----------|-------------|
//! | `Required` | | value is present and non-empty |
//! | `Min` / `Max` | int | integer is at least / at most the bound |
//! | `Range` | int, int | integer is inside the inclusive range |
//! | `MinLen` / `MaxLen` / `Length` | int | string chars or collection size compare |
//! | `Alpha`, `Numeric`, `AlphaNumeric`, `AlphaDash` | | ASCII character classes |
//! | `Match` / `NoMatch` | pattern | rendered value does / does not match |
//! | `Email`, `IP`, `Base64` | | string has the format |

use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

use crate::outcome::{Outcome, ValidationError};
use crate::registry::RegistryBuilder;
use crate::validation::Validation;

pub mod format;
pub mod length;
pub mod numeric;
pub mod required;
pub mod string;

pub use format::{Base64, Email, Ip};
pub use length::{Length, MaxLen, MinLen};
pub use numeric::{Max, Min, Range};
pub use required::Required;
pub use string::{Alpha, AlphaDash, AlphaNumeric, Match, NoMatch, Numeric};

// ============================================================================
// CHECK TRAIT
// ============================================================================

/// A predicate over a field value with its failure description.
pub trait Check {
    /// Whether `value` satisfies the check.
    fn is_satisfied(&self, value: &Value) -> bool;

    /// Error describing the failure; key, field and value are filled in by
    /// the caller.
    fn error(&self) -> ValidationError;
}

/// Runs `check` on `value` without recording anything.
pub fn evaluate<C: Check + ?Sized>(check: &C, value: &Value, key: &str) -> Outcome {
    if check.is_satisfied(value) {
        Outcome::pass()
    } else {
        Outcome::fail(check.error().with_key(key.to_owned()).with_value(value))
    }
}

// ============================================================================
// VALUE HELPERS
// ============================================================================

/// The value as a string, for string-only checks.
pub(crate) fn text(value: &Value) -> Option<&str> {
    value.as_str()
}

/// The value rendered as text: strings verbatim, numbers and booleans via
/// their JSON form. Null and collections have no text form.
pub(crate) fn rendered(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// String length in chars, or element count of a collection.
pub(crate) fn size(value: &Value) -> Option<i64> {
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::Null | Value::Bool(_) | Value::Number(_) => return None,
    };
    i64::try_from(n).ok()
}

/// Integer value of a number.
pub(crate) fn integer(value: &Value) -> Option<i64> {
    value.as_i64()
}

// ============================================================================
// BUILT-IN TABLE
// ============================================================================

fn rule0<C: Check + Default>(_: &mut Validation, value: &Value, key: &str) -> Outcome {
    evaluate(&C::default(), value, key)
}

/// Registers every built-in check under its rule name.
pub(crate) fn register_builtins(builder: &mut RegistryBuilder) {
    builder.builtin("Required", rule0::<Required>);
    builder.builtin("Alpha", rule0::<Alpha>);
    builder.builtin("Numeric", rule0::<Numeric>);
    builder.builtin("AlphaNumeric", rule0::<AlphaNumeric>);
    builder.builtin("AlphaDash", rule0::<AlphaDash>);
    builder.builtin("Email", rule0::<Email>);
    builder.builtin("IP", rule0::<Ip>);
    builder.builtin("Base64", rule0::<Base64>);

    builder.builtin("Min", |_: &mut Validation, v: &Value, key: &str, min: i64| {
        evaluate(&Min::new(min), v, key)
    });
    builder.builtin("Max", |_: &mut Validation, v: &Value, key: &str, max: i64| {
        evaluate(&Max::new(max), v, key)
    });
    builder.builtin(
        "Range",
        |_: &mut Validation, v: &Value, key: &str, min: i64, max: i64| {
            evaluate(&Range::new(min, max), v, key)
        },
    );
    builder.builtin("MinLen", |_: &mut Validation, v: &Value, key: &str, min: i64| {
        evaluate(&MinLen::new(min), v, key)
    });
    builder.builtin("MaxLen", |_: &mut Validation, v: &Value, key: &str, max: i64| {
        evaluate(&MaxLen::new(max), v, key)
    });
    builder.builtin("Length", |_: &mut Validation, v: &Value, key: &str, n: i64| {
        evaluate(&Length::new(n), v, key)
    });
    builder.builtin(
        "Match",
        |_: &mut Validation, v: &Value, key: &str, pattern: Regex| {
            evaluate(&Match::new(pattern), v, key)
        },
    );
    builder.builtin(
        "NoMatch",
        |_: &mut Validation, v: &Value, key: &str, pattern: Regex| {
            evaluate(&NoMatch::new(pattern), v, key)
        },
    );
}
