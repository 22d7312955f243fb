//! Error types for rule strings, coercion, registration and dispatch.
//!
//! These errors describe problems with the *rules themselves* (a typo'd rule
//! name, a malformed tag, an argument that does not convert). A value that
//! simply fails a rule is not an error here; it is recorded as a
//! [`ValidationError`](crate::ValidationError) in the validation context.

use crate::coerce::ArgKind;

// ============================================================================
// RULE ERROR
// ============================================================================

/// Error raised while parsing a rule string or dispatching a rule.
///
/// Parse-time variants abort the rule they occur in; the caller decides
/// whether to continue with the remaining rules of the tag.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RuleError {
    /// Malformed rule text, e.g. an unmatched parenthesis.
    #[error("syntax error in rule '{rule}' at byte {position}: {reason}")]
    Syntax {
        rule: String,
        /// Byte offset inside the tag where the problem was detected.
        position: usize,
        reason: &'static str,
    },

    /// The rule name is not registered.
    #[error("rule '{rule}' does not exist")]
    NotFound { rule: String },

    /// Declared and supplied argument counts differ.
    #[error("rule '{rule}' requires {expected} argument(s), got {found}")]
    ArityMismatch {
        rule: String,
        expected: usize,
        found: usize,
    },

    /// An argument could not be converted to the declared parameter kind.
    #[error("rule '{rule}': {source}")]
    Coercion {
        rule: String,
        #[source]
        source: CoercionError,
    },

    /// The validator failed at runtime (wrong argument kind or a panic).
    #[error("rule '{rule}' failed during dispatch: {reason}")]
    DispatchFailure { rule: String, reason: String },

    /// A field value could not be converted to its JSON representation.
    #[error("field '{field}' could not be read: {source}")]
    FieldValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RuleError {
    /// Creates a not-found error.
    pub fn not_found(rule: impl Into<String>) -> Self {
        Self::NotFound { rule: rule.into() }
    }

    /// Creates an arity mismatch error.
    pub fn arity(rule: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ArityMismatch {
            rule: rule.into(),
            expected,
            found,
        }
    }

    /// Creates a dispatch failure.
    pub fn dispatch(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DispatchFailure {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Returns the rule (or field) name this error refers to.
    pub fn rule(&self) -> &str {
        match self {
            Self::Syntax { rule, .. }
            | Self::NotFound { rule }
            | Self::ArityMismatch { rule, .. }
            | Self::Coercion { rule, .. }
            | Self::DispatchFailure { rule, .. } => rule,
            Self::FieldValue { field, .. } => field,
        }
    }

    /// Short machine-readable code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::NotFound { .. } => "not_found",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::Coercion { .. } => "coercion",
            Self::DispatchFailure { .. } => "dispatch_failure",
            Self::FieldValue { .. } => "field_value",
        }
    }
}

// ============================================================================
// COERCION ERROR
// ============================================================================

/// Failure to convert one textual argument into its target kind.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum CoercionError {
    /// The text is not a base-10 signed integer.
    #[error("'{text}' is not a valid integer: {source}")]
    NumericFormat {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// The text is not a valid regular expression.
    #[error("'{text}' is not a valid pattern: {source}")]
    PatternCompile {
        text: String,
        #[source]
        source: regex::Error,
    },

    /// The target kind has no coercion.
    #[error("cannot convert '{text}' to unsupported type {ty}")]
    UnsupportedType { text: String, ty: &'static str },

    /// The text converts to the declared kind but does not fit the
    /// validator's parameter type, e.g. `-1` for a `usize`.
    #[error("'{text}' is out of range for {ty}")]
    OutOfRange { text: String, ty: &'static str },
}

impl CoercionError {
    /// The raw argument text that failed to convert.
    pub fn text(&self) -> &str {
        match self {
            Self::NumericFormat { text, .. }
            | Self::PatternCompile { text, .. }
            | Self::UnsupportedType { text, .. }
            | Self::OutOfRange { text, .. } => text,
        }
    }

    /// The kind the text was being converted to.
    pub fn target(&self) -> ArgKind {
        match self {
            Self::NumericFormat { .. } | Self::OutOfRange { .. } => ArgKind::Int,
            Self::PatternCompile { .. } => ArgKind::Pattern,
            Self::UnsupportedType { ty, .. } => ArgKind::Unsupported(ty),
        }
    }
}

// ============================================================================
// REGISTRY ERROR
// ============================================================================

/// Error raised while building a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The name belongs to a `Validation` method, not a rule.
    #[error("'{0}' is reserved and cannot be registered as a rule")]
    Reserved(String),

    /// The name is already registered.
    #[error("rule '{0}' is already registered")]
    Duplicate(String),

    /// Rule names must be non-empty identifiers.
    #[error("'{0}' is not a valid rule name")]
    InvalidName(String),
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_arity() {
        let err = RuleError::arity("MaxLen", 1, 2);
        assert_eq!(
            err.to_string(),
            "rule 'MaxLen' requires 1 argument(s), got 2"
        );
        assert_eq!(err.rule(), "MaxLen");
        assert_eq!(err.code(), "arity_mismatch");
    }

    #[test]
    fn test_coercion_source_chain() {
        let source = "abc".parse::<i64>().unwrap_err();
        let err = RuleError::Coercion {
            rule: "Min".into(),
            source: CoercionError::NumericFormat {
                text: "abc".into(),
                source,
            },
        };

        let inner = std::error::Error::source(&err).expect("coercion error has a source");
        assert!(inner.to_string().contains("'abc' is not a valid integer"));
    }

    #[test]
    fn test_coercion_target() {
        let err = CoercionError::UnsupportedType {
            text: "1.5".into(),
            ty: "f64",
        };
        assert_eq!(err.text(), "1.5");
        assert_eq!(err.target(), ArgKind::Unsupported("f64"));
    }
}
