//! Validation failures and rule outcomes.
//!
//! A [`ValidationError`] describes a value that did not satisfy a rule. It is
//! data, not a fault: validators return it inside an [`Outcome`] and the
//! [`Validation`](crate::Validation) context accumulates it.
//!
//! String fields use `Cow<'static, str>` so static codes and messages do not
//! allocate.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A failed rule, as recorded in the validation context.
///
/// # Examples
///
/// ```
/// use tagrule::ValidationError;
///
/// let error = ValidationError::new("max_len", "Maximum length is 10")
///     .with_key("MaxLen")
///     .with_param("max", "10");
///
/// assert_eq!(error.param("max"), Some("10"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Machine-readable code, e.g. `"required"`, `"max_len"`.
    pub code: Cow<'static, str>,

    /// Human-readable message in English.
    pub message: Cow<'static, str>,

    /// Rule-name marker the error was recorded under.
    pub key: Option<Cow<'static, str>>,

    /// Field the rule was applied to, when validating an entity.
    pub field: Option<Cow<'static, str>>,

    /// Rendered value that failed the rule.
    pub value: Option<String>,

    /// Rule parameters (typically 0-2), in declaration order.
    pub params: SmallVec<[(Cow<'static, str>, Cow<'static, str>); 2]>,
}

impl ValidationError {
    /// Creates a new error with a code and message.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            key: None,
            field: None,
            value: None,
            params: SmallVec::new(),
        }
    }

    /// Sets the rule key.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the field name.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Records the offending value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_value(mut self, value: &serde_json::Value) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Adds a parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Looks up a parameter value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    /// Key used in [`Validation::error_map`](crate::Validation::error_map):
    /// `field.key` when both are known, otherwise whichever is set, else the code.
    #[must_use]
    pub fn map_key(&self) -> String {
        match (&self.field, &self.key) {
            (Some(field), Some(key)) => format!("{field}.{key}"),
            (Some(field), None) => field.to_string(),
            (None, Some(key)) => key.to_string(),
            (None, None) => self.code.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.field, &self.key) {
            (Some(field), Some(key)) => write!(f, "[{field}.{key}] ")?,
            (Some(field), None) => write!(f, "[{field}] ")?,
            (None, Some(key)) => write!(f, "[{key}] ")?,
            (None, None) => {}
        }
        write!(f, "{}: {}", self.code, self.message)?;

        if !self.params.is_empty() {
            write!(f, " (params: [")?;
            for (i, (k, v)) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, "])")?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// OUTCOME
// ============================================================================

/// What a validator returns: pass/fail plus the failure, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub passed: bool,
    pub error: Option<ValidationError>,
}

impl Outcome {
    /// A passing outcome.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            passed: true,
            error: None,
        }
    }

    /// A failing outcome carrying `error`.
    #[must_use]
    pub fn fail(error: ValidationError) -> Self {
        Self {
            passed: false,
            error: Some(error),
        }
    }

    /// The failure message, if the rule failed.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_ref())
    }
}

// ============================================================================
// TESTS
// ============================================================================
