//! Argument coercion.
//!
//! Rule arguments arrive as text. Each registered validator declares the
//! [`ArgKind`] of every parameter, and [`coerce`] turns the text into an
//! [`ArgValue`] of that kind. The table is closed on purpose: supporting a new
//! argument kind means adding a variant here.

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::CoercionError;

// ============================================================================
// ARGUMENT KIND
// ============================================================================

/// Declared semantic type of a rule parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// Base-10 signed integer.
    Int,
    /// Raw text, passed through unchanged.
    Str,
    /// Compiled regular expression.
    Pattern,
    /// A parameter type the coercion table does not know. Rules declaring it
    /// can be registered but never parsed successfully.
    Unsupported(&'static str),
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Str => f.write_str("string"),
            Self::Pattern => f.write_str("pattern"),
            Self::Unsupported(ty) => write!(f, "unsupported({ty})"),
        }
    }
}

// ============================================================================
// ARGUMENT VALUE
// ============================================================================

/// A coerced rule argument.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    Int(i64),
    Str(String),
    Pattern(#[serde(serialize_with = "serialize_pattern")] Regex),
}

fn serialize_pattern<S: Serializer>(pattern: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(pattern.as_str())
}

impl ArgValue {
    /// The kind this value was coerced to.
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Int(_) => ArgKind::Int,
            Self::Str(_) => ArgKind::Str,
            Self::Pattern(_) => ArgKind::Pattern,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Regex> {
        match self {
            Self::Pattern(re) => Some(re),
            _ => None,
        }
    }
}

// Patterns compare by source text; two compilations of the same text are equal.
impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for ArgValue {}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Pattern(re) => f.write_str(re.as_str()),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Regex> for ArgValue {
    fn from(value: Regex) -> Self {
        Self::Pattern(value)
    }
}

// ============================================================================
// COERCION
// ============================================================================

/// Converts one argument token into a value of `kind`.
///
/// The caller is expected to have trimmed `raw` already.
///
/// # Examples
///
/// ```
/// use tagrule::{ArgKind, ArgValue, coerce};
///
/// assert_eq!(coerce(ArgKind::Int, "42").unwrap(), ArgValue::Int(42));
/// assert!(coerce(ArgKind::Pattern, "[").is_err());
/// ```
pub fn coerce(kind: ArgKind, raw: &str) -> Result<ArgValue, CoercionError> {
    match kind {
        ArgKind::Int => raw
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|source| CoercionError::NumericFormat {
                text: raw.to_owned(),
                source,
            }),
        ArgKind::Str => Ok(ArgValue::Str(raw.to_owned())),
        ArgKind::Pattern => {
            Regex::new(raw)
                .map(ArgValue::Pattern)
                .map_err(|source| CoercionError::PatternCompile {
                    text: raw.to_owned(),
                    source,
                })
        }
        ArgKind::Unsupported(ty) => Err(CoercionError::UnsupportedType {
            text: raw.to_owned(),
            ty,
        }),
    }
}

// ============================================================================
// TYPED ARGUMENTS
// ============================================================================

/// A Rust type that can receive a coerced rule argument.
///
/// Typed registration ([`RegistryBuilder::rule`](crate::RegistryBuilder::rule))
/// reads each closure parameter's `KIND` to build the rule signature.
pub trait RuleArg: Sized {
    /// Declared kind for the signature.
    const KIND: ArgKind;

    /// Extracts the argument, or `None` when the value has another kind or
    /// does not fit the target type.
    fn from_arg(value: &ArgValue) -> Option<Self>;

    /// Rejects a coerced value of the right kind that the type cannot hold.
    /// Runs at parse time, so range problems surface as coercion errors.
    fn validate_arg(_value: &ArgValue) -> Result<(), CoercionError> {
        Ok(())
    }
}

fn fits<T: RuleArg>(value: &ArgValue) -> Result<(), CoercionError> {
    match T::from_arg(value) {
        Some(_) => Ok(()),
        None => Err(CoercionError::OutOfRange {
            text: value.to_string(),
            ty: std::any::type_name::<T>(),
        }),
    }
}

impl RuleArg for i64 {
    const KIND: ArgKind = ArgKind::Int;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        value.as_int()
    }
}

impl RuleArg for i32 {
    const KIND: ArgKind = ArgKind::Int;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        value.as_int().and_then(|n| i32::try_from(n).ok())
    }

    fn validate_arg(value: &ArgValue) -> Result<(), CoercionError> {
        fits::<Self>(value)
    }
}

impl RuleArg for usize {
    const KIND: ArgKind = ArgKind::Int;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        value.as_int().and_then(|n| usize::try_from(n).ok())
    }

    fn validate_arg(value: &ArgValue) -> Result<(), CoercionError> {
        fits::<Self>(value)
    }
}

impl RuleArg for String {
    const KIND: ArgKind = ArgKind::Str;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl RuleArg for Regex {
    const KIND: ArgKind = ArgKind::Pattern;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        value.as_pattern().cloned()
    }
}

// ============================================================================
// TESTS
// ============================================================================
