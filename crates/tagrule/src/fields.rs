//! Field descriptors: the `(name, rules, value)` triples an entity exposes
//! for validation.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use crate::error::RuleError;

/// One field of an entity, with its rule string and current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: Cow<'static, str>,
    pub rules: Cow<'static, str>,
    pub value: Value,
}

impl FieldDescriptor {
    /// Serialises `value` to JSON and pairs it with the field's rules.
    pub fn new<T: Serialize + ?Sized>(
        name: impl Into<Cow<'static, str>>,
        rules: impl Into<Cow<'static, str>>,
        value: &T,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        let value = serde_json::to_value(value).map_err(|source| RuleError::FieldValue {
            field: name.to_string(),
            source,
        })?;
        Ok(Self {
            name,
            rules: rules.into(),
            value,
        })
    }

    /// Pairs an already-converted JSON value with the field's rules.
    pub fn from_value(
        name: impl Into<Cow<'static, str>>,
        rules: impl Into<Cow<'static, str>>,
        value: Value,
    ) -> Self {
        Self {
            name: name.into(),
            rules: rules.into(),
            value,
        }
    }
}

/// A source of field descriptors.
///
/// Usually implemented with the [`tagged!`](crate::tagged) macro.
pub trait Tagged {
    fn fields(&self) -> Result<Vec<FieldDescriptor>, RuleError>;
}

impl Tagged for [FieldDescriptor] {
    fn fields(&self) -> Result<Vec<FieldDescriptor>, RuleError> {
        Ok(self.to_vec())
    }
}

impl Tagged for Vec<FieldDescriptor> {
    fn fields(&self) -> Result<Vec<FieldDescriptor>, RuleError> {
        Ok(self.clone())
    }
}
