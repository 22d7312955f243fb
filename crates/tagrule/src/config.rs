//! Engine options.

use serde::{Deserialize, Serialize};

/// How [`Validation`](crate::Validation) reacts to rule-string errors and
/// failed rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Return the first rule-string or dispatch error immediately. When off,
    /// such errors are collected in
    /// [`Validation::rule_errors`](crate::Validation::rule_errors) and
    /// validation continues with the next rule.
    pub fail_fast: bool,

    /// Stop running a field's remaining rules after its first failed rule.
    pub stop_on_first_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fail_fast: true,
            stop_on_first_failure: false,
        }
    }
}

impl EngineConfig {
    /// Collects every problem instead of stopping at the first.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            fail_fast: false,
            ..Self::default()
        }
    }

    /// One error per field at most.
    #[must_use]
    pub fn first_failure_per_field() -> Self {
        Self {
            stop_on_first_failure: true,
            ..Self::default()
        }
    }
}
