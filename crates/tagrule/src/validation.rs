//! Validation context: runs rule strings and accumulates failures.
//!
//! One [`Validation`] is used per validated entity. Validators receive it as
//! `&mut Validation`, so they can record extra errors or run nested checks.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::checks::{self, Check};
use crate::config::EngineConfig;
use crate::error::RuleError;
use crate::fields::Tagged;
use crate::outcome::{Outcome, ValidationError};
use crate::parser::{RuleDescriptor, parse_tag, parse_tag_lenient};
use crate::registry::Registry;

/// Error accumulator bound to a registry.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tagrule::Validation;
///
/// let mut valid = Validation::default();
///
/// assert!(valid.check(&json!("alice"), "Required; MaxLen(10)").unwrap());
/// assert!(!valid.check(&json!(""), "Required").unwrap());
///
/// assert!(valid.has_errors());
/// assert_eq!(valid.error_map()["Required"].message, "Can not be empty");
/// ```
#[derive(Debug)]
pub struct Validation {
    registry: Arc<Registry>,
    config: EngineConfig,
    errors: Vec<ValidationError>,
    rule_errors: Vec<RuleError>,
    current_field: Option<Cow<'static, str>>,
}

/// Recorded state before a validator call, restored when the call panics.
#[derive(Debug)]
pub(crate) struct Checkpoint {
    errors: usize,
    rule_errors: usize,
    current_field: Option<Cow<'static, str>>,
}

impl Default for Validation {
    fn default() -> Self {
        Self::new(Registry::shared())
    }
}

impl Validation {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            errors: Vec::new(),
            rule_errors: Vec::new(),
            current_field: None,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recorded failures, in the order they occurred.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Rule-string and dispatch errors collected while `fail_fast` is off.
    pub fn rule_errors(&self) -> &[RuleError] {
        &self.rule_errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drops every recorded error.
    pub fn clear(&mut self) {
        self.errors.clear();
        self.rule_errors.clear();
    }

    /// Recorded failures keyed by [`ValidationError::map_key`]. When several
    /// failures share a key, the first one is kept.
    pub fn error_map(&self) -> BTreeMap<String, &ValidationError> {
        let mut map = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.map_key()).or_insert(error);
        }
        map
    }

    /// Records an ad-hoc failure with `message` and returns it as an outcome.
    pub fn error(&mut self, message: impl Into<Cow<'static, str>>) -> Outcome {
        let error = self.attach_field(ValidationError::new("custom", message));
        self.errors.push(error.clone());
        Outcome::fail(error)
    }

    /// Records `error`, tagging it with the field being validated.
    pub fn record(&mut self, error: ValidationError) {
        let error = self.attach_field(error);
        self.errors.push(error);
    }

    /// Runs `check` on `value` and records the failure under `key`.
    pub fn apply<C: Check + ?Sized>(&mut self, check: &C, value: &Value, key: &str) -> Outcome {
        let outcome = checks::evaluate(check, value, key);
        if let Some(error) = &outcome.error {
            self.record(error.clone());
        }
        outcome
    }

    /// Parses `tag` and runs each rule against `value`.
    ///
    /// Returns whether every rule passed. With `fail_fast` on (the default),
    /// the first rule-string or dispatch error is returned; otherwise it is
    /// collected in [`rule_errors`](Self::rule_errors) and counts as a failure.
    pub fn check(&mut self, value: &Value, tag: &str) -> Result<bool, RuleError> {
        let rule_errors = self.rule_errors.len();
        let rules = self.parse(tag)?;
        let passed = self.run(value, &rules)?;
        Ok(passed && self.rule_errors.len() == rule_errors)
    }

    /// Validates every field of `entity` against its rule string.
    ///
    /// Returns `true` when no failure and no rule error was recorded.
    pub fn valid<T: Tagged + ?Sized>(&mut self, entity: &T) -> Result<bool, RuleError> {
        let fields = match entity.fields() {
            Ok(fields) => fields,
            Err(err) if self.config.fail_fast => return Err(err),
            Err(err) => {
                self.rule_errors.push(err);
                return Ok(false);
            }
        };

        for field in fields {
            tracing::trace!(field = %field.name, rules = %field.rules, "validating field");
            self.current_field = Some(field.name.clone());
            let result = self
                .parse(&field.rules)
                .and_then(|rules| self.run(&field.value, &rules));
            self.current_field = None;
            result?;
        }

        Ok(!self.has_errors() && self.rule_errors.is_empty())
    }

    fn parse(&mut self, tag: &str) -> Result<Vec<RuleDescriptor>, RuleError> {
        if self.config.fail_fast {
            return parse_tag(&self.registry, tag);
        }
        let (rules, errors) = parse_tag_lenient(&self.registry, tag);
        self.rule_errors.extend(errors);
        Ok(rules)
    }

    fn run(&mut self, value: &Value, rules: &[RuleDescriptor]) -> Result<bool, RuleError> {
        let registry = Arc::clone(&self.registry);
        let mut passed = true;

        for rule in rules {
            match registry.dispatch(rule, self, value) {
                Ok(outcome) if outcome.passed => {}
                Ok(outcome) => {
                    passed = false;
                    let mut error = outcome.error.unwrap_or_else(|| {
                        ValidationError::new("invalid", "Is not valid").with_value(value)
                    });
                    if error.key.is_none() {
                        error.key = Some(rule.key.clone().into());
                    }
                    self.record(error);
                    if self.config.stop_on_first_failure {
                        break;
                    }
                }
                Err(err) if self.config.fail_fast => return Err(err),
                Err(err) => {
                    passed = false;
                    self.rule_errors.push(err);
                }
            }
        }

        Ok(passed)
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            errors: self.errors.len(),
            rule_errors: self.rule_errors.len(),
            current_field: self.current_field.clone(),
        }
    }

    /// Drops everything recorded since `checkpoint`.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.errors.truncate(checkpoint.errors);
        self.rule_errors.truncate(checkpoint.rule_errors);
        self.current_field = checkpoint.current_field;
    }

    fn attach_field(&self, mut error: ValidationError) -> ValidationError {
        if error.field.is_none() {
            error.field.clone_from(&self.current_field);
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{MaxLen, Required};
    use crate::fields::FieldDescriptor;
    use serde_json::json;

    #[test]
    fn test_apply_records_failure() {
        let mut valid = Validation::default();

        assert!(valid.apply(&Required, &json!("x"), "Required").passed);
        assert!(!valid.has_errors());

        let outcome = valid.apply(&MaxLen::new(2), &json!("abc"), "name.MaxLen");
        assert!(!outcome.passed);
        assert_eq!(valid.errors().len(), 1);
        assert_eq!(valid.errors()[0].key.as_deref(), Some("name.MaxLen"));
    }

    #[test]
    fn test_error_and_clear() {
        let mut valid = Validation::default();
        let outcome = valid.error("account is locked");

        assert_eq!(outcome.message(), Some("account is locked"));
        assert!(valid.has_errors());

        valid.clear();
        assert!(!valid.has_errors());
        assert!(valid.error_map().is_empty());
    }

    #[test]
    fn test_error_map_keeps_first() {
        let mut valid = Validation::default();
        valid.record(ValidationError::new("a", "first").with_key("K"));
        valid.record(ValidationError::new("b", "second").with_key("K"));

        let map = valid.error_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["K"].message, "first");
    }

    #[test]
    fn test_check_records_each_failed_rule() {
        let mut valid = Validation::default();
        let passed = valid.check(&json!("abc1"), "Alpha; MaxLen(3); MinLen(1)").unwrap();

        assert!(!passed);
        let keys: Vec<_> = valid.errors().iter().map(ValidationError::map_key).collect();
        assert_eq!(keys, vec!["Alpha", "MaxLen"]);
    }

    #[test]
    fn test_check_stop_on_first_failure() {
        let mut valid =
            Validation::with_config(Registry::shared(), EngineConfig::first_failure_per_field());
        assert!(!valid.check(&json!("abc1"), "Alpha; MaxLen(3)").unwrap());
        assert_eq!(valid.errors().len(), 1);
    }

    #[test]
    fn test_check_fail_fast_returns_rule_error() {
        let mut valid = Validation::default();
        let err = valid.check(&json!("x"), "Required; Nope").unwrap_err();
        assert!(matches!(err, RuleError::NotFound { .. }));
        assert!(!valid.has_errors());
    }

    #[test]
    fn test_check_lenient_collects_rule_errors() {
        let mut valid = Validation::with_config(Registry::shared(), EngineConfig::lenient());
        let passed = valid.check(&json!("x"), "Required; Nope; MaxLen(x)").unwrap();

        assert!(!passed);
        assert!(!valid.has_errors());
        assert_eq!(valid.rule_errors().len(), 2);
    }

    #[test]
    fn test_valid_tags_errors_with_field() {
        let fields = vec![
            FieldDescriptor::from_value("name", "Required; MaxLen(3)", json!("abcd")),
            FieldDescriptor::from_value("age", "Range(0, 150)", json!(30)),
        ];

        let mut valid = Validation::default();
        assert!(!valid.valid(&fields).unwrap());
        assert_eq!(valid.errors().len(), 1);
        assert_eq!(valid.errors()[0].field.as_deref(), Some("name"));
        assert!(valid.error_map().contains_key("name.MaxLen"));
    }

    #[test]
    fn test_validator_can_record_through_context() {
        fn audit(ctx: &mut Validation, _: &Value, key: &str) -> Outcome {
            ctx.record(ValidationError::new("audit", "noted").with_key(format!("{key}.note")));
            Outcome::pass()
        }

        let registry = Arc::new(
            Registry::builder()
                .with_builtins()
                .rule("Audit", audit)
                .unwrap()
                .build(),
        );
        let fields = [FieldDescriptor::from_value("id", "Audit", json!(1))];

        let mut valid = Validation::new(registry);
        assert!(!valid.valid(&fields[..]).unwrap());
        assert!(valid.error_map().contains_key("id.Audit.note"));
    }
}
