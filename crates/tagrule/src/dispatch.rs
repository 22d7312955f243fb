//! Rule dispatch.
//!
//! The dispatcher is the one place where validator faults are contained: the
//! call runs under `catch_unwind`, so a panicking validator becomes a
//! [`RuleError::DispatchFailure`] instead of taking the process down. Errors
//! the validator recorded on the context before panicking are discarded.
//!
//! Containment does not bypass the process panic hook. The default hook still
//! prints the panic message to stderr; binaries that want quiet containment
//! install their own hook with [`std::panic::set_hook`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::coerce::ArgValue;
use crate::error::RuleError;
use crate::outcome::Outcome;
use crate::parser::RuleDescriptor;
use crate::registry::{Registry, RuleArgs};
use crate::validation::Validation;

impl Registry {
    /// Invokes rule `name` on `value` with already-coerced `args`.
    ///
    /// Arity and argument kinds are re-checked against the signature, since
    /// callers may build argument lists without going through the parser.
    pub fn invoke(
        &self,
        name: &str,
        ctx: &mut Validation,
        value: &Value,
        args: &[ArgValue],
        key: &str,
    ) -> Result<Outcome, RuleError> {
        let entry = self.lookup(name)?;
        let params = entry.signature().params();

        if args.len() != params.len() {
            return Err(RuleError::arity(name, params.len(), args.len()));
        }
        if let Some((index, (declared, actual))) = params
            .iter()
            .zip(args)
            .enumerate()
            .find(|(_, (declared, actual))| **declared != actual.kind())
        {
            return Err(RuleError::dispatch(
                name,
                format!(
                    "argument {} expects {declared}, got {}",
                    index + 1,
                    actual.kind()
                ),
            ));
        }

        tracing::trace!(rule = name, key, args = args.len(), "dispatching rule");

        let rule_args = RuleArgs::new(name, args, key);
        let call = entry.call();
        let checkpoint = ctx.checkpoint();
        match panic::catch_unwind(AssertUnwindSafe(|| call(ctx, value, &rule_args))) {
            Ok(result) => result,
            Err(payload) => {
                ctx.rollback(checkpoint);
                let reason = panic_message(payload.as_ref());
                tracing::warn!(rule = name, %reason, "recovered panic in validator");
                Err(RuleError::dispatch(
                    name,
                    format!("validator panicked: {reason}"),
                ))
            }
        }
    }

    /// Invokes a parsed rule.
    pub fn dispatch(
        &self,
        rule: &RuleDescriptor,
        ctx: &mut Validation,
        value: &Value,
    ) -> Result<Outcome, RuleError> {
        self.invoke(&rule.name, ctx, value, &rule.args, &rule.key)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::outcome::ValidationError;
    use serde_json::json;
    use std::sync::Arc;

    fn max_len(_: &mut Validation, value: &Value, key: &str, max: i64) -> Outcome {
        match value.as_str() {
            Some(s) if s.chars().count() as i64 <= max => Outcome::pass(),
            _ => Outcome::fail(
                ValidationError::new("max_len", "too long").with_key(key.to_owned()),
            ),
        }
    }

    fn explode(_: &mut Validation, value: &Value, _: &str) -> Outcome {
        let n = value.as_i64().unwrap_or_default();
        assert!(n >= 0, "negative input {n}");
        Outcome::pass()
    }

    fn record_then_explode(ctx: &mut Validation, _: &Value, _: &str) -> Outcome {
        ctx.record(ValidationError::new("partial", "half-finished check"));
        ctx.error("second partial");
        panic!("gave up after recording");
    }

    fn registry() -> Arc<Registry> {
        Arc::new(
            Registry::builder()
                .rule("MaxLen", max_len)
                .unwrap()
                .rule("Explode", explode)
                .unwrap()
                .rule("Partial", record_then_explode)
                .unwrap()
                .build(),
        )
    }

    #[test]
    fn test_invoke_passes_and_fails() {
        let registry = registry();
        let mut ctx = Validation::new(Arc::clone(&registry));

        let ok = registry
            .invoke("MaxLen", &mut ctx, &json!("abc"), &[ArgValue::Int(3)], "MaxLen")
            .unwrap();
        assert!(ok.passed);

        let failed = registry
            .invoke("MaxLen", &mut ctx, &json!("abcd"), &[ArgValue::Int(3)], "MaxLen")
            .unwrap();
        assert!(!failed.passed);
        assert_eq!(failed.error.unwrap().key.as_deref(), Some("MaxLen"));
    }

    #[test]
    fn test_invoke_unknown() {
        let registry = registry();
        let mut ctx = Validation::new(Arc::clone(&registry));
        let err = registry
            .invoke("Nope", &mut ctx, &Value::Null, &[], "Nope")
            .unwrap_err();
        assert!(matches!(err, RuleError::NotFound { .. }));
    }

    #[test]
    fn test_invoke_rechecks_arity() {
        let registry = registry();
        let mut ctx = Validation::new(Arc::clone(&registry));
        let err = registry
            .invoke("MaxLen", &mut ctx, &json!("a"), &[], "MaxLen")
            .unwrap_err();
        assert!(matches!(
            err,
            RuleError::ArityMismatch { expected: 1, found: 0, .. }
        ));
    }

    #[test]
    fn test_invoke_rejects_wrong_kind() {
        let registry = registry();
        let mut ctx = Validation::new(Arc::clone(&registry));
        let err = registry
            .invoke("MaxLen", &mut ctx, &json!("a"), &[ArgValue::from("3")], "MaxLen")
            .unwrap_err();
        assert!(matches!(
            err,
            RuleError::DispatchFailure { ref reason, .. } if reason.contains("expects int")
        ));
    }

    #[test]
    fn test_invoke_contains_panic() {
        let registry = registry();
        let mut ctx = Validation::new(Arc::clone(&registry));

        let err = registry
            .invoke("Explode", &mut ctx, &json!(-1), &[], "Explode")
            .unwrap_err();
        match err {
            RuleError::DispatchFailure { rule, reason } => {
                assert_eq!(rule, "Explode");
                assert!(reason.contains("negative input -1"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The registry keeps working after a contained panic.
        assert!(
            registry
                .invoke("Explode", &mut ctx, &json!(1), &[], "Explode")
                .unwrap()
                .passed
        );
    }

    #[test]
    fn test_panic_discards_partial_records() {
        let registry = registry();
        let mut ctx = Validation::new(Arc::clone(&registry));
        ctx.error("recorded before");

        let err = registry
            .invoke("Partial", &mut ctx, &json!("x"), &[], "Partial")
            .unwrap_err();
        assert!(matches!(
            err,
            RuleError::DispatchFailure { ref reason, .. } if reason.contains("gave up")
        ));

        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].message, "recorded before");
    }

    #[test]
    fn test_panic_through_check_leaves_no_failures() {
        let mut ctx = Validation::with_config(registry(), EngineConfig::lenient());

        assert!(!ctx.check(&json!("x"), "Partial").unwrap());
        assert!(!ctx.has_errors());
        assert_eq!(ctx.rule_errors().len(), 1);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
    }
}
