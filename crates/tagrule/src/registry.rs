//! Validator registry.
//!
//! Maps rule names to callables and their declared parameter kinds. A registry
//! is built once through [`RegistryBuilder`] and is immutable afterwards, so it
//! can be shared behind an `Arc` and read from any number of threads without
//! locking.
//!
//! # Examples
//!
//! ```
//! use serde_json::Value;
//! use tagrule::{Outcome, Registry, Validation, ValidationError};
//!
//! fn even(_: &mut Validation, value: &Value, _key: &str) -> Outcome {
//!     match value.as_i64() {
//!         Some(n) if n % 2 == 0 => Outcome::pass(),
//!         _ => Outcome::fail(ValidationError::new("even", "Must be even")),
//!     }
//! }
//!
//! let registry = Registry::builder().rule("Even", even).unwrap().build();
//! assert_eq!(registry.arity("Even").unwrap(), 0);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::Serialize;
use serde_json::Value;
use smallvec::{SmallVec, smallvec};

use crate::coerce::{ArgKind, ArgValue, RuleArg};
use crate::error::{CoercionError, RegistryError, RuleError};
use crate::outcome::Outcome;
use crate::validation::Validation;

/// Names of `Validation` methods. They can never be registered as rules.
pub const RESERVED_NAMES: [&str; 7] = [
    "Clear",
    "HasErrors",
    "ErrorMap",
    "Error",
    "apply",
    "Check",
    "Valid",
];

/// Parameter kinds of one rule, excluding the implicit context and value.
pub type ParamKinds = SmallVec<[ArgKind; 4]>;

/// Parse-time check of one coerced argument against its parameter type.
pub type ArgCheck = fn(&ArgValue) -> Result<(), CoercionError>;

/// Per-parameter checks of one rule, parallel to its [`ParamKinds`].
pub type ArgChecks = SmallVec<[ArgCheck; 4]>;

/// Type-erased validator callable.
pub type RuleFn =
    dyn Fn(&mut Validation, &Value, &RuleArgs<'_>) -> Result<Outcome, RuleError> + Send + Sync;

static SHARED: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::builtin()));

// ============================================================================
// SIGNATURE
// ============================================================================

/// Name and declared parameter kinds of a registered rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorSignature {
    name: String,
    params: ParamKinds,
}

impl ValidatorSignature {
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = ArgKind>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter kinds, in positional order.
    pub fn params(&self) -> &[ArgKind] {
        &self.params
    }

    /// Number of user-supplied arguments the rule takes.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for ValidatorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return f.write_str(&self.name);
        }
        write!(f, "{}(", self.name)?;
        for (i, kind) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// RULE ARGUMENTS
// ============================================================================

/// Coerced arguments of one invocation, followed by the rule-name marker.
#[derive(Debug, Clone, Copy)]
pub struct RuleArgs<'a> {
    rule: &'a str,
    values: &'a [ArgValue],
    key: &'a str,
}

impl<'a> RuleArgs<'a> {
    pub(crate) fn new(rule: &'a str, values: &'a [ArgValue], key: &'a str) -> Self {
        Self { rule, values, key }
    }

    /// Name of the rule being invoked.
    pub fn rule(&self) -> &'a str {
        self.rule
    }

    /// The coerced argument values.
    pub fn values(&self) -> &'a [ArgValue] {
        self.values
    }

    /// Trailing marker; errors are recorded under this key.
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extracts argument `index` as `T`.
    pub fn typed<T: RuleArg>(&self, index: usize) -> Result<T, RuleError> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| RuleError::arity(self.rule, index + 1, self.values.len()))?;

        T::from_arg(value).ok_or_else(|| {
            let reason = if value.kind() == T::KIND {
                format!(
                    "argument {} ({value}) does not fit {}",
                    index + 1,
                    std::any::type_name::<T>()
                )
            } else {
                format!(
                    "argument {} expects {}, got {}",
                    index + 1,
                    T::KIND,
                    value.kind()
                )
            };
            RuleError::dispatch(self.rule, reason)
        })
    }
}

// ============================================================================
// TYPED REGISTRATION
// ============================================================================

/// Conversion of a typed validator function into a registry entry.
///
/// Implemented for every `Fn(&mut Validation, &Value, &str, A1, .., An) -> Outcome`
/// with `n <= 4` and `Ai: RuleArg`. The signature is derived from the
/// parameter types, so arity and kinds are checked by the compiler.
pub trait IntoRule<Args>: Send + Sync + 'static {
    /// Declared parameter kinds.
    fn params() -> ParamKinds;

    /// Range checks for the parameter types, one per parameter.
    fn arg_checks() -> ArgChecks;

    /// Erases the function into a [`RuleFn`].
    fn into_rule(self) -> Arc<RuleFn>;
}

macro_rules! impl_into_rule {
    ($($arg:ident),*) => {
        impl<F, $($arg,)*> IntoRule<($($arg,)*)> for F
        where
            F: Fn(&mut Validation, &Value, &str $(, $arg)*) -> Outcome + Send + Sync + 'static,
            $($arg: RuleArg + 'static,)*
        {
            fn params() -> ParamKinds {
                smallvec![$($arg::KIND),*]
            }

            fn arg_checks() -> ArgChecks {
                smallvec![$(<$arg as RuleArg>::validate_arg as ArgCheck),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_rule(self) -> Arc<RuleFn> {
                let f = self;
                Arc::new(
                    move |ctx: &mut Validation,
                          value: &Value,
                          args: &RuleArgs<'_>|
                          -> Result<Outcome, RuleError> {
                        let mut index = 0usize;
                        $(
                            let $arg = args.typed::<$arg>(index)?;
                            index += 1;
                        )*
                        Ok(f(ctx, value, args.key() $(, $arg)*))
                    },
                )
            }
        }
    };
}

impl_into_rule!();
impl_into_rule!(A1);
impl_into_rule!(A1, A2);
impl_into_rule!(A1, A2, A3);
impl_into_rule!(A1, A2, A3, A4);

// ============================================================================
// REGISTRY
// ============================================================================

/// A registered rule: its signature and callable.
#[derive(Clone)]
pub struct RuleEntry {
    signature: ValidatorSignature,
    checks: ArgChecks,
    call: Arc<RuleFn>,
}

impl RuleEntry {
    pub fn signature(&self) -> &ValidatorSignature {
        &self.signature
    }

    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    /// Checks a coerced argument against the type of parameter `index`.
    /// Rules registered through [`RegistryBuilder::raw`] accept any value.
    pub(crate) fn check_arg(&self, index: usize, value: &ArgValue) -> Result<(), CoercionError> {
        self.checks.get(index).map_or(Ok(()), |check| check(value))
    }

    pub(crate) fn call(&self) -> &RuleFn {
        &*self.call
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Immutable mapping from rule name to validator.
#[derive(Clone, Default)]
pub struct Registry {
    rules: HashMap<String, RuleEntry>,
}

impl Registry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding every built-in check.
    #[must_use]
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    /// Process-wide built-in registry, built on first use.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Looks up a rule.
    pub fn lookup(&self, name: &str) -> Result<&RuleEntry, RuleError> {
        self.rules.get(name).ok_or_else(|| RuleError::not_found(name))
    }

    pub fn signature(&self, name: &str) -> Result<&ValidatorSignature, RuleError> {
        self.lookup(name).map(RuleEntry::signature)
    }

    /// Declared argument count of a rule.
    pub fn arity(&self, name: &str) -> Result<usize, RuleError> {
        self.lookup(name).map(RuleEntry::arity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Signatures of all rules, sorted by name.
    pub fn signatures(&self) -> Vec<&ValidatorSignature> {
        let mut signatures: Vec<_> = self.rules.values().map(RuleEntry::signature).collect();
        signatures.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        signatures
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.names())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects rules before freezing them into a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    rules: HashMap<String, RuleEntry>,
}

impl RegistryBuilder {
    /// Registers a typed validator function.
    pub fn rule<Args, F>(mut self, name: &str, f: F) -> Result<Self, RegistryError>
    where
        F: IntoRule<Args>,
    {
        check_name(name, &self.rules)?;
        self.insert(name, F::params(), F::arg_checks(), f.into_rule());
        Ok(self)
    }

    /// Registers a validator that receives the coerced arguments directly.
    ///
    /// Use this for parameter lists the typed path cannot express, including
    /// kinds the coercion table does not support.
    pub fn raw<F>(
        mut self,
        name: &str,
        params: impl IntoIterator<Item = ArgKind>,
        f: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&mut Validation, &Value, &RuleArgs<'_>) -> Result<Outcome, RuleError>
            + Send
            + Sync
            + 'static,
    {
        check_name(name, &self.rules)?;
        let params = params.into_iter().collect();
        self.insert(name, params, ArgChecks::new(), Arc::new(f));
        Ok(self)
    }

    /// Adds every built-in check.
    #[must_use]
    pub fn with_builtins(mut self) -> Self {
        crate::checks::register_builtins(&mut self);
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(rules = self.rules.len(), "built rule registry");
        Registry { rules: self.rules }
    }

    /// Unchecked insert for the built-in table; names there are covered by tests.
    pub(crate) fn builtin<Args, F: IntoRule<Args>>(&mut self, name: &'static str, f: F) {
        debug_assert!(check_name(name, &self.rules).is_ok(), "bad built-in rule {name}");
        self.insert(name, F::params(), F::arg_checks(), f.into_rule());
    }

    fn insert(&mut self, name: &str, params: ParamKinds, checks: ArgChecks, call: Arc<RuleFn>) {
        let signature = ValidatorSignature {
            name: name.to_owned(),
            params,
        };
        let entry = RuleEntry {
            signature,
            checks,
            call,
        };
        self.rules.insert(name.to_owned(), entry);
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn check_name(name: &str, rules: &HashMap<String, RuleEntry>) -> Result<(), RegistryError> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RegistryError::InvalidName(name.to_owned()));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(RegistryError::Reserved(name.to_owned()));
    }
    if rules.contains_key(name) {
        return Err(RegistryError::Duplicate(name.to_owned()));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
