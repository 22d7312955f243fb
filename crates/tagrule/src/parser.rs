//! Rule-string parser.
//!
//! Grammar:
//!
//! ```text
//! tag  := rule (';' rule)*
//! rule := name ['(' arg (',' arg)* ')']
//! ```
//!
//! Arguments are split on every `,` between the parentheses. A pattern that
//! itself contains a comma (`Match(a{1,3})`) is therefore split into two
//! arguments and rejected with an arity error.

use serde::Serialize;

use crate::coerce::{ArgValue, coerce};
use crate::error::RuleError;
use crate::registry::Registry;

// ============================================================================
// RULE DESCRIPTOR
// ============================================================================

/// A parsed rule, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    /// Registered rule name.
    pub name: String,
    /// Coerced arguments, in source order.
    pub args: Vec<ArgValue>,
    /// Trailing rule-name marker handed to the validator.
    pub key: String,
}

impl RuleDescriptor {
    /// Builds a descriptor whose key is the rule name.
    pub fn new(name: impl Into<String>, args: Vec<ArgValue>) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            args,
        }
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parses a whole tag into descriptors, stopping at the first bad rule.
///
/// An empty or whitespace-only tag yields no descriptors. Empty segments
/// between semicolons (`"Required;;Alpha"`, a trailing `;`) are skipped.
///
/// # Examples
///
/// ```
/// use tagrule::{ArgValue, Registry, parse_tag};
///
/// let registry = Registry::builtin();
/// let rules = parse_tag(&registry, "Required; MaxLen(10)").unwrap();
///
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[1].args, vec![ArgValue::Int(10)]);
/// assert!(parse_tag(&registry, "   ").unwrap().is_empty());
/// ```
pub fn parse_tag(registry: &Registry, tag: &str) -> Result<Vec<RuleDescriptor>, RuleError> {
    rule_tokens(tag)
        .map(|(offset, token)| parse_token(registry, token, offset))
        .collect()
}

/// Parses a whole tag, continuing past bad rules.
///
/// Returns the descriptors that parsed, in source order, and one error per
/// rule that did not.
pub fn parse_tag_lenient(registry: &Registry, tag: &str) -> (Vec<RuleDescriptor>, Vec<RuleError>) {
    let mut rules = Vec::new();
    let mut errors = Vec::new();
    for (offset, token) in rule_tokens(tag) {
        match parse_token(registry, token, offset) {
            Ok(rule) => rules.push(rule),
            Err(err) => {
                tracing::debug!(token, error = %err, "skipping unparsable rule");
                errors.push(err);
            }
        }
    }
    (rules, errors)
}

/// Parses a single rule such as `Range(1, 10)`.
pub fn parse_rule(registry: &Registry, rule: &str) -> Result<RuleDescriptor, RuleError> {
    let leading = rule.len() - rule.trim_start().len();
    parse_token(registry, rule.trim(), leading)
}

impl Registry {
    /// Shorthand for [`parse_tag`] against this registry.
    pub fn parse(&self, tag: &str) -> Result<Vec<RuleDescriptor>, RuleError> {
        parse_tag(self, tag)
    }
}

/// Non-empty trimmed rule tokens with their byte offset in `tag`.
fn rule_tokens(tag: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut start = 0;
    tag.split(';').filter_map(move |segment| {
        let offset = start;
        start += segment.len() + 1;
        let token = segment.trim();
        let leading = segment.len() - segment.trim_start().len();
        (!token.is_empty()).then_some((offset + leading, token))
    })
}

/// Parses one trimmed, non-empty rule token found at `offset`.
fn parse_token(
    registry: &Registry,
    token: &str,
    offset: usize,
) -> Result<RuleDescriptor, RuleError> {
    let Some(open) = token.find('(') else {
        let expected = registry.arity(token)?;
        if expected != 0 {
            return Err(RuleError::arity(token, expected, 0));
        }
        return Ok(RuleDescriptor::new(token, Vec::new()));
    };

    let name = token[..open].trim();
    if name.is_empty() {
        return Err(syntax(token, offset, "missing rule name"));
    }

    let close = match token.rfind(')') {
        Some(close) if close > open => close,
        _ => return Err(syntax(name, offset + token.len(), "missing closing parenthesis")),
    };
    if close + 1 != token.len() {
        return Err(syntax(
            name,
            offset + close + 1,
            "unexpected text after closing parenthesis",
        ));
    }

    let entry = registry.lookup(name)?;
    let params = entry.signature().params();

    let inner = &token[open + 1..close];
    let raw: Vec<&str> = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(str::trim).collect()
    };

    if raw.len() != params.len() {
        return Err(RuleError::arity(name, params.len(), raw.len()));
    }

    let args = raw
        .iter()
        .zip(params)
        .enumerate()
        .map(|(index, (text, kind))| {
            coerce(*kind, text)
                .and_then(|arg| entry.check_arg(index, &arg).map(|()| arg))
                .map_err(|source| RuleError::Coercion {
                    rule: name.to_owned(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleDescriptor::new(name, args))
}

fn syntax(rule: &str, position: usize, reason: &'static str) -> RuleError {
    RuleError::Syntax {
        rule: rule.to_owned(),
        position,
        reason,
    }
}

// ============================================================================
// TESTS
// ============================================================================
