//! Character-class and pattern checks.

use regex::Regex;

use super::{rendered, text};
use crate::outcome::ValidationError;

crate::check! {
    /// ASCII letters only.
    pub Alpha;
    rule(value) { text(value).is_some_and(|s| s.chars().all(|c| c.is_ascii_alphabetic())) }
    error() { ValidationError::new("alpha", "Must be valid alpha characters") }
}

crate::check! {
    /// ASCII digits only.
    pub Numeric;
    rule(value) { text(value).is_some_and(|s| s.chars().all(|c| c.is_ascii_digit())) }
    error() { ValidationError::new("numeric", "Must be valid numeric characters") }
}

crate::check! {
    /// ASCII letters and digits only.
    pub AlphaNumeric;
    rule(value) { text(value).is_some_and(|s| s.chars().all(|c| c.is_ascii_alphanumeric())) }
    error() { ValidationError::new("alpha_numeric", "Must be valid alpha or numeric characters") }
}

crate::check! {
    /// ASCII letters, digits, `-` and `_`.
    pub AlphaDash;
    rule(value) {
        text(value).is_some_and(|s| {
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
    }
    error() {
        ValidationError::new(
            "alpha_dash",
            "Must be valid alpha or numeric or dash(-_) characters",
        )
    }
}

crate::check! {
    /// Passes when the rendered value matches `pattern`.
    pub Match { pattern: Regex };
    rule(self, value) { rendered(value).is_some_and(|s| self.pattern.is_match(&s)) }
    error(self) {
        ValidationError::new("match", format!("Must match {}", self.pattern))
            .with_param("pattern", self.pattern.as_str().to_owned())
    }
}

crate::check! {
    /// Passes when the rendered value does not match `pattern`.
    pub NoMatch { pattern: Regex };
    rule(self, value) { rendered(value).is_some_and(|s| !self.pattern.is_match(&s)) }
    error(self) {
        ValidationError::new("no_match", format!("Must not match {}", self.pattern))
            .with_param("pattern", self.pattern.as_str().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Check;
    use serde_json::json;

    #[test]
    fn test_alpha() {
        assert!(Alpha.is_satisfied(&json!("abcXYZ")));
        assert!(!Alpha.is_satisfied(&json!("abc1")));
        assert!(!Alpha.is_satisfied(&json!("é")));
        assert!(!Alpha.is_satisfied(&json!(1)));
    }

    #[test]
    fn test_numeric() {
        assert!(Numeric.is_satisfied(&json!("0123")));
        assert!(!Numeric.is_satisfied(&json!("12.3")));
        assert!(!Numeric.is_satisfied(&json!(123)));
    }

    #[test]
    fn test_alpha_numeric_and_dash() {
        assert!(AlphaNumeric.is_satisfied(&json!("abc123")));
        assert!(!AlphaNumeric.is_satisfied(&json!("abc-123")));
        assert!(AlphaDash.is_satisfied(&json!("abc-123_x")));
        assert!(!AlphaDash.is_satisfied(&json!("abc 123")));
    }

    #[test]
    fn test_match_renders_scalars() {
        let check = Match::new(Regex::new(r"^\d{3}$").unwrap());
        assert!(check.is_satisfied(&json!("123")));
        assert!(check.is_satisfied(&json!(123)));
        assert!(!check.is_satisfied(&json!("12a")));
        assert!(!check.is_satisfied(&json!(null)));
    }

    #[test]
    fn test_no_match() {
        let check = NoMatch::new(Regex::new("admin").unwrap());
        assert!(check.is_satisfied(&json!("alice")));
        assert!(!check.is_satisfied(&json!("superadmin")));
        assert_eq!(check.error().param("pattern"), Some("admin"));
    }
}
