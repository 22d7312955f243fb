//! Format checks: email address, IP address, base64.

use std::net::IpAddr;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::text;
use crate::outcome::ValidationError;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+",
        r"@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    ))
    .expect("email pattern compiles")
});

crate::check! {
    /// Email address with a dotted domain.
    pub Email;
    rule(value) { text(value).is_some_and(|s| EMAIL_REGEX.is_match(s)) }
    error() { ValidationError::new("email", "Must be a valid email address") }
}

crate::check! {
    /// IPv4 or IPv6 address.
    pub Ip;
    rule(value) { text(value).is_some_and(|s| s.parse::<IpAddr>().is_ok()) }
    error() { ValidationError::new("ip", "Must be a valid ip address") }
}

crate::check! {
    /// Standard padded base64.
    pub Base64;
    rule(value) { text(value).is_some_and(|s| STANDARD.decode(s).is_ok()) }
    error() { ValidationError::new("base64", "Must be valid base64 characters") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Check;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("user@example.com", true)]
    #[case("first.last+tag@mail.example.org", true)]
    #[case("user@localhost", false)]
    #[case("user.example.com", false)]
    #[case("@example.com", false)]
    fn test_email(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Email.is_satisfied(&json!(input)), expected);
    }

    #[rstest]
    #[case("127.0.0.1", true)]
    #[case("::1", true)]
    #[case("256.0.0.1", false)]
    #[case("localhost", false)]
    fn test_ip(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Ip.is_satisfied(&json!(input)), expected);
    }

    #[test]
    fn test_base64() {
        assert!(Base64.is_satisfied(&json!("aGVsbG8=")));
        assert!(!Base64.is_satisfied(&json!("aGVsbG8")));
        assert!(!Base64.is_satisfied(&json!("not base64!")));
        assert!(!Base64.is_satisfied(&json!(1)));
    }
}
