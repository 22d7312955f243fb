//! Property-based tests for tagrule.

use proptest::prelude::*;
use serde_json::json;
use tagrule::prelude::*;
use tagrule::{CoercionError, coerce};

// ============================================================================
// COERCION
// ============================================================================

proptest! {
    #[test]
    fn int_coercion_roundtrips_any_i64(n in any::<i64>()) {
        prop_assert_eq!(coerce(ArgKind::Int, &n.to_string()).unwrap(), ArgValue::Int(n));
    }

    #[test]
    fn int_coercion_rejects_letters(s in "[a-zA-Z]{1,12}") {
        let is_numeric_format = matches!(
            coerce(ArgKind::Int, &s),
            Err(CoercionError::NumericFormat { .. })
        );
        prop_assert!(is_numeric_format);
    }

    #[test]
    fn str_coercion_is_identity(s in ".*") {
        prop_assert_eq!(coerce(ArgKind::Str, &s).unwrap(), ArgValue::Str(s.clone()));
    }
}

// ============================================================================
// PARSING IS DETERMINISTIC
// ============================================================================

proptest! {
    #[test]
    fn parse_is_idempotent(min in -1000i64..1000, span in 0i64..1000, len in 0i64..64) {
        let registry = Registry::shared();
        let tag = format!("Required; Range({min}, {}); MaxLen({len})", min + span);

        let first = parse_tag(&registry, &tag).unwrap();
        let second = parse_tag(&registry, &tag).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), 3);
        prop_assert_eq!(&first[1].args, &vec![ArgValue::Int(min), ArgValue::Int(min + span)]);
    }

    #[test]
    fn arbitrary_text_never_panics(tag in ".{0,64}") {
        let registry = Registry::shared();
        let _ = parse_tag(&registry, &tag);
        let _ = tagrule::parse_tag_lenient(&registry, &tag);
    }
}

// ============================================================================
// CHECK SEMANTICS
// ============================================================================

proptest! {
    #[test]
    fn max_len_agrees_with_char_count(s in ".{0,30}", max in 0i64..30) {
        let mut valid = Validation::default();
        let passed = valid.check(&json!(s), &format!("MaxLen({max})")).unwrap();
        prop_assert_eq!(passed, s.chars().count() as i64 <= max);
    }

    #[test]
    fn range_agrees_with_bounds(n in -500i64..500) {
        let mut valid = Validation::default();
        let passed = valid.check(&json!(n), "Range(-100, 100)").unwrap();
        prop_assert_eq!(passed, (-100..=100).contains(&n));
    }
}
