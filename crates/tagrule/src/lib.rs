//! # tagrule
//!
//! Declarative validation from compact rule strings.
//!
//! A field is annotated with a tag such as `Required; MaxLen(10); Match(^[a-z]+$)`.
//! At runtime the tag is parsed, each rule name is resolved in a [`Registry`],
//! textual arguments are coerced to the validator's parameter types, and the
//! validator is invoked against the field's value. Unknown rules, wrong
//! arities, bad arguments and panicking validators all surface as
//! [`RuleError`] values instead of crashing the caller.
//!
//! ## Quick Start
//!
//! ```
//! use tagrule::prelude::*;
//!
//! #[derive(serde::Serialize)]
//! struct Signup {
//!     username: String,
//!     email: String,
//!     age: i64,
//! }
//!
//! tagged!(Signup {
//!     username => "Required; AlphaDash; MaxLen(16)",
//!     email => "Email",
//!     age => "Range(13, 130)",
//! });
//!
//! let signup = Signup {
//!     username: "new-user".into(),
//!     email: "not-an-email".into(),
//!     age: 30,
//! };
//!
//! let mut valid = Validation::default();
//! assert!(!valid.valid(&signup).unwrap());
//! assert!(valid.error_map().contains_key("email.Email"));
//! ```
//!
//! ## Custom rules
//!
//! Rules are plain functions. The parameter list after the implicit context,
//! value and key becomes the rule's signature:
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::{Value, json};
//! use tagrule::{Outcome, Registry, Validation, ValidationError};
//!
//! fn divisible_by(_: &mut Validation, value: &Value, _key: &str, n: i64) -> Outcome {
//!     match value.as_i64() {
//!         Some(v) if n != 0 && v % n == 0 => Outcome::pass(),
//!         _ => Outcome::fail(ValidationError::new(
//!             "divisible_by",
//!             format!("Must be divisible by {n}"),
//!         )),
//!     }
//! }
//!
//! let registry = Arc::new(
//!     Registry::builder()
//!         .with_builtins()
//!         .rule("DivisibleBy", divisible_by)
//!         .unwrap()
//!         .build(),
//! );
//!
//! let mut valid = Validation::new(registry);
//! assert!(valid.check(&json!(12), "Required; DivisibleBy(4)").unwrap());
//! assert!(!valid.check(&json!(10), "DivisibleBy(4)").unwrap());
//! ```

#[macro_use]
mod macros;

pub mod checks;
pub mod coerce;
pub mod config;
mod dispatch;
pub mod error;
pub mod fields;
pub mod outcome;
pub mod parser;
pub mod registry;
pub mod validation;

pub use checks::Check;
pub use coerce::{ArgKind, ArgValue, RuleArg, coerce};
pub use config::EngineConfig;
pub use error::{CoercionError, RegistryError, RuleError};
pub use fields::{FieldDescriptor, Tagged};
pub use outcome::{Outcome, ValidationError};
pub use parser::{RuleDescriptor, parse_rule, parse_tag, parse_tag_lenient};
pub use registry::{
    ArgCheck, ArgChecks, IntoRule, RESERVED_NAMES, Registry, RegistryBuilder, RuleArgs,
    ValidatorSignature,
};
pub use validation::Validation;

/// Common imports.
pub mod prelude {
    pub use crate::checks::Check;
    pub use crate::{
        ArgKind, ArgValue, EngineConfig, FieldDescriptor, Outcome, Registry, RuleDescriptor,
        RuleError, Tagged, Validation, ValidationError, check, parse_tag, tagged,
    };
}
