//! Macros for declaring checks and field tables with minimal boilerplate.
//!
//! # Available Macros
//!
//! - [`check!`]: create a check (struct + [`Check`](crate::checks::Check) impl + constructor)
//! - [`tagged!`]: implement [`Tagged`](crate::Tagged) from a field → rules table
//!
//! # Examples
//!
//! ```
//! use tagrule::{ValidationError, check, tagged};
//!
//! check! {
//!     /// Passes for even integers.
//!     pub Even;
//!     rule(value) { value.as_i64().is_some_and(|n| n % 2 == 0) }
//!     error() { ValidationError::new("even", "Must be even") }
//! }
//!
//! #[derive(serde::Serialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! tagged!(User {
//!     name => "Required; MaxLen(20)",
//!     age => "Range(0, 150)",
//! });
//! ```

// ============================================================================
// CHECK MACRO
// ============================================================================

/// Creates a check: struct definition, `Check` implementation and constructor.
///
/// `#[derive(Debug, Clone)]` is always applied. Add extra derives via `#[derive(...)]`.
///
/// # Variants
///
/// **Unit check** (zero-sized, no fields):
/// ```rust,ignore
/// check! {
///     pub Required;
///     rule(value) { !value.is_null() }
///     error() { ValidationError::new("required", "Can not be empty") }
/// }
/// ```
///
/// **Struct with fields** (auto `new` from all fields):
/// ```rust,ignore
/// check! {
///     #[derive(Copy, PartialEq, Eq)]
///     pub Min { min: i64 };
///     rule(self, value) { value.as_i64().is_some_and(|n| n >= self.min) }
///     error(self) { ValidationError::new("min", format!("Minimum is {}", self.min)) }
/// }
/// ```
#[macro_export]
macro_rules! check {
    // Unit check (no fields).
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident;
        rule($val:ident) $rule:block
        error() $err:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $name {
            #[must_use]
            pub const fn new() -> Self {
                Self
            }
        }

        impl $crate::checks::Check for $name {
            fn is_satisfied(&self, $val: &::serde_json::Value) -> bool $rule

            fn error(&self) -> $crate::ValidationError $err
        }
    };

    // Struct with fields and an auto `new`.
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident { $($field:ident: $fty:ty),+ $(,)? };
        rule($self_:ident, $val:ident) $rule:block
        error($self2:ident) $err:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(pub $field: $fty,)+
        }

        impl $name {
            #[must_use]
            pub fn new($($field: $fty),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl $crate::checks::Check for $name {
            fn is_satisfied(&$self_, $val: &::serde_json::Value) -> bool $rule

            fn error(&$self2) -> $crate::ValidationError $err
        }
    };
}

// ============================================================================
// TAGGED MACRO
// ============================================================================

/// Implements [`Tagged`](crate::Tagged) for a struct from a field → rules
/// table. Listed fields must implement `serde::Serialize`; unlisted fields are
/// not validated.
#[macro_export]
macro_rules! tagged {
    ($ty:ty { $($field:ident => $rules:expr),* $(,)? }) => {
        impl $crate::Tagged for $ty {
            fn fields(
                &self,
            ) -> ::std::result::Result<::std::vec::Vec<$crate::FieldDescriptor>, $crate::RuleError>
            {
                ::std::result::Result::Ok(::std::vec![
                    $($crate::FieldDescriptor::new(
                        ::std::stringify!($field),
                        $rules,
                        &self.$field,
                    )?,)*
                ])
            }
        }
    };
}
