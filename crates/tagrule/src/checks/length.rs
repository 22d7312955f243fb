//! Size checks.
//!
//! Strings are measured in Unicode scalar values (chars); arrays and objects
//! by element count. Other kinds fail.

use super::size;
use crate::outcome::ValidationError;

crate::check! {
    /// Passes when the size is at least `min`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub MinLen { min: i64 };
    rule(self, value) { size(value).is_some_and(|n| n >= self.min) }
    error(self) {
        ValidationError::new("min_len", format!("Minimum length is {}", self.min))
            .with_param("min", self.min.to_string())
    }
}

crate::check! {
    /// Passes when the size is at most `max`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub MaxLen { max: i64 };
    rule(self, value) { size(value).is_some_and(|n| n <= self.max) }
    error(self) {
        ValidationError::new("max_len", format!("Maximum length is {}", self.max))
            .with_param("max", self.max.to_string())
    }
}

crate::check! {
    /// Passes when the size is exactly `length`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub Length { length: i64 };
    rule(self, value) { size(value) == Some(self.length) }
    error(self) {
        ValidationError::new("length", format!("Required length is {}", self.length))
            .with_param("length", self.length.to_string())
    }
}
