//! Integer bound checks.
//!
//! Only integral JSON numbers qualify; floats, strings and other kinds fail.

use super::integer;
use crate::outcome::ValidationError;

crate::check! {
    /// Passes when the integer is at least `min`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub Min { min: i64 };
    rule(self, value) { integer(value).is_some_and(|n| n >= self.min) }
    error(self) {
        ValidationError::new("min", format!("Minimum is {}", self.min))
            .with_param("min", self.min.to_string())
    }
}

crate::check! {
    /// Passes when the integer is at most `max`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub Max { max: i64 };
    rule(self, value) { integer(value).is_some_and(|n| n <= self.max) }
    error(self) {
        ValidationError::new("max", format!("Maximum is {}", self.max))
            .with_param("max", self.max.to_string())
    }
}

crate::check! {
    /// Passes when the integer lies in `min..=max`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub Range { min: i64, max: i64 };
    rule(self, value) { integer(value).is_some_and(|n| (self.min..=self.max).contains(&n)) }
    error(self) {
        ValidationError::new("range", format!("Range is {} to {}", self.min, self.max))
            .with_param("min", self.min.to_string())
            .with_param("max", self.max.to_string())
    }
}
