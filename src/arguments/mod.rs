//! Argument validators and their combinators.
//!
//! An [`ArgumentValidator`] is a named predicate over a single argument [`Value`]. Rules and
//! call matchers pair one validator with each parameter of the configured method; a call
//! matches only if every validator accepts the argument in the same position.
//!
//! Validators are pure: validating never has side effects, and the description is computed
//! once, when the validator is created, so diagnostics never re-run a predicate.
//!
//! # Key Components
//!
//! - [`equal_to`] - Structural equality to a captured value, the default for plain arguments
//! - [`ignored`] - Accepts anything
//! - [`matches`] - A custom predicate with a description
//! - [`instance_of`] - Accepts instances of a type
//! - [`not`], [`and`], [`or`] - Combinators, also available through [`ValidatorExt`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use fakescope::arguments::{self, ValidatorExt};
//! use fakescope::Value;
//!
//! let positive_even = arguments::greater_than(0)
//!     .and(arguments::matches(|v| v.as_int().is_some_and(|i| i % 2 == 0), "even"));
//!
//! assert!(positive_even.validate(&Value::from(4)));
//! assert!(!positive_even.validate(&Value::from(3)));
//! assert_eq!(positive_even.describe(), "greater than 0 and (even)");
//! ```

mod combinators;
mod validators;

use std::sync::Arc;

use crate::Value;

pub use combinators::{and, not, or, ValidatorExt};
pub use validators::{
    contains, equal_to, greater_than, ignored, instance_of, is_not_null, is_null, less_than,
    matches, same_sequence_as, starts_with,
};

/// Reference to an `ArgumentValidator`
pub type ValidatorRc = Arc<dyn ArgumentValidator>;

/// A named predicate over a single argument value
pub trait ArgumentValidator: Send + Sync {
    /// Checks if `value` is accepted
    fn validate(&self, value: &Value) -> bool;

    /// A stable, human readable description used in diagnostics
    fn describe(&self) -> String;
}

/// Converts plain values into equality validators, so matchers accept both
pub trait IntoValidator {
    /// Convert into a shared validator
    fn into_validator(self) -> ValidatorRc;
}

impl IntoValidator for ValidatorRc {
    fn into_validator(self) -> ValidatorRc {
        self
    }
}

impl IntoValidator for Value {
    fn into_validator(self) -> ValidatorRc {
        equal_to(self)
    }
}
