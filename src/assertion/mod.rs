//! Assertions over recorded calls.
//!
//! [`FakeAsserter`] counts the calls accepted by a call predicate and checks the count
//! against a repeat predicate. [`Repeated`] bundles the common repeat predicates with their
//! descriptions. On failure the rendered diagnostic names the expected call, the expectation
//! and the actual count, followed by the listing of all calls the assertion looked at (see
//! [`crate::call::CallWriter`]).
//!
//! Most code asserts through [`crate::FakeObject::assert_was_called`], which evaluates a
//! [`crate::matcher::CallMatcher`] over the calls visible in the current scope.

mod asserter;
mod repeat;

pub use asserter::FakeAsserter;
pub use repeat::{RepeatPredicate, Repeated};
