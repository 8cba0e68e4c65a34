//! Call rules: configured behaviors for calls to fakes.
//!
//! A [`CallRule`] decides whether it applies to an intercepted call and, if selected,
//! mutates the call record: sets the return value, raises an exception, writes out and ref
//! parameters, or requests the base implementation.
//!
//! # Rule Kinds
//!
//! User rules, configured through [`ConfigurableRule`]:
//! - [`ExpressionRule`] - A method plus one argument validator per parameter
//! - [`PredicateRule`] - A method plus a predicate over the full argument list
//! - [`AnyCallRule`] - Every call, optionally narrowed by return type
//!
//! Fallback rules, present on every fake and consulted after all user rules:
//! - [`ObjectMemberRule`] - `Equals`, `GetHashCode` and `ToString` reporting fake identity
//! - [`AutoFakePropertyRule`] - Materializes a fake for unconfigured fakeable property getters
//! - [`PropertySetterRule`] - Remembers values written to properties
//! - [`DefaultReturnValueRule`] - The final fallback for unconfigured calls
//!
//! [`PropertyBehaviorRule`] is the single-value getter/setter rule the property fallbacks
//! install.
//!
//! # Use Counting
//!
//! A rule reports its initial use bound through [`CallRule::remaining_uses`]. The fake owning
//! the rule tracks the remaining count and skips rules that are exhausted; the rule itself is
//! never mutated by resolution.

mod any_call;
mod behavior;
mod default;
mod expression;
mod object_member;
mod predicate;
mod property;

use std::sync::Arc;

use crate::{call::InterceptedCall, fake::FakeObject, Result};

pub use any_call::AnyCallRule;
pub use behavior::{
    CallAction, CallCallback, CallPredicate, ConfigurableRule, ExceptionFactory,
    OutAndRefValues, RuleBehavior, ValueFactory, ValuesFactory,
};
pub use default::DefaultReturnValueRule;
pub use expression::ExpressionRule;
pub use object_member::ObjectMemberRule;
pub use predicate::PredicateRule;
pub use property::{AutoFakePropertyRule, PropertyBehaviorRule, PropertySetterRule};

/// Reference to a `CallRule`
pub type CallRuleRc = Arc<dyn CallRule>;

/// A configured behavior for calls to a fake
pub trait CallRule: Send + Sync {
    /// Checks if the rule applies to `call`, made to `fake`
    fn is_applicable_to(&self, call: &InterceptedCall, fake: &FakeObject) -> bool;

    /// Apply the rule to `call`
    ///
    /// # Errors
    /// Returns a configuration error if the rule is inconsistent with the call
    fn apply(&self, call: &mut InterceptedCall, fake: &FakeObject) -> Result<()>;

    /// Number of times the rule may apply, `None` for unlimited
    fn remaining_uses(&self) -> Option<u32> {
        None
    }

    /// Description used in logs
    fn describe(&self) -> String;
}
