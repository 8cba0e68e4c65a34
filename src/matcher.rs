//! Call matchers shared by rules and assertions.
//!
//! A [`CallMatcher`] decides whether a call made to a fake is "the call" a configuration or an
//! assertion talks about. Rules use matchers to decide applicability, assertions use the same
//! matchers to count calls in the history, so a call that a rule applies to is always a call
//! the equivalent assertion counts.
//!
//! # Key Components
//!
//! - [`ExpressionCallMatcher`] - A method plus one [`crate::arguments::ArgumentValidator`] per
//!   parameter
//! - [`PredicateCallMatcher`] - A method plus a predicate over the full argument list
//! - [`AnyCallMatcher`] - Every call, optionally narrowed by return type

use std::sync::Arc;

use crate::{
    arguments::{ignored, IntoValidator, ValidatorRc},
    call::{generic_suffix, FakeObjectCall},
    typesystem::{MethodRc, MethodResolver, TypeRc},
    Value,
};

/// Decides if a call is matched by a configured call pattern
pub trait CallMatcher: Send + Sync {
    /// Checks if `call` matches, resolving method identities with `resolver`
    fn matches(&self, call: &dyn FakeObjectCall, resolver: &MethodResolver) -> bool;

    /// Description of the matched call, used in diagnostics
    fn describe(&self) -> String;
}

/// Predicate over the full argument list of a call
pub type ArgumentsPredicate = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;

fn method_matches(call: &dyn FakeObjectCall, method: &MethodRc, resolver: &MethodResolver) -> bool {
    resolver.equivalent(call.receiver().object_type(), call.method(), method)
}

/// Matches calls to a method whose arguments are each accepted by a validator
pub struct ExpressionCallMatcher {
    method: MethodRc,
    validators: Vec<ValidatorRc>,
}

impl ExpressionCallMatcher {
    /// Create a matcher from a method and one validator per parameter
    ///
    /// A matcher whose validator count differs from the call's argument count never matches.
    pub fn new(method: &MethodRc, validators: Vec<ValidatorRc>) -> Self {
        ExpressionCallMatcher {
            method: method.clone(),
            validators,
        }
    }

    /// Create a matcher that requires each argument to equal the given value
    pub fn with_values(method: &MethodRc, values: Vec<Value>) -> Self {
        Self::new(method, values.into_iter().map(IntoValidator::into_validator).collect())
    }

    /// Create a matcher that accepts any arguments
    pub fn ignoring_arguments(method: &MethodRc) -> Self {
        Self::new(method, method.params.iter().map(|_| ignored()).collect())
    }

    /// The configured method
    pub fn method(&self) -> &MethodRc {
        &self.method
    }

    /// The configured validators, in parameter order
    pub fn validators(&self) -> &[ValidatorRc] {
        &self.validators
    }

    /// Replace the validators
    pub fn set_validators(&mut self, validators: Vec<ValidatorRc>) {
        self.validators = validators;
    }
}

impl CallMatcher for ExpressionCallMatcher {
    fn matches(&self, call: &dyn FakeObjectCall, resolver: &MethodResolver) -> bool {
        let arguments = call.arguments();
        if arguments.len() != self.validators.len() {
            return false;
        }

        method_matches(call, &self.method, resolver)
            && self
                .validators
                .iter()
                .zip(arguments.iter())
                .all(|(validator, argument)| validator.validate(argument))
    }

    fn describe(&self) -> String {
        let arguments = self
            .method
            .params
            .iter()
            .zip(self.validators.iter())
            .map(|(param, validator)| format!("{}: {}", param.name, validator.describe()))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{}{}({})",
            self.method.fullname(),
            generic_suffix(&self.method),
            arguments
        )
    }
}

/// Matches calls to a method whose argument list satisfies a predicate
pub struct PredicateCallMatcher {
    method: MethodRc,
    predicate: ArgumentsPredicate,
    description: String,
}

impl PredicateCallMatcher {
    /// Create a new matcher
    ///
    /// ## Arguments
    /// * 'method'      - The method calls must resolve to
    /// * 'predicate'   - Check over the full argument list
    /// * 'description' - Description of the predicate, shown in place of the arguments
    pub fn new<F>(method: &MethodRc, predicate: F, description: &str) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        PredicateCallMatcher {
            method: method.clone(),
            predicate: Arc::new(predicate),
            description: description.to_string(),
        }
    }
}

impl CallMatcher for PredicateCallMatcher {
    fn matches(&self, call: &dyn FakeObjectCall, resolver: &MethodResolver) -> bool {
        method_matches(call, &self.method, resolver) && (self.predicate)(call.arguments())
    }

    fn describe(&self) -> String {
        format!(
            "{}{}(<{}>)",
            self.method.fullname(),
            generic_suffix(&self.method),
            self.description
        )
    }
}

/// Matches every call, optionally only calls to members with a given return type
#[derive(Default)]
pub struct AnyCallMatcher {
    return_type: Option<TypeRc>,
}

impl AnyCallMatcher {
    /// Match every call
    pub fn new() -> Self {
        AnyCallMatcher { return_type: None }
    }

    /// Match calls to members returning `return_type`
    pub fn with_return_type(return_type: &TypeRc) -> Self {
        AnyCallMatcher {
            return_type: Some(return_type.clone()),
        }
    }

    /// Narrow the matcher to calls returning `return_type`
    pub fn set_return_type(&mut self, return_type: &TypeRc) {
        self.return_type = Some(return_type.clone());
    }
}

impl CallMatcher for AnyCallMatcher {
    fn matches(&self, call: &dyn FakeObjectCall, _resolver: &MethodResolver) -> bool {
        match &self.return_type {
            None => true,
            Some(expected) => call
                .method()
                .return_type()
                .is_some_and(|actual| actual.token == expected.token),
        }
    }

    fn describe(&self) -> String {
        match &self.return_type {
            None => "Any call made to the fake object.".to_string(),
            Some(expected) => format!(
                "Any call with return type {} to the fake object.",
                expected.fullname()
            ),
        }
    }
}
