use std::sync::Arc;

use crate::{
    arguments::ValidatorRc,
    call::InterceptedCall,
    fake::FakeObject,
    matcher::{CallMatcher, PredicateCallMatcher},
    rules::{CallRule, ConfigurableRule, RuleBehavior},
    typesystem::MethodRc,
    Result, Value,
};

/// Applies to calls of a method whose full argument list satisfies a predicate
pub struct PredicateRule {
    method: MethodRc,
    matcher: PredicateCallMatcher,
    behavior: RuleBehavior,
}

impl PredicateRule {
    /// Create a new rule
    ///
    /// ## Arguments
    /// * 'method'      - The method calls must resolve to
    /// * 'predicate'   - Check over the full argument list
    /// * 'description' - Description of the predicate
    pub fn new<F>(method: &MethodRc, predicate: F, description: &str) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        PredicateRule {
            method: method.clone(),
            matcher: PredicateCallMatcher::new(method, predicate, description),
            behavior: RuleBehavior::default(),
        }
    }
}

impl ConfigurableRule for PredicateRule {
    fn behavior_mut(&mut self) -> &mut RuleBehavior {
        &mut self.behavior
    }

    /// Replaces the predicate with one requiring every validator to accept its argument
    fn with_argument_validators(mut self, validators: Vec<ValidatorRc>) -> Result<Self> {
        let description = validators
            .iter()
            .map(|validator| validator.describe())
            .collect::<Vec<_>>()
            .join(", ");
        let validators = Arc::new(validators);

        self.matcher = PredicateCallMatcher::new(
            &self.method,
            move |arguments| {
                arguments.len() == validators.len()
                    && validators
                        .iter()
                        .zip(arguments.iter())
                        .all(|(validator, argument)| validator.validate(argument))
            },
            &description,
        );
        Ok(self)
    }
}

impl CallRule for PredicateRule {
    fn is_applicable_to(&self, call: &InterceptedCall, fake: &FakeObject) -> bool {
        self.matcher.matches(call, fake.resolver()) && self.behavior.conditions_hold(call)
    }

    fn apply(&self, call: &mut InterceptedCall, _fake: &FakeObject) -> Result<()> {
        self.behavior.apply(call)
    }

    fn remaining_uses(&self) -> Option<u32> {
        self.behavior.uses()
    }

    fn describe(&self) -> String {
        self.behavior.describe_conditions(self.matcher.describe())
    }
}
