use crate::{
    arguments::ValidatorRc,
    call::InterceptedCall,
    fake::FakeObject,
    matcher::{AnyCallMatcher, CallMatcher},
    rules::{CallRule, ConfigurableRule, RuleBehavior},
    typesystem::TypeRc,
    Error::ArgumentConstraintsNotSupported,
    Result,
};

/// Applies to every call made to the fake, optionally only to calls of members returning a
/// given type
#[derive(Default)]
pub struct AnyCallRule {
    matcher: AnyCallMatcher,
    behavior: RuleBehavior,
}

impl AnyCallRule {
    /// Create a rule applying to every call
    pub fn new() -> Self {
        AnyCallRule::default()
    }

    /// Only apply to calls of members returning `return_type`
    #[must_use]
    pub fn with_return_type(mut self, return_type: &TypeRc) -> Self {
        self.matcher.set_return_type(return_type);
        self
    }
}

impl ConfigurableRule for AnyCallRule {
    fn behavior_mut(&mut self) -> &mut RuleBehavior {
        &mut self.behavior
    }

    /// Always fails, the rule does not look at individual arguments
    fn with_argument_validators(self, _validators: Vec<ValidatorRc>) -> Result<Self> {
        Err(ArgumentConstraintsNotSupported(self.matcher.describe()))
    }
}

impl CallRule for AnyCallRule {
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
