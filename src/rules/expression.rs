use crate::{
    arguments::ValidatorRc,
    call::InterceptedCall,
    fake::FakeObject,
    matcher::{CallMatcher, ExpressionCallMatcher},
    rules::{CallRule, ConfigurableRule, RuleBehavior},
    typesystem::MethodRc,
    Result, Value,
};

/// Applies to calls of a method whose arguments are accepted by per-argument validators
///
/// Validators and call arguments are paired by position; a rule whose validator count differs
/// from the call's argument count never applies.
pub struct ExpressionRule {
    matcher: ExpressionCallMatcher,
    behavior: RuleBehavior,
}

impl ExpressionRule {
    /// Create a rule from a matcher
    pub fn new(matcher: ExpressionCallMatcher) -> Self {
        ExpressionRule {
            matcher,
            behavior: RuleBehavior::default(),
        }
    }

    /// Create a rule for calls of `method` whose arguments equal `values`
    pub fn with_values(method: &MethodRc, values: Vec<Value>) -> Self {
        Self::new(ExpressionCallMatcher::with_values(method, values))
    }

    /// Create a rule for all calls of `method`
    pub fn ignoring_arguments(method: &MethodRc) -> Self {
        Self::new(ExpressionCallMatcher::ignoring_arguments(method))
    }

    /// The matcher deciding applicability
    pub fn matcher(&self) -> &ExpressionCallMatcher {
        &self.matcher
    }
}

impl ConfigurableRule for ExpressionRule {
    fn behavior_mut(&mut self) -> &mut RuleBehavior {
        &mut self.behavior
    }

    fn with_argument_validators(mut self, validators: Vec<ValidatorRc>) -> Result<Self> {
        self.matcher.set_validators(validators);
        Ok(self)
    }
}

impl CallRule for ExpressionRule {
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
