use std::sync::Arc;

use crate::{
    arguments::ValidatorRc,
    call::{FakeException, FakeObjectCall, InterceptedCall},
    Error::OutAndRefCountMismatch,
    Result, Value,
};

/// Side effect run against a call before the rule's action
pub type CallCallback = Arc<dyn Fn(&dyn FakeObjectCall) + Send + Sync>;
/// Additional applicability condition of a rule
pub type CallPredicate = Arc<dyn Fn(&dyn FakeObjectCall) -> bool + Send + Sync>;
/// Computes a return value from the call
pub type ValueFactory = Arc<dyn Fn(&dyn FakeObjectCall) -> Value + Send + Sync>;
/// Computes out and ref parameter values from the call
pub type ValuesFactory = Arc<dyn Fn(&dyn FakeObjectCall) -> Vec<Value> + Send + Sync>;
/// Computes an exception from the call
pub type ExceptionFactory = Arc<dyn Fn(&dyn FakeObjectCall) -> FakeException + Send + Sync>;

/// What a rule does with a call it applies to
#[derive(Clone)]
pub enum CallAction {
    /// Return a fixed value
    Return(Value),
    /// Return a value computed from the call
    ReturnLazily(ValueFactory),
    /// Raise a fixed exception
    Throw(FakeException),
    /// Raise an exception computed from the call
    ThrowLazily(ExceptionFactory),
    /// Return the default value of the member's return type
    DoNothing,
    /// Delegate to the base implementation
    CallBaseMethod,
}

/// Values written to the out and ref parameters of a call
#[derive(Clone)]
pub enum OutAndRefValues {
    /// Fixed values, one per out/ref parameter in declaration order
    Fixed(Vec<Value>),
    /// Values computed from the call
    Lazily(ValuesFactory),
}

/// The configurable behavior shared by all user rules
///
/// Applying a behavior runs, in order: the registered callbacks, the action, the assignment
/// of out and ref parameter values.
#[derive(Clone, Default)]
pub struct RuleBehavior {
    callbacks: Vec<CallCallback>,
    action: Option<CallAction>,
    out_and_ref: Option<OutAndRefValues>,
    conditions: Vec<(CallPredicate, String)>,
    uses: Option<u32>,
}

impl RuleBehavior {
    /// The configured action
    pub fn action(&self) -> Option<&CallAction> {
        self.action.as_ref()
    }

    /// Replace the action
    pub fn set_action(&mut self, action: CallAction) {
        self.action = Some(action);
    }

    /// Set the action unless one is configured already
    pub fn set_default_action(&mut self, action: CallAction) {
        if self.action.is_none() {
            self.action = Some(action);
        }
    }

    /// Append a callback
    pub fn add_callback(&mut self, callback: CallCallback) {
        self.callbacks.push(callback);
    }

    /// Replace the out and ref values
    pub fn set_out_and_ref(&mut self, values: OutAndRefValues) {
        self.out_and_ref = Some(values);
    }

    /// Append an applicability condition
    pub fn add_condition(&mut self, condition: CallPredicate, description: &str) {
        self.conditions.push((condition, description.to_string()));
    }

    /// Bound the number of times the rule applies, `None` for unlimited
    pub fn set_uses(&mut self, uses: Option<u32>) {
        self.uses = uses;
    }

    /// The configured use bound
    pub fn uses(&self) -> Option<u32> {
        self.uses
    }

    /// Checks all conditions added through [`ConfigurableRule::when`]
    pub fn conditions_hold(&self, call: &dyn FakeObjectCall) -> bool {
        self.conditions.iter().all(|(condition, _)| condition(call))
    }

    /// Appends the condition descriptions to a rule description
    pub fn describe_conditions(&self, description: String) -> String {
        self.conditions
            .iter()
            .fold(description, |acc, (_, condition)| {
                format!("{} where {}", acc, condition)
            })
    }

    /// Apply the behavior to `call`
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] if no action is configured or the base
    /// implementation of an abstract member is requested, and
    /// [`crate::Error::OutAndRefCountMismatch`] if the number of out and ref values does not
    /// match the method's out and ref parameters
    pub fn apply(&self, call: &mut InterceptedCall) -> Result<()> {
        for callback in &self.callbacks {
            callback(&*call);
        }

        match &self.action {
            None => {
                return Err(config_error!(
                    "No action configured for the call {}",
                    call.description()
                ))
            }
            Some(CallAction::Return(value)) => call.set_return_value(value.clone()),
            Some(CallAction::ReturnLazily(factory)) => {
                let value = factory(&*call);
                call.set_return_value(value);
            }
            Some(CallAction::Throw(exception)) => call.set_exception(exception.clone()),
            Some(CallAction::ThrowLazily(factory)) => {
                let exception = factory(&*call);
                call.set_exception(exception);
            }
            Some(CallAction::DoNothing) => {
                if let Some(default) = call
                    .method()
                    .return_type()
                    .and_then(|return_type| return_type.default_value())
                {
                    call.set_return_value(default);
                }
            }
            Some(CallAction::CallBaseMethod) => {
                if call.method().is_abstract() {
                    return Err(config_error!(
                        "The base implementation of the abstract member {} can not be called",
                        call.method().fullname()
                    ));
                }
                call.set_call_base_method(true);
            }
        }

        if let Some(out_and_ref) = &self.out_and_ref {
            let values = match out_and_ref {
                OutAndRefValues::Fixed(values) => values.clone(),
                OutAndRefValues::Lazily(factory) => factory(&*call),
            };

            let indices = call.method().out_and_ref_indices();
            if indices.len() != values.len() {
                return Err(OutAndRefCountMismatch {
                    expected: indices.len(),
                    actual: values.len(),
                });
            }

            for (index, value) in indices.into_iter().zip(values) {
                call.set_argument(index, value)?;
            }
        }

        Ok(())
    }
}

/// Fluent configuration shared by all user rules
///
/// # Examples
///
/// ```rust,no_run
/// use fakescope::prelude::*;
///
/// # fn configure(bar: &fakescope::typesystem::MethodRc) {
/// let rule = ExpressionRule::ignoring_arguments(bar)
///     .invokes(|call| println!("called with {:?}", call.arguments()))
///     .returns(42)
///     .once();
/// # }
/// ```
pub trait ConfigurableRule: Sized {
    /// Mutable access to the behavior
    fn behavior_mut(&mut self) -> &mut RuleBehavior;

    /// Replace the per-argument validators
    ///
    /// # Errors
    /// Returns [`crate::Error::ArgumentConstraintsNotSupported`] for rules that match without
    /// looking at individual arguments
    fn with_argument_validators(self, validators: Vec<ValidatorRc>) -> Result<Self>;

    /// Return `value`
    #[must_use]
    fn returns(mut self, value: impl Into<Value>) -> Self {
        self.behavior_mut()
            .set_action(CallAction::Return(value.into()));
        self
    }

    /// Return the value `factory` computes from the call
    #[must_use]
    fn returns_lazily<F>(mut self, factory: F) -> Self
    where
        F: Fn(&dyn FakeObjectCall) -> Value + Send + Sync + 'static,
    {
        self.behavior_mut()
            .set_action(CallAction::ReturnLazily(Arc::new(factory)));
        self
    }

    /// Raise `exception`
    #[must_use]
    fn throws(mut self, exception: FakeException) -> Self {
        self.behavior_mut().set_action(CallAction::Throw(exception));
        self
    }

    /// Raise the exception `factory` computes from the call
    #[must_use]
    fn throws_lazily<F>(mut self, factory: F) -> Self
    where
        F: Fn(&dyn FakeObjectCall) -> FakeException + Send + Sync + 'static,
    {
        self.behavior_mut()
            .set_action(CallAction::ThrowLazily(Arc::new(factory)));
        self
    }

    /// Return the default value of the member's return type
    #[must_use]
    fn does_nothing(mut self) -> Self {
        self.behavior_mut().set_action(CallAction::DoNothing);
        self
    }

    /// Delegate to the base implementation
    #[must_use]
    fn calls_base_method(mut self) -> Self {
        self.behavior_mut().set_action(CallAction::CallBaseMethod);
        self
    }

    /// Run `callback` before the action. Callbacks run in registration order
    #[must_use]
    fn invokes<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn FakeObjectCall) + Send + Sync + 'static,
    {
        let behavior = self.behavior_mut();
        behavior.add_callback(Arc::new(callback));
        behavior.set_default_action(CallAction::DoNothing);
        self
    }

    /// Write `values` to the out and ref parameters, in declaration order
    #[must_use]
    fn assigns_out_and_ref_parameters(mut self, values: Vec<Value>) -> Self {
        let behavior = self.behavior_mut();
        behavior.set_out_and_ref(OutAndRefValues::Fixed(values));
        behavior.set_default_action(CallAction::DoNothing);
        self
    }

    /// Write the values `factory` computes to the out and ref parameters
    #[must_use]
    fn assigns_out_and_ref_parameters_lazily<F>(mut self, factory: F) -> Self
    where
        F: Fn(&dyn FakeObjectCall) -> Vec<Value> + Send + Sync + 'static,
    {
        let behavior = self.behavior_mut();
        behavior.set_out_and_ref(OutAndRefValues::Lazily(Arc::new(factory)));
        behavior.set_default_action(CallAction::DoNothing);
        self
    }

    /// Only apply to calls for which `condition` holds
    #[must_use]
    fn when<F>(mut self, condition: F, description: &str) -> Self
    where
        F: Fn(&dyn FakeObjectCall) -> bool + Send + Sync + 'static,
    {
        self.behavior_mut()
            .add_condition(Arc::new(condition), description);
        self
    }

    /// Apply at most `uses` times
    #[must_use]
    fn times(mut self, uses: u32) -> Self {
        self.behavior_mut().set_uses(Some(uses));
        self
    }

    /// Apply at most once
    #[must_use]
    fn once(self) -> Self {
        self.times(1)
    }

    /// Apply at most twice
    #[must_use]
    fn twice(self) -> Self {
        self.times(2)
    }
}
