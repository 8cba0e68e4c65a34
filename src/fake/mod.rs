//! Fake objects: the rule list and call history of one faked instance.
//!
//! A [`FakeObject`] is created for a fakeable type (an interface or a non-sealed class). The
//! interception layer hands every call made to the faked instance to
//! [`FakeObject::intercept`], which resolves the rule to apply, applies it, and records the
//! completed call.
//!
//! # Rule Resolution
//!
//! 1. User rules, most recently added first. Rules with no remaining uses are skipped, the
//!    selected rule's use count is decremented.
//! 2. The fallbacks present on every fake: [`ObjectMemberRule`], [`AutoFakePropertyRule`],
//!    [`PropertySetterRule`].
//! 3. [`DefaultReturnValueRule`].
//!
//! An unmatched call is never an error. Errors only come from applying an inconsistently
//! configured rule; the call is recorded regardless.
//!
//! # Scoping
//!
//! Rules added through [`FakeObject::add_rule`] and [`FakeObject::add_rule_last`] are owned
//! by the current [`FakeScope`] and removed when it is disposed. Calls are recorded in the
//! fake's history and in the current scope, see [`FakeObject::calls_in_scope`].
//!
//! # Concurrency
//!
//! The rule list and history are guarded so a fake can be shared between threads, but rule
//! resolution of concurrent calls to the same fake is not atomic: two threads can observe
//! the same rule before either consumes a use. A fake is meant to be driven by one test
//! thread at a time.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fakescope::prelude::*;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let int32 = registry.primitive(ValueKind::Int)?;
//! let calculator = TypeBuilder::interface(&registry, "Demo", "ICalculator")
//!     .method(MethodBuilder::new("Add").with_param("a", &int32).with_param("b", &int32).with_return(&int32))
//!     .build()?;
//! let add = calculator.method_by_name("Add").expect("declared above");
//!
//! let fake = FakeObject::new(&registry, &calculator)?;
//! fake.add_rule(ExpressionRule::with_values(&add, vec![Value::from(1), Value::from(2)]).returns(3));
//!
//! let call = fake.invoke(&add, vec![Value::from(1), Value::from(2)])?;
//! assert_eq!(call.return_value(), Some(&Value::from(3)));
//! fake.assert_was_called(&ExpressionCallMatcher::ignoring_arguments(&add), Repeated::once())?;
//! # Ok::<(), fakescope::Error>(())
//! ```

mod arena;
mod listener;

use std::{
    fmt,
    sync::{Arc, Mutex, RwLock},
};

use crate::{
    assertion::{FakeAsserter, Repeated},
    call::{CompletedCallRc, FakeObjectCall, InterceptedCall},
    config::FakeConfig,
    matcher::CallMatcher,
    rules::{
        AutoFakePropertyRule, CallRule, CallRuleRc, DefaultReturnValueRule, ObjectMemberRule,
        PropertySetterRule,
    },
    scope::FakeScope,
    typesystem::{MethodRc, MethodResolver, TypeRc, TypeRegistry},
    Error::TypeError,
    ObjectRef, Result, Value,
};

pub(crate) use arena::RuleArena;
pub use arena::RuleId;
pub use listener::InterceptionListener;

/// Reference to a `FakeObject`
pub type FakeObjectRc = Arc<FakeObject>;

/// The rule list and call history of one faked instance
pub struct FakeObject {
    object: ObjectRef,
    fake_type: TypeRc,
    registry: Arc<TypeRegistry>,
    config: FakeConfig,
    rules: Mutex<RuleArena>,
    fallback_rules: Vec<CallRuleRc>,
    default_rule: CallRuleRc,
    recorded_calls: boxcar::Vec<CompletedCallRc>,
    listeners: RwLock<Vec<Arc<dyn InterceptionListener>>>,
}

impl FakeObject {
    /// Create a fake of `fake_type` with the default configuration
    ///
    /// ## Arguments
    /// * 'registry'  - The registry owning `fake_type`
    /// * 'fake_type' - The faked type, an interface or a non-sealed class
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] if `fake_type` can not be faked
    pub fn new(registry: &Arc<TypeRegistry>, fake_type: &TypeRc) -> Result<FakeObjectRc> {
        Self::with_config(registry, fake_type, FakeConfig::default())
    }

    /// Create a fake of `fake_type` with the given configuration
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] if `fake_type` can not be faked
    pub fn with_config(
        registry: &Arc<TypeRegistry>,
        fake_type: &TypeRc,
        config: FakeConfig,
    ) -> Result<FakeObjectRc> {
        if !fake_type.is_fakeable() {
            return Err(TypeError(format!(
                "The type {} can not be faked, only interfaces and non-sealed classes can",
                fake_type.fullname()
            )));
        }

        let fake = Arc::new_cyclic(|weak| FakeObject {
            object: ObjectRef::for_fake(fake_type, weak.clone()),
            fake_type: fake_type.clone(),
            registry: registry.clone(),
            config,
            rules: Mutex::new(RuleArena::default()),
            fallback_rules: vec![
                Arc::new(ObjectMemberRule),
                Arc::new(AutoFakePropertyRule),
                Arc::new(PropertySetterRule),
            ],
            default_rule: Arc::new(DefaultReturnValueRule),
            recorded_calls: boxcar::Vec::new(),
            listeners: RwLock::new(Vec::new()),
        });

        log::debug!(
            "Created fake {} of {}",
            fake.object.id(),
            fake_type.fullname()
        );
        Ok(fake)
    }

    /// The fake behind `value`, if `value` references a live fake
    pub fn from_value(value: &Value) -> Option<FakeObjectRc> {
        value.as_object().and_then(ObjectRef::fake)
    }

    /// The faked instance
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// The faked instance as a value, e.g. to return it from another fake
    pub fn as_value(&self) -> Value {
        Value::Object(self.object.clone())
    }

    /// The instance id of the faked instance
    pub fn id(&self) -> u64 {
        self.object.id()
    }

    /// The faked type
    pub fn fake_type(&self) -> &TypeRc {
        &self.fake_type
    }

    /// The registry owning the faked type
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The configuration this fake was created with
    pub fn config(&self) -> FakeConfig {
        self.config
    }

    /// The method resolver shared by all fakes of the registry
    pub fn resolver(&self) -> &MethodResolver {
        self.registry.resolver()
    }

    /// Add a rule with priority over all existing rules
    ///
    /// The rule is owned by the current scope and removed when that scope is disposed.
    pub fn add_rule<R: CallRule + 'static>(&self, rule: R) -> RuleId {
        self.add_rule_rc(Arc::new(rule))
    }

    /// Add a shared rule with priority over all existing rules
    pub fn add_rule_rc(&self, rule: CallRuleRc) -> RuleId {
        let description = rule.describe();
        let id = lock!(self.rules).push_front(rule);
        self.register_in_scope(id, &description);
        id
    }

    /// Add a rule with lower priority than all existing user rules
    ///
    /// The rule still has priority over the fallback rules. It is owned by the current scope.
    pub fn add_rule_last<R: CallRule + 'static>(&self, rule: R) -> RuleId {
        let rule: CallRuleRc = Arc::new(rule);
        let description = rule.describe();
        let id = lock!(self.rules).push_back(rule);
        self.register_in_scope(id, &description);
        id
    }

    /// Add a rule that no scope owns, it lives until removed explicitly
    pub(crate) fn add_rule_unscoped(&self, rule: CallRuleRc) -> RuleId {
        lock!(self.rules).push_front(rule)
    }

    fn register_in_scope(&self, id: RuleId, description: &str) {
        let scope = FakeScope::current();
        scope.register_rule(self.object.downgrade_fake(), id);
        log::debug!(
            "Added rule '{}' to fake {} in scope {}",
            description,
            self.object.id(),
            scope.id()
        );
    }

    /// Remove a rule, returns false if it was already removed
    pub fn remove_rule(&self, id: RuleId) -> bool {
        lock!(self.rules).remove(id)
    }

    /// True if the rule has not been removed
    pub fn has_rule(&self, id: RuleId) -> bool {
        lock!(self.rules).contains(id)
    }

    /// Remaining uses of a rule, `None` for unlimited or removed rules
    pub fn remaining_uses(&self, id: RuleId) -> Option<u32> {
        lock!(self.rules).remaining_uses(id)
    }

    /// Number of rules on this fake, exhausted and property rules included
    pub fn rule_count(&self) -> usize {
        lock!(self.rules).len()
    }

    /// Remove all rules, property values included
    pub fn clear_configuration(&self) {
        lock!(self.rules).clear();
    }

    /// Add a listener observing every intercepted call
    pub fn add_interception_listener(&self, listener: Arc<dyn InterceptionListener>) {
        write_lock!(self.listeners).push(listener);
    }

    /// Select the rule to apply to `call` and consume one of its uses
    fn resolve(&self, call: &InterceptedCall) -> CallRuleRc {
        loop {
            let active = lock!(self.rules).active();
            let selected = active.into_iter().find(|(_, rule)| {
                let applicable = rule.is_applicable_to(call, self);
                log::trace!(
                    "Rule '{}' {} to {}",
                    rule.describe(),
                    if applicable { "applies" } else { "does not apply" },
                    call.description()
                );
                applicable
            });

            match selected {
                // Rule was exhausted or removed since the snapshot, scan again
                Some((id, rule)) => {
                    if lock!(self.rules).consume(id) {
                        log::debug!(
                            "Selected rule '{}' for {}",
                            rule.describe(),
                            call.description()
                        );
                        return rule;
                    }
                }
                None => break,
            }
        }

        self.fallback_rules
            .iter()
            .find(|rule| rule.is_applicable_to(call, self))
            .unwrap_or(&self.default_rule)
            .clone()
    }

    /// Handle a call trapped by the interception layer
    ///
    /// Resolves and applies the rule, then records the completed call in the history of this
    /// fake and of the current scope. The interception layer reads the return value, the
    /// out/ref arguments, the exception and the base call request back from `call`.
    ///
    /// # Errors
    /// Returns an error if the selected rule is configured inconsistently. The call is
    /// recorded in that case too.
    pub fn intercept(&self, call: &mut InterceptedCall) -> Result<CompletedCallRc> {
        let listeners = read_lock!(self.listeners).clone();
        for listener in &listeners {
            listener.on_before_call(&*call);
        }

        let rule = self.resolve(call);
        let applied = rule.apply(call, self);

        let completed = Arc::new(call.freeze());
        self.recorded_calls.push(completed.clone());
        FakeScope::current().record_call(&completed);

        if !listeners.is_empty() {
            let description = rule.describe();
            for listener in listeners.iter().rev() {
                listener.on_after_call(&completed, &description);
            }
        }

        applied.map(|()| completed)
    }

    /// Create a call of `method` on this fake and intercept it
    ///
    /// # Errors
    /// Returns [`crate::Error::ArgumentCount`] if `arguments` does not fit `method`, and any
    /// error of [`FakeObject::intercept`]
    pub fn invoke(&self, method: &MethodRc, arguments: Vec<Value>) -> Result<CompletedCallRc> {
        let mut call = InterceptedCall::new(&self.object, method, arguments)?;
        self.intercept(&mut call)
    }

    /// The complete call history of this fake, in call order
    pub fn recorded_calls(&self) -> Vec<CompletedCallRc> {
        self.recorded_calls
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// The calls of this fake visible to the current scope, in call order
    pub fn calls_in_scope(&self) -> Vec<CompletedCallRc> {
        FakeScope::current().visible_calls(self)
    }

    /// Assert that the calls matched by `matcher` appear `repeat` times among the calls
    /// visible to the current scope
    ///
    /// # Errors
    /// Returns [`crate::Error::AssertionFailed`] with the rendered diagnostic if the count
    /// does not satisfy `repeat`
    pub fn assert_was_called(&self, matcher: &dyn CallMatcher, repeat: Repeated) -> Result<()> {
        let resolver = self.resolver();
        FakeAsserter::new(self.calls_in_scope())
            .with_max_listed_calls(self.config.max_listed_calls)
            .assert_was_called(
                |call| matcher.matches(call, resolver),
                &matcher.describe(),
                |count| repeat.matches(count),
                repeat.description(),
            )
    }
}

impl fmt::Debug for FakeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeObject")
            .field("id", &self.object.id())
            .field("type", &self.fake_type.fullname())
            .field("config", &self.config)
            .field("rules", &self.rule_count())
            .field("calls", &self.recorded_calls.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        call::CompletedCall,
        matcher::{AnyCallMatcher, ExpressionCallMatcher},
        rules::{AnyCallRule, ConfigurableRule, ExpressionRule},
        test::{create_fake, invoke, test_types},
        Error,
    };

    #[test]
    fn test_most_recent_rule_wins() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");

        fake.add_rule(ExpressionRule::ignoring_arguments(&bar).returns(1));
        fake.add_rule(ExpressionRule::ignoring_arguments(&bar).returns(2));

        let call = invoke(&fake, &bar, vec![Value::from(0)]).unwrap();
        assert_eq!(call.return_value(), Some(&Value::from(2)));
    }

    #[test]
    fn test_add_rule_last() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");

        fake.add_rule(ExpressionRule::ignoring_arguments(&bar).returns(1));
        fake.add_rule_last(ExpressionRule::ignoring_arguments(&bar).returns(2));

        let call = invoke(&fake, &bar, vec![Value::from(0)]).unwrap();
        assert_eq!(call.return_value(), Some(&Value::from(1)));
    }

    #[test]
    fn test_use_count_falls_through() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");

        fake.add_rule(AnyCallRule::new().returns(99));
        let limited = fake.add_rule(ExpressionRule::ignoring_arguments(&bar).returns(1).times(2));

        let results: Vec<Option<Value>> = (0..3)
            .map(|_| {
                invoke(&fake, &bar, vec![Value::from(0)])
                    .unwrap()
                    .return_value()
                    .cloned()
            })
            .collect();

        assert_eq!(
            results,
            vec![Some(Value::from(1)), Some(Value::from(1)), Some(Value::from(99))]
        );
        assert_eq!(fake.remaining_uses(limited), Some(0));
        assert!(fake.has_rule(limited));
    }

    #[test]
    fn test_remove_rule() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");

        let id = fake.add_rule(ExpressionRule::ignoring_arguments(&bar).returns(5));
        assert!(fake.remove_rule(id));
        assert!(!fake.remove_rule(id));

        let call = invoke(&fake, &bar, vec![Value::from(0)]).unwrap();
        assert_eq!(call.return_value(), Some(&Value::Int(0)));
    }

    #[test]
    fn test_clear_configuration() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");

        fake.add_rule(ExpressionRule::ignoring_arguments(&bar).returns(5));
        fake.add_rule(AnyCallRule::new().returns(6));
        fake.clear_configuration();

        assert_eq!(fake.rule_count(), 0);
        let call = invoke(&fake, &bar, vec![Value::from(0)]).unwrap();
        assert_eq!(call.return_value(), Some(&Value::Int(0)));
    }

    #[test]
    fn test_rule_matches_through_receiver_type() {
        let types = test_types();
        let fake = create_fake(&types, &types.derived);
        let interface_bar = types.method(&types.ifoo, "Bar");
        let derived_bar = types.method(&types.derived, "Bar");

        fake.add_rule(ExpressionRule::ignoring_arguments(&interface_bar).returns(7));

        let call = invoke(&fake, &derived_bar, vec![Value::from(0)]).unwrap();
        assert_eq!(call.return_value(), Some(&Value::from(7)));
    }

    #[test]
    fn test_failed_apply_is_recorded() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");

        fake.add_rule(ExpressionRule::ignoring_arguments(&bar));

        let result = invoke(&fake, &bar, vec![Value::from(0)]);
        assert!(matches!(result, Err(Error::Configuration { .. })));
        assert_eq!(fake.recorded_calls().len(), 1);
    }

    #[test]
    fn test_unfakeable_types() {
        let types = test_types();
        assert!(matches!(
            FakeObject::new(&types.registry, &types.sealed),
            Err(Error::TypeError(_))
        ));
        assert!(matches!(
            FakeObject::new(&types.registry, &types.int32),
            Err(Error::TypeError(_))
        ));
    }

    #[test]
    fn test_from_value() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);

        let found = FakeObject::from_value(&fake.as_value()).unwrap();
        assert!(Arc::ptr_eq(&found, &fake));
        assert!(FakeObject::from_value(&Value::from(ObjectRef::new(&types.base))).is_none());
        assert!(FakeObject::from_value(&Value::Null).is_none());
    }

    #[test]
    fn test_recorded_calls_in_order() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");
        let ping = types.method(&types.ibase, "Ping");

        invoke(&fake, &bar, vec![Value::from(1)]).unwrap();
        invoke(&fake, &ping, vec![]).unwrap();

        let descriptions: Vec<String> = fake
            .recorded_calls()
            .iter()
            .map(|call| call.description())
            .collect();
        assert_eq!(
            descriptions,
            vec!["Tests.IFoo.Bar(x: 1)", "Tests.IBase.Ping()"]
        );
    }

    struct RecordingListener {
        name: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl InterceptionListener for RecordingListener {
        fn on_before_call(&self, call: &dyn FakeObjectCall) {
            lock!(self.events).push(format!("{} before {}", self.name, call.description()));
        }

        fn on_after_call(&self, _call: &CompletedCall, rule: &str) {
            lock!(self.events).push(format!("{} after {}", self.name, rule));
        }
    }

    #[test]
    fn test_interception_listeners() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let ping = types.method(&types.ibase, "Ping");
        let events = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            fake.add_interception_listener(Arc::new(RecordingListener {
                name,
                events: events.clone(),
            }));
        }
        invoke(&fake, &ping, vec![]).unwrap();

        assert_eq!(
            *lock!(events),
            vec![
                "first before Tests.IBase.Ping()",
                "second before Tests.IBase.Ping()",
                "second after Default return value rule",
                "first after Default return value rule",
            ]
        );
    }

    #[test]
    fn test_assert_was_called() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let bar = types.method(&types.ifoo, "Bar");

        invoke(&fake, &bar, vec![Value::from(1)]).unwrap();
        invoke(&fake, &bar, vec![Value::from(2)]).unwrap();

        let first = ExpressionCallMatcher::with_values(&bar, vec![Value::from(1)]);
        assert!(fake.assert_was_called(&first, Repeated::once()).is_ok());
        assert!(fake
            .assert_was_called(&AnyCallMatcher::new(), Repeated::exactly(2))
            .is_ok());
        assert!(matches!(
            fake.assert_was_called(&first, Repeated::never()),
            Err(Error::AssertionFailed(_))
        ));
    }

    #[test]
    fn test_debug_output() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let debug = format!("{:?}", fake);
        assert!(debug.contains("Tests.IFoo"));
        assert!(debug.contains("rules: 0"));
    }
}
