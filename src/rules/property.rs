use std::sync::{Arc, Mutex};

use crate::{
    call::{FakeObjectCall, InterceptedCall},
    fake::{FakeObject, FakeObjectRc},
    rules::CallRule,
    typesystem::MethodRc,
    Result, Value,
};

/// Single-value property behavior: the getter returns the last value written through the
/// setter
///
/// Installed by [`AutoFakePropertyRule`] and [`PropertySetterRule`]. The rule is not owned by
/// any scope, a property keeps its value after the scope it was first touched in is disposed.
pub struct PropertyBehaviorRule {
    getter: MethodRc,
    setter: Option<MethodRc>,
    value: Mutex<Value>,
    /// Keeps an auto-faked property value alive, fakes are only weakly linked from values
    child: Option<FakeObjectRc>,
}

impl PropertyBehaviorRule {
    /// Create a new behavior holding `value`
    ///
    /// ## Arguments
    /// * 'getter' - The property getter
    /// * 'setter' - The property setter, if the property has one
    /// * 'value'  - The initial value
    /// * 'child'  - The fake behind `value`, if it is an auto-faked value
    pub fn new(
        getter: &MethodRc,
        setter: Option<MethodRc>,
        value: Value,
        child: Option<FakeObjectRc>,
    ) -> Self {
        PropertyBehaviorRule {
            getter: getter.clone(),
            setter,
            value: Mutex::new(value),
            child,
        }
    }

    /// The current value
    pub fn value(&self) -> Value {
        lock!(self.value).clone()
    }

    /// The auto-faked value, if the property was auto-faked
    pub fn child(&self) -> Option<&FakeObjectRc> {
        self.child.as_ref()
    }

    fn is_getter(&self, call: &InterceptedCall, fake: &FakeObject) -> bool {
        fake.resolver()
            .equivalent(call.receiver().object_type(), call.method(), &self.getter)
    }

    fn is_setter(&self, call: &InterceptedCall, fake: &FakeObject) -> bool {
        self.setter.as_ref().is_some_and(|setter| {
            fake.resolver()
                .equivalent(call.receiver().object_type(), call.method(), setter)
        })
    }
}

impl CallRule for PropertyBehaviorRule {
    fn is_applicable_to(&self, call: &InterceptedCall, fake: &FakeObject) -> bool {
        self.is_getter(call, fake) || self.is_setter(call, fake)
    }

    fn apply(&self, call: &mut InterceptedCall, fake: &FakeObject) -> Result<()> {
        if self.is_getter(call, fake) {
            call.set_return_value(self.value());
        } else {
            let written = call.argument(0).cloned().unwrap_or(Value::Null);
            *lock!(self.value) = written;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let property = self
            .getter
            .getter_of()
            .map_or_else(|| self.getter.name.clone(), |property| property.name.clone());
        format!("Property behavior rule for {}", property)
    }
}

/// Fallback that gives unconfigured getters of fakeable properties a fake value
///
/// The first read creates a new fake of the property type, returns it, and installs a
/// [`PropertyBehaviorRule`] so later reads return the same fake and writes replace it.
pub struct AutoFakePropertyRule;

impl CallRule for AutoFakePropertyRule {
    fn is_applicable_to(&self, call: &InterceptedCall, fake: &FakeObject) -> bool {
        let config = fake.config();
        if !config.auto_fake_properties || config.strict || config.call_base_by_default {
            return false;
        }

        let method = call.method();
        method.params.is_empty()
            && method.getter_of().is_some()
            && method
                .return_type()
                .is_some_and(|property_type| property_type.is_fakeable())
    }

    fn apply(&self, call: &mut InterceptedCall, fake: &FakeObject) -> Result<()> {
        let getter = call.method().clone();
        let property = getter
            .getter_of()
            .ok_or_else(|| config_error!("{} is not a property getter", getter.fullname()))?;
        let property_type = property.property_type().ok_or_else(|| {
            config_error!("The type of the property {} is gone", property.name)
        })?;

        let child = FakeObject::with_config(fake.registry(), &property_type, fake.config())?;
        let value = child.as_value();
        log::debug!(
            "Auto-faked property {} of {} with a new {}",
            property.name,
            fake.fake_type().fullname(),
            property_type.fullname()
        );

        call.set_return_value(value.clone());
        fake.add_rule_unscoped(Arc::new(PropertyBehaviorRule::new(
            &getter,
            property.setter(),
            value,
            Some(child),
        )));
        Ok(())
    }

    fn describe(&self) -> String {
        "Auto-fake property rule".to_string()
    }
}

/// Fallback that makes properties remember the values written to them
///
/// A setter call installs a [`PropertyBehaviorRule`] holding the written value, so reads
/// after the write return it.
pub struct PropertySetterRule;

impl CallRule for PropertySetterRule {
    fn is_applicable_to(&self, call: &InterceptedCall, fake: &FakeObject) -> bool {
        let config = fake.config();
        if config.strict || config.call_base_by_default {
            return false;
        }

        call.method()
            .setter_of()
            .is_some_and(|property| property.getter().is_some())
    }

    fn apply(&self, call: &mut InterceptedCall, fake: &FakeObject) -> Result<()> {
        let setter = call.method().clone();
        let property = setter
            .setter_of()
            .ok_or_else(|| config_error!("{} is not a property setter", setter.fullname()))?;
        let getter = property
            .getter()
            .ok_or_else(|| config_error!("The property {} has no getter", property.name))?;

        let value = call.argument(0).cloned().unwrap_or(Value::Null);
        fake.add_rule_unscoped(Arc::new(PropertyBehaviorRule::new(
            &getter,
            Some(setter),
            value,
            None,
        )));
        Ok(())
    }

    fn describe(&self) -> String {
        "Property setter rule".to_string()
    }
}
