use crate::{
    call::{FakeObjectCall, InterceptedCall},
    fake::FakeObject,
    rules::CallRule,
    typesystem::MethodRc,
    Result, Value,
};

enum ObjectMember {
    Equals,
    GetHashCode,
    ToString,
}

/// Fallback giving fakes the identity semantics of `System.Object`
///
/// - `Equals(other)` is true only for the fake itself
/// - `GetHashCode()` returns the fake's instance id
/// - `ToString()` returns `Faked <type>`
///
/// Inactive on fakes that call base methods by default, those run the real members.
pub struct ObjectMemberRule;

impl ObjectMemberRule {
    fn member(call: &InterceptedCall, fake: &FakeObject) -> Option<ObjectMember> {
        let members = fake.registry().object_members().ok()?;
        let receiver_type = call.receiver().object_type();
        let is = |member: &MethodRc| {
            fake.resolver()
                .equivalent(receiver_type, call.method(), member)
        };

        if is(&members.equals) {
            Some(ObjectMember::Equals)
        } else if is(&members.get_hash_code) {
            Some(ObjectMember::GetHashCode)
        } else if is(&members.to_string) {
            Some(ObjectMember::ToString)
        } else {
            None
        }
    }
}

impl CallRule for ObjectMemberRule {
    fn is_applicable_to(&self, call: &InterceptedCall, fake: &FakeObject) -> bool {
        !fake.config().call_base_by_default && Self::member(call, fake).is_some()
    }

    fn apply(&self, call: &mut InterceptedCall, fake: &FakeObject) -> Result<()> {
        let receiver = call.receiver().clone();
        let result = match Self::member(call, fake) {
            Some(ObjectMember::Equals) => Value::Bool(
                call.argument(0)
                    .and_then(Value::as_object)
                    .is_some_and(|other| *other == receiver),
            ),
            Some(ObjectMember::GetHashCode) => Value::Int(receiver.id() as i64),
            Some(ObjectMember::ToString) => Value::String(receiver.to_string()),
            None => {
                return Err(config_error!(
                    "{} is not a member of System.Object",
                    call.method().fullname()
                ))
            }
        };

        call.set_return_value(result);
        Ok(())
    }

    fn describe(&self) -> String {
        "Object member rule".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        test::{create_fake, invoke, test_types},
        FakeConfig, FakeObject, ObjectRef, Value,
    };

    #[test]
    fn test_to_string() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let to_string = types.registry.object_members().unwrap().to_string.clone();

        let call = invoke(&fake, &to_string, vec![]).unwrap();
        assert_eq!(
            call.return_value(),
            Some(&Value::from("Faked Tests.IFoo"))
        );
    }

    #[test]
    fn test_equals() {
        let types = test_types();
        let fake = create_fake(&types, &types.base);
        let other = create_fake(&types, &types.base);
        let equals = types.registry.object_members().unwrap().equals.clone();

        let own = invoke(&fake, &equals, vec![fake.as_value()]).unwrap();
        let foreign = invoke(&fake, &equals, vec![other.as_value()]).unwrap();
        let plain = invoke(
            &fake,
            &equals,
            vec![Value::from(ObjectRef::new(&types.base))],
        )
        .unwrap();
        let null = invoke(&fake, &equals, vec![Value::Null]).unwrap();

        assert_eq!(own.return_value(), Some(&Value::Bool(true)));
        assert_eq!(foreign.return_value(), Some(&Value::Bool(false)));
        assert_eq!(plain.return_value(), Some(&Value::Bool(false)));
        assert_eq!(null.return_value(), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_get_hash_code_is_stable() {
        let types = test_types();
        let fake = create_fake(&types, &types.ifoo);
        let hash = types.registry.object_members().unwrap().get_hash_code.clone();

        let first = invoke(&fake, &hash, vec![]).unwrap();
        let second = invoke(&fake, &hash, vec![]).unwrap();
        assert_eq!(first.return_value(), second.return_value());
        assert_eq!(
            first.return_value(),
            Some(&Value::Int(fake.id() as i64))
        );
    }

    #[test]
    fn test_works_on_strict_fakes() {
        let types = test_types();
        let fake = FakeObject::with_config(&types.registry, &types.ifoo, FakeConfig::strict()).unwrap();
        let to_string = types.registry.object_members().unwrap().to_string.clone();

        let call = invoke(&fake, &to_string, vec![]).unwrap();
        assert!(call.exception().is_none());
        assert_eq!(call.return_value(), Some(&Value::from("Faked Tests.IFoo")));
    }
}
