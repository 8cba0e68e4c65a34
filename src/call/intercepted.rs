use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::{
    call::{describe_call, FakeException, FakeObjectCall},
    typesystem::MethodRc,
    Error::ArgumentCount,
    ObjectRef, Result, Value,
};

static NEXT_SEQUENCE_NUMBER: AtomicU64 = AtomicU64::new(1);

/// Reference to a `CompletedCall`
pub type CompletedCallRc = Arc<CompletedCall>;

/// The mutable record of a call in flight
///
/// Created by the interception layer for each trapped invocation. Rules write the return
/// value, out/ref argument values, an exception, or the request to run the base
/// implementation into it; the interception layer reads them back once
/// [`crate::FakeObject::intercept`] returns.
#[derive(Debug)]
pub struct InterceptedCall {
    method: MethodRc,
    receiver: ObjectRef,
    arguments: Vec<Value>,
    return_value: Option<Value>,
    exception: Option<FakeException>,
    call_base_method: bool,
    sequence_number: u64,
}

impl InterceptedCall {
    /// Create a new call record
    ///
    /// ## Arguments
    /// * 'receiver'  - The instance the call was made on
    /// * 'method'    - The invoked method, closed over its generic arguments if generic
    /// * 'arguments' - One value per parameter, out parameters included
    ///
    /// # Errors
    /// Returns [`crate::Error::ArgumentCount`] if the number of arguments does not match the
    /// method's parameter count
    pub fn new(receiver: &ObjectRef, method: &MethodRc, arguments: Vec<Value>) -> Result<Self> {
        if arguments.len() != method.params.len() {
            return Err(ArgumentCount {
                expected: method.params.len(),
                actual: arguments.len(),
            });
        }

        Ok(InterceptedCall {
            method: method.clone(),
            receiver: receiver.clone(),
            arguments,
            return_value: None,
            exception: None,
            call_base_method: false,
            sequence_number: NEXT_SEQUENCE_NUMBER.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// The return value set so far
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// Set the value the call returns
    pub fn set_return_value(&mut self, value: Value) {
        self.return_value = Some(value);
    }

    /// Overwrite the argument at `index`, used for out and ref parameters
    ///
    /// # Errors
    /// Returns an error if `index` is out of range
    pub fn set_argument(&mut self, index: usize, value: Value) -> Result<()> {
        let count = self.arguments.len();
        let slot = self.arguments.get_mut(index).ok_or_else(|| {
            config_error!(
                "Argument index {} is out of range, the call has {} arguments",
                index,
                count
            )
        })?;
        *slot = value;
        Ok(())
    }

    /// The exception the call raises, if any
    pub fn exception(&self) -> Option<&FakeException> {
        self.exception.as_ref()
    }

    /// Make the call raise `exception`
    pub fn set_exception(&mut self, exception: FakeException) {
        self.exception = Some(exception);
    }

    /// True if the interception layer must run the base implementation
    pub fn calls_base_method(&self) -> bool {
        self.call_base_method
    }

    /// Request that the interception layer runs the base implementation and uses its result
    pub fn set_call_base_method(&mut self, call_base: bool) {
        self.call_base_method = call_base;
    }

    /// Freeze the record
    #[must_use]
    pub fn freeze(&self) -> CompletedCall {
        CompletedCall {
            description: describe_call(&self.method, &self.arguments),
            method: self.method.clone(),
            receiver: self.receiver.clone(),
            arguments: self.arguments.clone(),
            return_value: self.return_value.clone(),
            exception: self.exception.clone(),
            called_base_method: self.call_base_method,
            sequence_number: self.sequence_number,
        }
    }
}

impl FakeObjectCall for InterceptedCall {
    fn method(&self) -> &MethodRc {
        &self.method
    }

    fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    fn receiver(&self) -> &ObjectRef {
        &self.receiver
    }

    fn sequence_number(&self) -> u64 {
        self.sequence_number
    }
}

/// An immutable snapshot of a call after a rule has applied to it
#[derive(Debug)]
pub struct CompletedCall {
    method: MethodRc,
    receiver: ObjectRef,
    arguments: Vec<Value>,
    return_value: Option<Value>,
    exception: Option<FakeException>,
    called_base_method: bool,
    sequence_number: u64,
    description: String,
}

impl CompletedCall {
    /// The value the call returned
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// The exception the call raised
    pub fn exception(&self) -> Option<&FakeException> {
        self.exception.as_ref()
    }

    /// True if the call was delegated to the base implementation
    pub fn called_base_method(&self) -> bool {
        self.called_base_method
    }
}

impl FakeObjectCall for CompletedCall {
    fn method(&self) -> &MethodRc {
        &self.method
    }

    fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    fn receiver(&self) -> &ObjectRef {
        &self.receiver
    }

    fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::test_types, Error};

    #[test]
    fn test_argument_count_is_checked() {
        let types = test_types();
        let receiver = ObjectRef::new(&types.base);
        let bar = types.method(&types.ifoo, "Bar");

        let result = InterceptedCall::new(&receiver, &bar, vec![]);
        assert!(matches!(
            result,
            Err(Error::ArgumentCount {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let types = test_types();
        let receiver = ObjectRef::new(&types.base);
        let ping = types.method(&types.ibase, "Ping");

        let first = InterceptedCall::new(&receiver, &ping, vec![]).unwrap();
        let second = InterceptedCall::new(&receiver, &ping, vec![]).unwrap();
        assert!(second.sequence_number() > first.sequence_number());
    }

    #[test]
    fn test_argument_access() {
        let types = test_types();
        let receiver = ObjectRef::new(&types.base);
        let try_parse = types.method(&types.ifoo, "TryParse");

        let mut call = InterceptedCall::new(
            &receiver,
            &try_parse,
            vec![Value::from("7"), Value::from(0), Value::from(1)],
        )
        .unwrap();

        assert_eq!(call.argument(0), Some(&Value::from("7")));
        assert_eq!(call.argument_by_name("count"), Some(&Value::from(1)));
        assert_eq!(call.argument_by_name("missing"), None);

        call.set_argument(1, Value::from(7)).unwrap();
        assert_eq!(call.argument_by_name("value"), Some(&Value::from(7)));
        assert!(call.set_argument(3, Value::Null).is_err());
    }

    #[test]
    fn test_freeze() {
        let types = test_types();
        let receiver = ObjectRef::new(&types.base);
        let bar = types.method(&types.ifoo, "Bar");

        let mut call = InterceptedCall::new(&receiver, &bar, vec![Value::from(5)]).unwrap();
        call.set_return_value(Value::from(10));
        call.set_call_base_method(true);

        let completed = call.freeze();
        assert_eq!(completed.return_value(), Some(&Value::from(10)));
        assert!(completed.called_base_method());
        assert!(completed.exception().is_none());
        assert_eq!(completed.sequence_number(), call.sequence_number());
        assert_eq!(completed.description(), "Tests.IFoo.Bar(x: 5)");
        assert_eq!(completed.receiver(), &receiver);
    }
}
