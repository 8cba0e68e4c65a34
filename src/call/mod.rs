//! Call records exchanged with the interception layer.
//!
//! The interception layer (outside this crate) traps an invocation on a faked instance and
//! hands the core an [`InterceptedCall`]: the invoked method, the receiver, the argument
//! values, and empty return / exception slots. Rules mutate that record. Once a rule has
//! applied, the record is frozen into a [`CompletedCall`] and appended to the fake's history.
//!
//! Both expose the read-only [`FakeObjectCall`] view used by rules, matchers and asserters.
//!
//! # Call Descriptions
//!
//! Calls are described as `Ns.Type.Method<GenericArgs>(name: value, ...)`, for example
//! `Tests.IFoo.Bar(x: 42)` or `Tests.IFoo.Get<System.Int32>()`. The same format is used in
//! assertion failure listings.

mod intercepted;
mod writer;

use thiserror::Error;

use crate::{typesystem::MethodRc, ObjectRef, Value};

pub use intercepted::{CompletedCall, CompletedCallRc, InterceptedCall};
pub use writer::{CallWriter, DEFAULT_MAX_LISTED_CALLS};

/// An exception a configured rule raises in place of returning
///
/// The interception layer is expected to translate it into whatever the host program uses
/// for exceptions and raise it to the caller of the faked member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{type_name}: {message}")]
pub struct FakeException {
    /// Full name of the exception type
    pub type_name: String,
    /// Exception message
    pub message: String,
}

impl FakeException {
    /// Create a new exception
    pub fn new(type_name: &str, message: &str) -> Self {
        FakeException {
            type_name: type_name.to_string(),
            message: message.to_string(),
        }
    }
}

/// Read-only view of a call made to a fake
pub trait FakeObjectCall {
    /// The method as invoked, a closed instantiation for generic methods
    fn method(&self) -> &MethodRc;

    /// The argument values, in parameter order
    fn arguments(&self) -> &[Value];

    /// The instance the call was made on
    fn receiver(&self) -> &ObjectRef;

    /// Global, monotonically increasing number, orders calls across all fakes
    fn sequence_number(&self) -> u64;

    /// The argument at `index`
    fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments().get(index)
    }

    /// The argument passed for the parameter named `name`
    fn argument_by_name(&self, name: &str) -> Option<&Value> {
        let index = self
            .method()
            .params
            .iter()
            .position(|param| param.name == name)?;
        self.argument(index)
    }

    /// The description of this call, see [`describe_call`]
    fn description(&self) -> String {
        describe_call(self.method(), self.arguments())
    }
}

/// Describe a call of `method` with `arguments`, e.g. `Tests.IFoo.Bar(x: 42)`
pub fn describe_call(method: &MethodRc, arguments: &[Value]) -> String {
    let arguments = method
        .params
        .iter()
        .zip(arguments.iter())
        .map(|(param, value)| format!("{}: {}", param.name, value))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}{}({})", method.fullname(), generic_suffix(method), arguments)
}

/// The `<A, B>` suffix of closed generic instantiations, empty otherwise
pub(crate) fn generic_suffix(method: &MethodRc) -> String {
    if !method.is_generic_instance() {
        return String::new();
    }

    let args = method
        .generic_args
        .iter()
        .map(|arg| {
            arg.upgrade()
                .map_or_else(|| "?".to_string(), |ty| ty.fullname())
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("<{}>", args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::test_types;

    #[test]
    fn test_describe_call() {
        let types = test_types();
        let bar = types.method(&types.ifoo, "Bar");
        assert_eq!(describe_call(&bar, &[Value::from(42)]), "Tests.IFoo.Bar(x: 42)");

        let try_parse = types.method(&types.ifoo, "TryParse");
        assert_eq!(
            describe_call(
                &try_parse,
                &[Value::from("12"), Value::from(0), Value::from(1)]
            ),
            "Tests.IFoo.TryParse(s: \"12\", value: 0, count: 1)"
        );

        let ping = types.method(&types.ibase, "Ping");
        assert_eq!(describe_call(&ping, &[]), "Tests.IBase.Ping()");
    }

    #[test]
    fn test_describe_generic_call() {
        let types = test_types();
        let get = types.method(&types.ifoo, "Get");
        let get_int = get.make_generic(&[types.int32.clone()]).unwrap();

        assert_eq!(
            describe_call(&get_int, &[]),
            "Tests.IFoo.Get<System.Int32>()"
        );
        assert_eq!(describe_call(&get, &[]), "Tests.IFoo.Get()");
    }

    #[test]
    fn test_exception_display() {
        let exception = FakeException::new("System.InvalidOperationException", "boom");
        assert_eq!(
            exception.to_string(),
            "System.InvalidOperationException: boom"
        );
    }
}
