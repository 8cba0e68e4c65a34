use crate::{
    call::{FakeException, FakeObjectCall, InterceptedCall},
    fake::FakeObject,
    rules::CallRule,
    Result,
};

/// Exception type raised by strict fakes for unconfigured calls
pub const EXPECTATION_EXCEPTION: &str = "ExpectationException";

/// The last fallback, applied to calls no other rule applies to
///
/// - Strict fakes raise an `ExpectationException`
/// - Fakes calling base methods by default delegate non-abstract members to the base
///   implementation
/// - All other fakes return the default value of the member's return type
pub struct DefaultReturnValueRule;

impl CallRule for DefaultReturnValueRule {
    fn is_applicable_to(&self, _call: &InterceptedCall, _fake: &FakeObject) -> bool {
        true
    }

    fn apply(&self, call: &mut InterceptedCall, fake: &FakeObject) -> Result<()> {
        let config = fake.config();

        if config.strict {
            let message = format!(
                "Call to unconfigured method of strict fake: {}.",
                call.description()
            );
            call.set_exception(FakeException::new(EXPECTATION_EXCEPTION, &message));
            return Ok(());
        }

        if config.call_base_by_default && !call.method().is_abstract() {
            call.set_call_base_method(true);
            return Ok(());
        }

        if let Some(default) = call
            .method()
            .return_type()
            .and_then(|return_type| return_type.default_value())
        {
            call.set_return_value(default);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "Default return value rule".to_string()
    }
}
