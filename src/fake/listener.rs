use crate::call::{CompletedCall, FakeObjectCall};

/// Observer of the calls intercepted by one fake
///
/// Listeners run synchronously on the intercepting thread. `on_before_call` runs in
/// registration order before a rule is selected, `on_after_call` in reverse registration order
/// once the call is recorded.
pub trait InterceptionListener: Send + Sync {
    /// Called before a rule is resolved for `call`
    fn on_before_call(&self, _call: &dyn FakeObjectCall) {}

    /// Called after `call` was completed by the rule described as `rule`
    fn on_after_call(&self, _call: &CompletedCall, _rule: &str) {}
}
