use crate::{
    call::{CallWriter, CompletedCallRc, FakeObjectCall, DEFAULT_MAX_LISTED_CALLS},
    Error::AssertionFailed,
    Result,
};

/// Indent of the call listing in assertion failures
const LISTING_INDENT: usize = 4;

/// Evaluates repeat assertions over a list of recorded calls
pub struct FakeAsserter {
    calls: Vec<CompletedCallRc>,
    max_listed_calls: usize,
}

impl FakeAsserter {
    /// Create an asserter over `calls`, in call order
    pub fn new(calls: Vec<CompletedCallRc>) -> Self {
        FakeAsserter {
            calls,
            max_listed_calls: DEFAULT_MAX_LISTED_CALLS,
        }
    }

    /// Set the number of listing entries rendered on failure
    #[must_use]
    pub fn with_max_listed_calls(mut self, max_listed_calls: usize) -> Self {
        self.max_listed_calls = max_listed_calls;
        self
    }

    /// The calls the assertions are evaluated over
    pub fn calls(&self) -> &[CompletedCallRc] {
        &self.calls
    }

    /// Assert that the number of calls accepted by `call_predicate` satisfies
    /// `repeat_predicate`
    ///
    /// ## Arguments
    /// * 'call_predicate'     - Selects the calls to count
    /// * 'call_description'   - Description of the selected calls
    /// * 'repeat_predicate'   - Decides if the count is acceptable
    /// * 'repeat_description' - Description of the acceptable counts, e.g. `exactly once`
    ///
    /// # Errors
    /// Returns [`crate::Error::AssertionFailed`] with the rendered diagnostic:
    ///
    /// ```text
    ///
    ///   Assertion failed for the following call:
    ///     Tests.IFoo.Bar(x: 1)
    ///   Expected to find it never but found it 1 times among the calls:
    ///     1. 'Tests.IFoo.Bar(x: 1)'
    ///
    /// ```
    pub fn assert_was_called<C, R>(
        &self,
        call_predicate: C,
        call_description: &str,
        repeat_predicate: R,
        repeat_description: &str,
    ) -> Result<()>
    where
        C: Fn(&dyn FakeObjectCall) -> bool,
        R: Fn(usize) -> bool,
    {
        let count = self
            .calls
            .iter()
            .filter(|call| {
                let call: &dyn FakeObjectCall = &***call;
                call_predicate(call)
            })
            .count();

        if repeat_predicate(count) {
            return Ok(());
        }

        let listing = CallWriter::new(self.max_listed_calls).write_calls(&self.calls, LISTING_INDENT);
        Err(AssertionFailed(format!(
            "\n  Assertion failed for the following call:\n    {}\n  Expected to find it {} but found it {} times among the calls:\n{}\n",
            call_description, repeat_description, count, listing
        )))
    }
}
