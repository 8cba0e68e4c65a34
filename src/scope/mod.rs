//! Scopes: stack-disciplined contexts bounding rule lifetime and call visibility.
//!
//! Every thread starts with a root scope that is always current when no nested scope is
//! open. [`FakeScope::create`] opens a nested scope and returns a [`ScopeGuard`]; the scope
//! stays current until the guard is disposed or dropped.
//!
//! # Rules
//!
//! Rules added to any fake while a nested scope is current are owned by that scope. Disposing
//! the scope removes them from every fake they were added to, so the fakes behave as
//! configured in the parent scope again. Rules added in the root scope live until removed
//! explicitly.
//!
//! # Calls
//!
//! A nested scope sees the calls recorded since it was created, the calls recorded in its
//! descendants included. Calls recorded in a disposed descendant stay visible to all of its
//! ancestors. The root scope sees the complete history of a fake.
//!
//! # Threads
//!
//! The scope stack is thread local: scopes opened on one thread are invisible to others, so
//! parallel tests do not interfere. [`ScopeGuard`] is neither `Send` nor `Sync` and must be
//! disposed on the thread that created it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fakescope::prelude::*;
//!
//! # fn test(fake: &FakeObject, bar: &fakescope::typesystem::MethodRc) -> fakescope::Result<()> {
//! fake.add_rule(ExpressionRule::ignoring_arguments(bar).returns(1));
//! {
//!     let scope = FakeScope::create();
//!     fake.add_rule(ExpressionRule::ignoring_arguments(bar).returns(2));
//!     fake.invoke(bar, vec![Value::from(0)])?; // returns 2
//!     scope.dispose()?;
//! }
//! fake.invoke(bar, vec![Value::from(0)])?; // returns 1
//! fake.assert_was_called(&ExpressionCallMatcher::ignoring_arguments(bar), Repeated::twice())?;
//! # Ok(())
//! # }
//! ```

mod guard;

use std::{
    cell::RefCell,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, Weak,
    },
};

use crate::{
    call::{CompletedCallRc, FakeObjectCall},
    fake::{FakeObject, RuleId},
};

pub use guard::ScopeGuard;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static SCOPE_STACK: RefCell<ScopeStack> = RefCell::new(ScopeStack::new());
}

/// The open scopes of one thread, innermost last
struct ScopeStack {
    root: Arc<FakeScope>,
    nested: Vec<Arc<FakeScope>>,
}

impl ScopeStack {
    fn new() -> Self {
        ScopeStack {
            root: Arc::new(FakeScope::new(None)),
            nested: Vec::new(),
        }
    }

    fn current(&self) -> Arc<FakeScope> {
        self.nested.last().unwrap_or(&self.root).clone()
    }
}

/// A node of the scope tree
pub struct FakeScope {
    id: u64,
    parent: Option<Arc<FakeScope>>,
    rules: Mutex<Vec<(Weak<FakeObject>, RuleId)>>,
    calls: boxcar::Vec<CompletedCallRc>,
}

impl FakeScope {
    fn new(parent: Option<Arc<FakeScope>>) -> Self {
        FakeScope {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            parent,
            rules: Mutex::new(Vec::new()),
            calls: boxcar::Vec::new(),
        }
    }

    /// The scope current on this thread
    pub fn current() -> Arc<FakeScope> {
        SCOPE_STACK
            .try_with(|stack| stack.borrow().current())
            .unwrap_or_else(|_| Arc::new(FakeScope::new(None)))
    }

    /// Open a nested scope, current until the returned guard is disposed
    pub fn create() -> ScopeGuard {
        let scope = SCOPE_STACK
            .try_with(|stack| {
                let mut stack = stack.borrow_mut();
                let scope = Arc::new(FakeScope::new(Some(stack.current())));
                stack.nested.push(scope.clone());
                scope
            })
            .unwrap_or_else(|_| Arc::new(FakeScope::new(Some(Arc::new(FakeScope::new(None))))));

        log::debug!(
            "Created scope {} with parent {}",
            scope.id,
            scope.parent.as_ref().map_or(0, |parent| parent.id)
        );
        ScopeGuard::new(scope)
    }

    /// Process-unique id of this scope
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The enclosing scope, `None` for the root scope
    pub fn parent(&self) -> Option<&Arc<FakeScope>> {
        self.parent.as_ref()
    }

    /// True if this is the root scope of its thread
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of rules owned by this scope
    pub fn rule_count(&self) -> usize {
        lock!(self.rules).len()
    }

    /// Take ownership of a rule added to `fake`
    pub(crate) fn register_rule(&self, fake: Weak<FakeObject>, id: RuleId) {
        if !self.is_root() {
            lock!(self.rules).push((fake, id));
        }
    }

    /// Record a completed call in this scope and all of its nested ancestors
    pub(crate) fn record_call(&self, call: &CompletedCallRc) {
        if self.is_root() {
            return;
        }

        self.calls.push(call.clone());
        let mut ancestor = self.parent.as_ref();
        while let Some(scope) = ancestor.filter(|scope| !scope.is_root()) {
            scope.calls.push(call.clone());
            ancestor = scope.parent.as_ref();
        }
    }

    /// The calls to `fake` visible to this scope, in call order
    pub fn visible_calls(&self, fake: &FakeObject) -> Vec<CompletedCallRc> {
        if self.is_root() {
            return fake.recorded_calls();
        }

        self.calls
            .iter()
            .filter(|(_, call)| call.receiver().id() == fake.id())
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Remove all rules owned by this scope, most recently added first
    fn revert_rules(&self) {
        let rules = std::mem::take(&mut *lock!(self.rules));
        let count = rules.len();

        for (fake, id) in rules.into_iter().rev() {
            if let Some(fake) = fake.upgrade() {
                fake.remove_rule(id);
            }
        }

        if count > 0 {
            log::debug!("Reverted {} rules of scope {}", count, self.id);
        }
    }
}
