use std::{marker::PhantomData, sync::Arc};

use crate::{
    scope::{FakeScope, SCOPE_STACK},
    Error::ScopeOrder,
    Result,
};

/// Keeps a nested [`FakeScope`] current
///
/// Disposing the guard, explicitly through [`ScopeGuard::dispose`] or by dropping it, closes
/// the scope: its rules are removed and the parent becomes current again. Scopes must be
/// disposed in reverse creation order. Disposing a scope that still has open descendants
/// closes the descendants too and reports [`crate::Error::ScopeOrder`].
#[must_use = "the scope is disposed as soon as the guard is dropped"]
pub struct ScopeGuard {
    scope: Arc<FakeScope>,
    disposed: bool,
    // Scopes belong to the thread-local stack they were pushed on
    _not_send: PhantomData<*const ()>,
}

impl ScopeGuard {
    pub(crate) fn new(scope: Arc<FakeScope>) -> Self {
        ScopeGuard {
            scope,
            disposed: false,
            _not_send: PhantomData,
        }
    }

    /// The guarded scope
    pub fn scope(&self) -> &Arc<FakeScope> {
        &self.scope
    }

    /// The id of the guarded scope
    pub fn id(&self) -> u64 {
        self.scope.id()
    }

    /// Dispose the scope
    ///
    /// # Errors
    /// Returns [`crate::Error::ScopeOrder`] if a descendant of this scope was still current.
    /// The scope and its descendants are disposed regardless.
    pub fn dispose(mut self) -> Result<()> {
        self.close()
    }

    fn close(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        let closed = SCOPE_STACK
            .try_with(|stack| {
                let mut stack = stack.borrow_mut();
                stack
                    .nested
                    .iter()
                    .position(|scope| Arc::ptr_eq(scope, &self.scope))
                    .map(|position| stack.nested.split_off(position))
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        // Already closed by an out of order disposal of an ancestor
        if closed.is_empty() {
            self.scope.revert_rules();
            return Ok(());
        }

        for scope in closed.iter().rev() {
            scope.revert_rules();
            log::debug!("Disposed scope {}", scope.id());
        }

        match closed.last() {
            Some(current) if closed.len() > 1 => Err(ScopeOrder {
                disposed: self.scope.id(),
                current: current.id(),
            }),
            _ => Ok(()),
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            log::warn!("{}", error);
        }
    }
}
