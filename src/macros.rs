//! Lock helpers.
//!
//! Poisoned locks are recovered. Every update of the guarded rule lists, listeners and
//! property values completes before its guard is released, so a panicking test leaves them
//! consistent and fakes shared with other tests keep working.

/// Lock a `Mutex`, recovering the guard if the lock is poisoned
///
/// ```rust, ignore
///  let mut arena = lock!(self.rules);
///  arena.push_front(rule);
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Acquire the read half of a `RwLock`, recovering the guard if the lock is poisoned
///
/// ```rust, ignore
///  let listeners = read_lock!(self.listeners);
///  println!("{}", listeners.len());
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Acquire the write half of a `RwLock`, recovering the guard if the lock is poisoned
///
/// ```rust, ignore
///  let mut listeners = write_lock!(self.listeners);
///  listeners.push(listener);
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}
