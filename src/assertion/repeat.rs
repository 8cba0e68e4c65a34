use std::{fmt, sync::Arc};

/// Predicate over the number of matching calls
pub type RepeatPredicate = Arc<dyn Fn(usize) -> bool + Send + Sync>;

/// A constraint on how often a call is expected, with a description for diagnostics
///
/// ```rust
/// use fakescope::Repeated;
///
/// let repeat = Repeated::at_least(2);
/// assert!(repeat.matches(3));
/// assert!(!repeat.matches(1));
/// assert_eq!(repeat.description(), "at least twice");
/// ```
#[derive(Clone)]
pub struct Repeated {
    description: String,
    predicate: RepeatPredicate,
}

fn times(count: usize) -> String {
    match count {
        1 => "once".to_string(),
        2 => "twice".to_string(),
        _ => format!("{} times", count),
    }
}

impl Repeated {
    /// The call must not have happened
    #[must_use]
    pub fn never() -> Self {
        Self::matching(|count| count == 0, "never")
    }

    /// The call must have happened exactly once
    #[must_use]
    pub fn once() -> Self {
        Self::exactly(1)
    }

    /// The call must have happened exactly twice
    #[must_use]
    pub fn twice() -> Self {
        Self::exactly(2)
    }

    /// The call must have happened exactly `expected` times
    #[must_use]
    pub fn exactly(expected: usize) -> Self {
        if expected == 0 {
            return Self::never();
        }
        Self::matching(
            move |count| count == expected,
            &format!("exactly {}", times(expected)),
        )
    }

    /// The call must have happened `minimum` times or more
    #[must_use]
    pub fn at_least(minimum: usize) -> Self {
        Self::matching(
            move |count| count >= minimum,
            &format!("at least {}", times(minimum)),
        )
    }

    /// The call must have happened `maximum` times or less
    #[must_use]
    pub fn at_most(maximum: usize) -> Self {
        Self::matching(
            move |count| count <= maximum,
            &format!("at most {}", times(maximum)),
        )
    }

    /// A custom constraint
    ///
    /// ## Arguments
    /// * 'predicate'   - Decides if a number of calls is acceptable
    /// * 'description' - Completes "Expected to find it ..." in diagnostics
    pub fn matching<F>(predicate: F, description: &str) -> Self
    where
        F: Fn(usize) -> bool + Send + Sync + 'static,
    {
        Repeated {
            description: description.to_string(),
            predicate: Arc::new(predicate),
        }
    }

    /// Checks if `count` calls satisfy the constraint
    pub fn matches(&self, count: usize) -> bool {
        (self.predicate)(count)
    }

    /// The description of the constraint
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Repeated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Repeated").field(&self.description).finish()
    }
}

impl fmt::Display for Repeated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(Repeated::never().description(), "never");
        assert_eq!(Repeated::once().description(), "exactly once");
        assert_eq!(Repeated::twice().description(), "exactly twice");
        assert_eq!(Repeated::exactly(3).description(), "exactly 3 times");
        assert_eq!(Repeated::exactly(0).description(), "never");
        assert_eq!(Repeated::at_least(1).description(), "at least once");
        assert_eq!(Repeated::at_most(5).description(), "at most 5 times");
        assert_eq!(
            Repeated::matching(|count| count % 2 == 0, "an even number of times").to_string(),
            "an even number of times"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(Repeated::never().matches(0));
        assert!(!Repeated::never().matches(1));
        assert!(Repeated::once().matches(1));
        assert!(!Repeated::once().matches(2));
        assert!(Repeated::at_least(2).matches(2));
        assert!(!Repeated::at_least(2).matches(1));
        assert!(Repeated::at_most(2).matches(0));
        assert!(!Repeated::at_most(2).matches(3));
    }
}
