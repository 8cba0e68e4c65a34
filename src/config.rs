//! Configuration of fake objects
//!
//! This module provides the options deciding how a fake treats calls that no user rule
//! applies to, and how assertion failures are rendered.

use crate::call::DEFAULT_MAX_LISTED_CALLS;

/// Configuration of a single fake object
///
/// The configuration is fixed when the fake is created. Fakes created automatically for
/// properties of a fake inherit its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeConfig {
    /// Raise an `ExpectationException` for every call no user rule applies to
    /// Members of `System.Object` keep working on strict fakes
    pub strict: bool,

    /// Delegate unconfigured calls of non-abstract members to the base implementation
    /// Also disables the object member and property fallbacks
    pub call_base_by_default: bool,

    /// Return new fakes from unconfigured getters of fakeable properties
    pub auto_fake_properties: bool,

    /// Maximum number of listing entries in assertion failures (default: 20)
    pub max_listed_calls: usize,
}

impl Default for FakeConfig {
    fn default() -> Self {
        Self {
            strict: false,
            call_base_by_default: false,
            auto_fake_properties: true,
            max_listed_calls: DEFAULT_MAX_LISTED_CALLS,
        }
    }
}

impl FakeConfig {
    /// Creates a strict configuration: every unconfigured call is an error
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            auto_fake_properties: false,
            ..Self::default()
        }
    }

    /// Creates a configuration wrapping the real implementation
    ///
    /// Unconfigured calls of non-abstract members run the base implementation.
    #[must_use]
    pub fn calls_base() -> Self {
        Self {
            call_base_by_default: true,
            auto_fake_properties: false,
            ..Self::default()
        }
    }

    /// Creates a minimal configuration: unconfigured calls return default values, nothing is
    /// faked automatically
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            auto_fake_properties: false,
            ..Self::default()
        }
    }

    /// Set the number of listing entries in assertion failures
    #[must_use]
    pub fn with_max_listed_calls(mut self, max_listed_calls: usize) -> Self {
        self.max_listed_calls = max_listed_calls;
        self
    }
}
