use thiserror::Error;

use crate::typesystem::Token;

macro_rules! config_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Configuration {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Configuration {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// A call that no configured rule matches is *not* an error: it falls through to the default
/// behavior of the fake. Likewise, a method reference that cannot be resolved against a receiver
/// type simply never matches. Errors are reserved for inconsistent configuration, failed
/// assertions and misuse of scopes.
///
/// # Error Categories
///
/// ## Configuration Errors
/// - [`Error::Configuration`] - A rule was applied in an inconsistent state (e.g. no action)
/// - [`Error::OutAndRefCountMismatch`] - Wrong number of values for out/ref parameters
/// - [`Error::ArgumentConstraintsNotSupported`] - Argument validators on a rule that forbids them
/// - [`Error::ArgumentCount`] - A call record does not fit the method it claims to invoke
///
/// ## Assertion Errors
/// - [`Error::AssertionFailed`] - An expected call pattern was not found in the call history
///
/// ## Scope Errors
/// - [`Error::ScopeOrder`] - A scope was disposed while one of its descendants was current
///
/// ## Type System Errors
/// - [`Error::TypeInsert`] - Failed to register a new type
/// - [`Error::TypeError`] - General type system operation error
///
/// # Examples
///
/// ```rust,no_run
/// use fakescope::{Error, prelude::*};
///
/// # fn check(fake: &FakeObject, matcher: &ExpressionCallMatcher) {
/// match fake.assert_was_called(matcher, Repeated::once()) {
///     Ok(()) => println!("call found"),
///     Err(Error::AssertionFailed(message)) => eprintln!("{}", message),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    /// A rule was configured inconsistently.
    ///
    /// Raised when a rule is applied without an action, when a base implementation is
    /// requested for an abstract member, or any other inconsistency that can only be
    /// detected while applying the rule. The error includes the source location where
    /// the inconsistency was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the inconsistency
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Configuration - {file}:{line}: {message}")]
    Configuration {
        /// The message to be printed for the Configuration error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The number of values supplied for out and ref parameters does not match the method.
    #[error("The number of values for out and ref parameters specified does not match the number of out and ref parameters in the call - expected {expected}, got {actual}")]
    OutAndRefCountMismatch {
        /// Number of out/ref parameters of the intercepted method
        expected: usize,
        /// Number of values the rule supplied
        actual: usize,
    },

    /// Argument validators were configured on a rule kind that does not support them.
    ///
    /// The associated value names the rule kind.
    #[error("Argument constraints are not supported by {0}")]
    ArgumentConstraintsNotSupported(String),

    /// A call record was created with a wrong number of arguments for its method.
    #[error("Call has {actual} arguments but the method declares {expected} parameters")]
    ArgumentCount {
        /// Number of parameters declared by the method
        expected: usize,
        /// Number of arguments supplied by the interception layer
        actual: usize,
    },

    // Assertion errors
    /// An assertion over the recorded calls failed.
    ///
    /// The message contains the rendered diagnostic, including the listing of the calls
    /// that were visible to the assertion.
    #[error("{0}")]
    AssertionFailed(String),

    // Scope errors
    /// A scope was disposed out of order.
    ///
    /// The scope and every scope nested inside it have been disposed regardless; this
    /// error only reports the misuse.
    #[error("Scope {disposed} was disposed while scope {current} was still current")]
    ScopeOrder {
        /// Id of the scope that was disposed
        disposed: u64,
        /// Id of the scope that was current at that time
        current: u64,
    },

    // Type system errors
    /// Failed to insert new type into `TypeRegistry`.
    ///
    /// The associated [`Token`] identifies which type caused the failure.
    #[error("Failed to insert new type into TypeRegistry - {0}")]
    TypeInsert(Token),

    /// General error during `TypeRegistry` usage.
    #[error("{0}")]
    TypeError(String),
}
