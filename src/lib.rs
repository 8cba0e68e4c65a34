// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # fakescope
//!
//! The runtime core of a fake object framework. `fakescope` decides what a faked member does
//! when it is called, remembers every call, and answers questions about the calls afterwards.
//! Generating the faked instances and trapping their calls is left to an interception layer
//! built on top of this crate.
//!
//! ## Features
//!
//! - **Method identity** - Overrides, interface implementations (implicit and explicit) and
//!   generic instantiations resolve to the same member, relative to the receiver type
//! - **Argument validators** - Named predicates over single arguments, composable with
//!   `and`, `or` and `not`
//! - **Call rules** - Most recently configured rule wins, with optional use counts
//! - **Scopes** - Nested, thread-local configuration contexts that revert on disposal
//! - **Assertions** - Repeat constraints with golden diagnostic output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fakescope::prelude::*;
//!
//! // Describe the faked type
//! let registry = Arc::new(TypeRegistry::new()?);
//! let string = registry.primitive(ValueKind::String)?;
//! let greeter = TypeBuilder::interface(&registry, "Demo", "IGreeter")
//!     .method(MethodBuilder::new("Greet").with_param("name", &string).with_return(&string))
//!     .build()?;
//! let greet = greeter.method_by_name("Greet").expect("declared above");
//!
//! // Configure a fake
//! let fake = FakeObject::new(&registry, &greeter)?;
//! fake.add_rule(
//!     ExpressionRule::new(ExpressionCallMatcher::new(&greet, vec![starts_with("A")]))
//!         .returns("Hello A-person"),
//! );
//!
//! // The interception layer forwards calls
//! let call = fake.invoke(&greet, vec![Value::from("Alice")])?;
//! assert_eq!(call.return_value(), Some(&Value::from("Hello A-person")));
//!
//! // Assert on the history
//! fake.assert_was_called(&ExpressionCallMatcher::ignoring_arguments(&greet), Repeated::once())?;
//! # Ok::<(), fakescope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`typesystem`] - The type model and the [`typesystem::MethodResolver`]
//! - [`arguments`] - Argument validators and combinators
//! - [`call`] - Call records exchanged with the interception layer
//! - [`matcher`] - Call matchers shared by rules and assertions
//! - [`rules`] - Configurable and fallback call rules
//! - [`fake`] - [`FakeObject`]: rule resolution, interception and history
//! - [`scope`] - [`FakeScope`]: rule lifetime and call visibility
//! - [`assertion`] - [`Repeated`] and [`assertion::FakeAsserter`]
//! - [`config`] - [`FakeConfig`]
//! - [`prelude`] - Convenient re-exports
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger. Rule evaluation is
//! logged at `trace`, rule selection, scopes and auto-faked properties at `debug`, misuse of
//! scopes at `warn`.
//!
//! ## Error Handling
//!
//! A call no rule is configured for is not an error, it falls through to the defaults of the
//! fake. Errors are reserved for inconsistent configuration, failed assertions and misuse of
//! scopes, see [`Error`].
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use fakescope::prelude::*;
///
/// let registry = std::sync::Arc::new(TypeRegistry::new()?);
/// let object = registry.object()?;
/// # Ok::<(), fakescope::Error>(())
/// ```
pub mod prelude;

pub mod arguments;
pub mod assertion;
pub mod call;
pub mod config;
pub mod fake;
pub mod matcher;
pub mod rules;
pub mod scope;
pub mod typesystem;
pub mod value;

/// `fakescope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `fakescope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust,no_run
/// use fakescope::{Error, FakeScope};
///
/// let outer = FakeScope::create();
/// let _inner = FakeScope::create();
/// match outer.dispose() {
///     Ok(()) => println!("disposed"),
///     Err(Error::ScopeOrder { disposed, current }) => {
///         println!("scope {} disposed while {} was current", disposed, current)
///     }
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

pub use assertion::Repeated;
pub use call::{CompletedCall, CompletedCallRc, FakeException, FakeObjectCall, InterceptedCall};
pub use config::FakeConfig;
pub use fake::{FakeObject, FakeObjectRc, RuleId};
pub use scope::{FakeScope, ScopeGuard};
pub use value::{ObjectRef, Value, ValueKind};
