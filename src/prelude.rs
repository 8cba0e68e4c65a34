//! # fakescope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the fakescope library. Import this module to get quick access to everything needed
//! to describe types, configure fakes and assert on their calls.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all fakescope operations
pub use crate::Error;

/// The result type used throughout fakescope
pub use crate::Result;

/// Configuration of fake objects
pub use crate::FakeConfig;

/// Values passed to and returned from faked members
pub use crate::{ObjectRef, Value, ValueKind};

// ================================================================================================
// Type System
// ================================================================================================

/// Type model and builders
pub use crate::typesystem::{
    ManagedType, Method, MethodBuilder, MethodRc, MethodResolver, PropertyBuilder, TypeBuilder,
    TypeRc, TypeRegistry,
};

// ================================================================================================
// Fakes, Calls and Scopes
// ================================================================================================

/// Fake objects and their rule handles
pub use crate::fake::{FakeObject, FakeObjectRc, InterceptionListener, RuleId};

/// Call records
pub use crate::call::{
    CompletedCall, CompletedCallRc, FakeException, FakeObjectCall, InterceptedCall,
};

/// Scopes
pub use crate::scope::{FakeScope, ScopeGuard};

// ================================================================================================
// Configuration
// ================================================================================================

/// Argument validators
pub use crate::arguments::{
    contains, equal_to, greater_than, ignored, instance_of, is_not_null, is_null, less_than,
    matches, same_sequence_as, starts_with, ArgumentValidator, ValidatorExt, ValidatorRc,
};

/// Call matchers
pub use crate::matcher::{AnyCallMatcher, CallMatcher, ExpressionCallMatcher, PredicateCallMatcher};

/// Configurable rules
pub use crate::rules::{AnyCallRule, CallRule, ConfigurableRule, ExpressionRule, PredicateRule};

// ================================================================================================
// Assertions
// ================================================================================================

/// Repeat constraints and the raw asserter
pub use crate::assertion::{FakeAsserter, Repeated};
