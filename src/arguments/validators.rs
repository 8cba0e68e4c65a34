use std::sync::Arc;

use crate::{
    arguments::{ArgumentValidator, ValidatorRc},
    typesystem::TypeRc,
    Value,
};

/// Accepts values structurally equal to a captured value
struct EqualityValidator {
    expected: Value,
    description: String,
}

impl ArgumentValidator for EqualityValidator {
    fn validate(&self, value: &Value) -> bool {
        *value == self.expected
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Accepts values for which a predicate holds
struct PredicateValidator<F> {
    predicate: F,
    description: String,
}

impl<F> ArgumentValidator for PredicateValidator<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn validate(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Accepts values that are instances of a type
struct InstanceOfValidator {
    target: TypeRc,
    description: String,
}

impl ArgumentValidator for InstanceOfValidator {
    fn validate(&self, value: &Value) -> bool {
        value.is_instance_of(&self.target)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// The default validator: accepts values structurally equal to `expected`
///
/// Described by the display form of the expected value, e.g. `"text"` or `42`.
#[must_use]
pub fn equal_to(expected: impl Into<Value>) -> ValidatorRc {
    let expected = expected.into();
    Arc::new(EqualityValidator {
        description: expected.to_string(),
        expected,
    })
}

/// Accepts any value
#[must_use]
pub fn ignored() -> ValidatorRc {
    matches(|_| true, "<Ignored>")
}

/// Accepts values for which `predicate` holds
///
/// ## Arguments
/// * 'predicate'   - The check to run, must be free of side effects
/// * 'description' - Text shown for this validator in diagnostics
pub fn matches<F>(predicate: F, description: &str) -> ValidatorRc
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(PredicateValidator {
        predicate,
        description: description.to_string(),
    })
}

/// Accepts instances of `target`, including instances of derived types and implementations
/// of interfaces
#[must_use]
pub fn instance_of(target: &TypeRc) -> ValidatorRc {
    Arc::new(InstanceOfValidator {
        description: format!("Instance of {}", target.fullname()),
        target: target.clone(),
    })
}

/// Accepts only the null reference
#[must_use]
pub fn is_null() -> ValidatorRc {
    matches(Value::is_null, "NULL")
}

/// Accepts everything but the null reference
#[must_use]
pub fn is_not_null() -> ValidatorRc {
    matches(|value| !value.is_null(), "NOT NULL")
}

/// Accepts strings containing `needle`
#[must_use]
pub fn contains(needle: &str) -> ValidatorRc {
    let needle = needle.to_string();
    let description = format!("string that contains \"{}\"", needle);
    matches(
        move |value| value.as_str().is_some_and(|s| s.contains(needle.as_str())),
        &description,
    )
}

/// Accepts strings starting with `prefix`
#[must_use]
pub fn starts_with(prefix: &str) -> ValidatorRc {
    let prefix = prefix.to_string();
    let description = format!("string that starts with \"{}\"", prefix);
    matches(
        move |value| value.as_str().is_some_and(|s| s.starts_with(prefix.as_str())),
        &description,
    )
}

/// Accepts numbers strictly greater than `bound`
#[must_use]
pub fn greater_than(bound: i64) -> ValidatorRc {
    matches(
        move |value| numeric(value).is_some_and(|n| n > bound as f64),
        &format!("greater than {}", bound),
    )
}

/// Accepts numbers strictly less than `bound`
#[must_use]
pub fn less_than(bound: i64) -> ValidatorRc {
    matches(
        move |value| numeric(value).is_some_and(|n| n < bound as f64),
        &format!("less than {}", bound),
    )
}

/// Accepts arrays with the same elements, in the same order, as `expected`
#[must_use]
pub fn same_sequence_as(expected: Vec<Value>) -> ValidatorRc {
    let expected = Value::Array(expected);
    let description = format!("same sequence as {}", expected);
    matches(move |value| *value == expected, &description)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::UInt(u) => Some(*u as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}
