use std::sync::Arc;

use crate::{
    arguments::{ArgumentValidator, ValidatorRc},
    Value,
};

struct NotValidator {
    inner: ValidatorRc,
    description: String,
}

impl ArgumentValidator for NotValidator {
    fn validate(&self, value: &Value) -> bool {
        !self.inner.validate(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

struct AndValidator {
    first: ValidatorRc,
    second: ValidatorRc,
    description: String,
}

impl ArgumentValidator for AndValidator {
    fn validate(&self, value: &Value) -> bool {
        self.first.validate(value) && self.second.validate(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

struct OrValidator {
    first: ValidatorRc,
    second: ValidatorRc,
    description: String,
}

impl ArgumentValidator for OrValidator {
    fn validate(&self, value: &Value) -> bool {
        self.first.validate(value) || self.second.validate(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Accepts exactly the values `inner` rejects. Described as `not <inner>`
#[must_use]
pub fn not(inner: ValidatorRc) -> ValidatorRc {
    Arc::new(NotValidator {
        description: format!("not {}", inner.describe()),
        inner,
    })
}

/// Accepts values both validators accept. Described as `<first> and (<second>)`
#[must_use]
pub fn and(first: ValidatorRc, second: ValidatorRc) -> ValidatorRc {
    Arc::new(AndValidator {
        description: format!("{} and ({})", first.describe(), second.describe()),
        first,
        second,
    })
}

/// Accepts values either validator accepts. Described as `<first> or (<second>)`
#[must_use]
pub fn or(first: ValidatorRc, second: ValidatorRc) -> ValidatorRc {
    Arc::new(OrValidator {
        description: format!("{} or ({})", first.describe(), second.describe()),
        first,
        second,
    })
}

/// Method syntax for the combinators
pub trait ValidatorExt {
    /// See [`and`]
    #[must_use]
    fn and(self, other: ValidatorRc) -> ValidatorRc;
    /// See [`or`]
    #[must_use]
    fn or(self, other: ValidatorRc) -> ValidatorRc;
    /// See [`not`]
    #[must_use]
    fn negate(self) -> ValidatorRc;
}

impl ValidatorExt for ValidatorRc {
    fn and(self, other: ValidatorRc) -> ValidatorRc {
        and(self, other)
    }

    fn or(self, other: ValidatorRc) -> ValidatorRc {
        or(self, other)
    }

    fn negate(self) -> ValidatorRc {
        not(self)
    }
}
