//! Argument and return values flowing through intercepted calls.
//!
//! The interception layer converts whatever the faked member receives into [`Value`]s before
//! handing the call to the core, and converts the return value / out-ref values back when the
//! call completes. Values compare structurally, except for [`Value::Object`] which compares by
//! instance identity.
//!
//! # Key Types
//!
//! - [`Value`] - A single argument, return or out/ref value
//! - [`ValueKind`] - The discriminant of a [`Value`], also used to tag primitive types
//! - [`ObjectRef`] - Identity of an object instance (possibly a fake)

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Weak,
    },
};

use strum::{Display, EnumIter};

use crate::{
    fake::{FakeObject, FakeObjectRc},
    typesystem::{ManagedType, TypeFlavor, TypeRc},
};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// The kind of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ValueKind {
    /// The null reference
    Null,
    /// A boolean
    Bool,
    /// A signed integer of any width
    Int,
    /// An unsigned integer of any width
    UInt,
    /// A floating point number
    Float,
    /// A single character
    Char,
    /// A string
    String,
    /// An array of values
    Array,
    /// A reference to an object instance
    Object,
}

/// A value passed to, or returned from, a faked member
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null reference
    Null,
    /// A boolean
    Bool(bool),
    /// A signed integer
    Int(i64),
    /// An unsigned integer
    UInt(u64),
    /// A floating point number
    Float(f64),
    /// A single character
    Char(char),
    /// A string
    String(String),
    /// An array of values
    Array(Vec<Value>),
    /// A reference to an object instance
    Object(ObjectRef),
}

impl Value {
    /// Returns the kind of this value
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Float(_) => ValueKind::Float,
            Value::Char(_) => ValueKind::Char,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Returns true if this is the null reference
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean, if this is one
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the signed integer, if this is one
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the object reference, if this is an object
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Checks if this value is an instance of `target`
    ///
    /// Objects are checked against their runtime type (including base types and implemented
    /// interfaces). Primitive values are instances of the primitive types of their kind and of
    /// the root object type. `Null` is an instance of nothing.
    #[must_use]
    pub fn is_instance_of(&self, target: &ManagedType) -> bool {
        match self {
            Value::Null => false,
            Value::Object(object) => object.object_type().is_assignable_to(target),
            other => match target.flavor {
                TypeFlavor::Primitive(kind) => kind == other.kind(),
                TypeFlavor::Object => true,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::UInt(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Char(value) => write!(f, "'{}'", value),
            Value::String(value) => write!(f, "\"{}\"", value),
            Value::Array(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Object(object) => write!(f, "{}", object),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UInt(u64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Identity of one object instance.
///
/// Every `ObjectRef` created through [`ObjectRef::new`] gets a fresh, process-unique id; clones
/// share it. Two references are equal if and only if they denote the same instance. References
/// to fakes keep a weak link to their [`FakeObject`], so a value returned by an auto-faked
/// property can be configured like any other fake.
#[derive(Clone)]
pub struct ObjectRef {
    id: u64,
    object_type: TypeRc,
    fake: Weak<FakeObject>,
    is_fake: bool,
}

impl ObjectRef {
    /// Creates a reference to a new, non-faked instance of `object_type`
    #[must_use]
    pub fn new(object_type: &TypeRc) -> Self {
        ObjectRef {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            object_type: object_type.clone(),
            fake: Weak::new(),
            is_fake: false,
        }
    }

    pub(crate) fn for_fake(object_type: &TypeRc, fake: Weak<FakeObject>) -> Self {
        ObjectRef {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            object_type: object_type.clone(),
            fake,
            is_fake: true,
        }
    }

    /// The process-unique instance id
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The runtime type of the instance
    #[must_use]
    pub fn object_type(&self) -> &TypeRc {
        &self.object_type
    }

    /// True if this instance is a fake
    #[must_use]
    pub fn is_fake(&self) -> bool {
        self.is_fake
    }

    /// The fake behind this instance, if it is a fake that is still alive
    #[must_use]
    pub fn fake(&self) -> Option<FakeObjectRc> {
        self.fake.upgrade()
    }

    pub(crate) fn downgrade_fake(&self) -> Weak<FakeObject> {
        self.fake.clone()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &self.id)
            .field("type", &self.object_type.fullname())
            .field("is_fake", &self.is_fake)
            .finish()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fake {
            write!(f, "Faked {}", self.object_type.fullname())
        } else {
            write!(f, "{}", self.object_type.fullname())
        }
    }
}
