use std::sync::{Arc, OnceLock, Weak};

use crate::typesystem::{MethodRc, MethodRef, Token, TypeRc, TypeRef};

/// A vector that holds a list of `Property`
pub type PropertyList = boxcar::Vec<PropertyRc>;
/// Reference to a `Property`
pub type PropertyRc = Arc<Property>;

/// A smart reference to a `Property` that holds a weak reference
#[derive(Clone, Debug)]
pub struct PropertyRef {
    weak_ref: Weak<Property>,
}

impl PropertyRef {
    /// Create a new `PropertyRef` from a strong reference
    pub fn new(strong_ref: &PropertyRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the property, returning None if it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<PropertyRc> {
        self.weak_ref.upgrade()
    }
}

/// A property, represented by up to two accessor methods
pub struct Property {
    /// Token
    pub token: Token,
    /// Name
    pub name: String,
    /// Type of the property value
    pub property_type: TypeRef,
    declaring_type: OnceLock<TypeRef>,
    getter: OnceLock<MethodRef>,
    setter: OnceLock<MethodRef>,
}

impl Property {
    /// Create a new property without accessors
    pub fn new(token: Token, name: String, property_type: &TypeRc) -> Self {
        Property {
            token,
            name,
            property_type: TypeRef::new(property_type),
            declaring_type: OnceLock::new(),
            getter: OnceLock::new(),
            setter: OnceLock::new(),
        }
    }

    /// The type of the property value
    pub fn property_type(&self) -> Option<TypeRc> {
        self.property_type.upgrade()
    }

    /// The type declaring this property
    pub fn declaring_type(&self) -> Option<TypeRc> {
        self.declaring_type.get().and_then(TypeRef::upgrade)
    }

    pub(crate) fn set_declaring_type(&self, declaring: &TypeRc) {
        self.declaring_type.set(TypeRef::new(declaring)).ok();
    }

    /// The getter accessor
    pub fn getter(&self) -> Option<MethodRc> {
        self.getter.get().and_then(MethodRef::upgrade)
    }

    pub(crate) fn set_getter(&self, getter: &MethodRc) {
        self.getter.set(MethodRef::new(getter)).ok();
    }

    /// The setter accessor
    pub fn setter(&self) -> Option<MethodRc> {
        self.setter.get().and_then(MethodRef::upgrade)
    }

    pub(crate) fn set_setter(&self, setter: &MethodRc) {
        self.setter.set(MethodRef::new(setter)).ok();
    }
}
