//! Managed type model used to resolve method identities.
//!
//! Deciding whether two method references denote "the same" member on a receiver requires a
//! model of the receiver's type: its base types, the interfaces it implements, which methods
//! override which, and which methods implement which interface slots. This module provides
//! that model, independent of how the faked types are declared in the host program.
//!
//! # Key Components
//!
//! - [`ManagedType`]: A class, interface, value type or primitive with its members
//! - [`Method`]: A method, including override links, property semantics and generic arity
//! - [`Property`]: A property with its getter and setter accessors
//! - [`TypeRegistry`]: Owner of all types, hands out tokens and provides the [`MethodResolver`]
//! - [`TypeBuilder`]: Builder pattern for declaring types together with their members
//! - [`MethodResolver`]: Receiver-relative method equivalence with a concurrent cache
//!
//! # Ownership
//!
//! The registry owns every type strongly. Types own their methods and properties. All links
//! pointing "sideways" or "upwards" (base types, interfaces, declaring types, overridden
//! methods, parameter types) are weak, so the graph never forms reference cycles.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fakescope::typesystem::{MethodBuilder, TypeBuilder, TypeRegistry};
//! use fakescope::ValueKind;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let int32 = registry.primitive(ValueKind::Int)?;
//!
//! let calculator = TypeBuilder::interface(&registry, "Demo", "ICalculator")
//!     .method(MethodBuilder::new("Add").with_param("a", &int32).with_param("b", &int32).with_return(&int32))
//!     .build()?;
//!
//! assert!(calculator.is_fakeable());
//! # Ok::<(), fakescope::Error>(())
//! ```

mod builder;
mod method;
mod property;
mod registry;
mod resolver;
mod token;

use std::{
    collections::HashSet,
    sync::{Arc, OnceLock, Weak},
};

use bitflags::bitflags;

pub use builder::{MethodBuilder, PropertyBuilder, TypeBuilder};
pub use method::{
    Method, MethodIdentity, MethodList, MethodModifiers, MethodRc, MethodRef, MethodSemantics,
    ParamAttributes, Parameter,
};
pub use property::{Property, PropertyList, PropertyRc, PropertyRef};
pub use registry::{ObjectMembers, TypeRegistry};
pub use resolver::MethodResolver;
pub use token::{Token, MAX_ROW, TABLE_METHOD, TABLE_PROPERTY, TABLE_TYPE};

use crate::{value::ValueKind, Error::TypeError, Result, Value};

/// Reference to a `ManagedType`
pub type TypeRc = Arc<ManagedType>;
/// A vector that holds `TypeRef` instances (weak references)
pub type TypeRefList = boxcar::Vec<TypeRef>;

/// A smart reference to a `ManagedType` that holds a weak reference, to prevent circular
/// reference memory leaks while providing a clean API
#[derive(Clone, Debug)]
pub struct TypeRef {
    weak_ref: Weak<ManagedType>,
}

impl TypeRef {
    /// Create a new `TypeRef` from a strong reference
    pub fn new(strong_ref: &TypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning None if the type has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeRc> {
        self.weak_ref.upgrade()
    }

    /// Get the token of the referenced type (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }
}

impl From<&TypeRc> for TypeRef {
    fn from(strong_ref: &TypeRc) -> Self {
        Self::new(strong_ref)
    }
}

/// The kind of a `ManagedType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// The absence of a value, only valid as a return type
    Void,
    /// The root of the class hierarchy
    Object,
    /// A built-in type whose instances are plain [`Value`]s of the given kind
    Primitive(ValueKind),
    /// A reference type
    Class,
    /// An interface
    Interface,
    /// A user-defined value type
    ValueType,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Type attributes relevant for faking
    pub struct TypeAttributes: u32 {
        /// Type is abstract
        const ABSTRACT = 0x0080;
        /// Type can not be derived from
        const SEALED = 0x0100;
    }
}

/// An explicit interface implementation: `body` implements `interface_method` without being
/// reachable through its own name
#[derive(Clone, Debug)]
pub struct MethodImpl {
    /// The interface method being implemented
    pub interface_method: MethodRef,
    /// The method providing the implementation
    pub body: MethodRef,
}

/// Represents a type of the faked program: a class, interface, value type or primitive.
pub struct ManagedType {
    /// Token
    pub token: Token,
    /// Namespace (can be empty)
    pub namespace: String,
    /// Name
    pub name: String,
    /// The `TypeFlavor`
    pub flavor: TypeFlavor,
    /// Flags
    pub flags: TypeAttributes,
    /// This types base aka 'extends'
    base: OnceLock<TypeRef>,
    /// All interfaces this type directly implements (or extends, for interfaces)
    pub interfaces: TypeRefList,
    /// All methods this type declares, including property accessors
    pub methods: MethodList,
    /// All properties this type declares
    pub properties: PropertyList,
    /// All explicit interface implementations this type declares
    pub method_impls: boxcar::Vec<MethodImpl>,
}

impl ManagedType {
    /// Create a new instance of a `ManagedType`
    pub fn new(
        token: Token,
        namespace: String,
        name: String,
        flavor: TypeFlavor,
        flags: TypeAttributes,
    ) -> Self {
        ManagedType {
            token,
            namespace,
            name,
            flavor,
            flags,
            base: OnceLock::new(),
            interfaces: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
            properties: boxcar::Vec::new(),
            method_impls: boxcar::Vec::new(),
        }
    }

    /// Returns the full name (Namespace.Name) of the type
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Access the base type of this type, if it exists
    pub fn base(&self) -> Option<TypeRc> {
        self.base.get().and_then(TypeRef::upgrade)
    }

    /// Set the base type, can only be done once
    ///
    /// ## Arguments
    /// * 'base' - The type this type extends
    ///
    /// # Errors
    /// Returns an error if the base type has already been set
    pub fn set_base(&self, base: &TypeRc) -> Result<()> {
        self.base
            .set(TypeRef::new(base))
            .map_err(|_| TypeError(format!("Base type of {} already set", self.fullname())))
    }

    /// True for interfaces
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flavor == TypeFlavor::Interface
    }

    /// True if the type can not be derived from
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.flags.contains(TypeAttributes::SEALED)
    }

    /// True if a fake can be created for this type: interfaces, and classes that are not
    /// sealed
    #[must_use]
    pub fn is_fakeable(&self) -> bool {
        match self.flavor {
            TypeFlavor::Interface => true,
            TypeFlavor::Class | TypeFlavor::Object => !self.is_sealed(),
            _ => false,
        }
    }

    /// Returns this type followed by all of its base types, most derived first
    pub fn hierarchy(self: &Arc<Self>) -> Vec<TypeRc> {
        let mut chain = vec![self.clone()];
        let mut current = self.base();
        while let Some(ty) = current {
            // A broken model could contain a cycle; stop instead of looping forever
            if chain.iter().any(|seen| seen.token == ty.token) {
                break;
            }
            current = ty.base();
            chain.push(ty);
        }
        chain
    }

    /// Returns all interfaces this type implements, directly, through its base types or
    /// through interface inheritance
    pub fn all_interfaces(self: &Arc<Self>) -> Vec<TypeRc> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut pending: Vec<TypeRc> = Vec::new();

        for ty in self.hierarchy() {
            for (_, interface) in ty.interfaces.iter() {
                if let Some(interface) = interface.upgrade() {
                    pending.push(interface);
                }
            }
        }

        while let Some(interface) = pending.pop() {
            if !seen.insert(interface.token) {
                continue;
            }
            for (_, inherited) in interface.interfaces.iter() {
                if let Some(inherited) = inherited.upgrade() {
                    pending.push(inherited);
                }
            }
            result.push(interface);
        }

        result
    }

    /// Checks if this type implements `interface`
    pub fn implements(self: &Arc<Self>, interface: &ManagedType) -> bool {
        interface.is_interface()
            && self
                .all_interfaces()
                .iter()
                .any(|candidate| candidate.token == interface.token)
    }

    /// Checks if an instance of this type can be used where `target` is expected
    pub fn is_assignable_to(self: &Arc<Self>, target: &ManagedType) -> bool {
        if target.flavor == TypeFlavor::Object {
            return true;
        }
        if target.is_interface() {
            return self.token == target.token || self.implements(target);
        }
        self.hierarchy().iter().any(|ty| ty.token == target.token)
    }

    /// Returns the first declared method with the given name
    pub fn method_by_name(&self, name: &str) -> Option<MethodRc> {
        self.methods
            .iter()
            .find(|(_, method)| method.name == name)
            .map(|(_, method)| method.clone())
    }

    /// Returns the declared property with the given name
    pub fn property_by_name(&self, name: &str) -> Option<PropertyRc> {
        self.properties
            .iter()
            .find(|(_, property)| property.name == name)
            .map(|(_, property)| property.clone())
    }

    /// The value a member returning this type produces when nothing is configured
    ///
    /// Returns `None` for `Void`. Reference types, strings and arrays default to `Null`.
    #[must_use]
    pub fn default_value(&self) -> Option<Value> {
        match self.flavor {
            TypeFlavor::Void => None,
            TypeFlavor::Primitive(kind) => Some(match kind {
                ValueKind::Bool => Value::Bool(false),
                ValueKind::Int => Value::Int(0),
                ValueKind::UInt => Value::UInt(0),
                ValueKind::Float => Value::Float(0.0),
                ValueKind::Char => Value::Char('\0'),
                _ => Value::Null,
            }),
            _ => Some(Value::Null),
        }
    }
}
