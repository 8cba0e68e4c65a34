//! Central type registry.
//!
//! This module provides the `TypeRegistry`, a thread-safe registry owning every
//! [`ManagedType`] that fakes are created for or that appears in member signatures. It hands
//! out unique tokens, provides lookup by token and by full name, and owns the
//! [`MethodResolver`] shared by every fake created against it.
//!
//! # Built-in Types
//!
//! A new registry is pre-populated with the root object type and the primitive types:
//!
//! - `System.Void`, `System.Object`
//! - `System.Boolean`, `System.Char`, `System.Int32`, `System.Int64`, `System.UInt32`,
//!   `System.UInt64`, `System.Double`, `System.String`, `System.Array`
//!
//! `System.Object` declares the virtual members `Equals(object)`, `GetHashCode()` and
//! `ToString()`, which every fake answers through its object-member rule.
//!
//! # Thread Safety
//!
//! - Lock-free primary storage using `SkipMap`
//! - Concurrent name index using `DashMap`
//! - Atomic token generation, failing once a table runs out of 24-bit rows
//!
//! # Examples
//!
//! ```rust,no_run
//! use fakescope::typesystem::TypeRegistry;
//!
//! let registry = TypeRegistry::new()?;
//! let string = registry.get_by_fullname("System.String").unwrap();
//! println!("String type: {}", string.token);
//! # Ok::<(), fakescope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, OnceLock,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    typesystem::{
        ManagedType, Method, MethodModifiers, MethodRc, MethodResolver, ParamAttributes,
        Parameter, Token, TypeAttributes, TypeFlavor, TypeRc, TypeRef, MAX_ROW, TABLE_METHOD,
        TABLE_PROPERTY, TABLE_TYPE,
    },
    value::ValueKind,
    Error::{TypeError, TypeInsert},
    Result,
};

/// The members of the root object type every fake responds to
#[derive(Clone)]
pub struct ObjectMembers {
    /// `System.Object.Equals(object)`
    pub equals: MethodRc,
    /// `System.Object.GetHashCode()`
    pub get_hash_code: MethodRc,
    /// `System.Object.ToString()`
    pub to_string: MethodRc,
}

/// Central registry for all types known to the fakes created against it.
///
/// Types are registered once and live as long as the registry. The registry is shared via
/// `Arc` between the [`crate::typesystem::TypeBuilder`]s declaring types and the
/// [`crate::FakeObject`]s faking them.
pub struct TypeRegistry {
    /// Primary storage, by token
    types: SkipMap<Token, TypeRc>,
    /// Full name index
    types_by_fullname: DashMap<String, Token>,
    /// Next free row in the type table
    next_type_row: AtomicU32,
    /// Next free row in the method table
    next_method_row: AtomicU32,
    /// Next free row in the property table
    next_property_row: AtomicU32,
    /// Members of `System.Object`
    object_members: OnceLock<ObjectMembers>,
    /// Method equivalence resolver for this registry's types
    resolver: MethodResolver,
}

impl TypeRegistry {
    /// Create a new registry, initialized with the built-in types
    ///
    /// # Errors
    /// Returns an error if the built-in types could not be registered
    pub fn new() -> Result<Self> {
        let registry = TypeRegistry {
            types: SkipMap::new(),
            types_by_fullname: DashMap::new(),
            next_type_row: AtomicU32::new(1),
            next_method_row: AtomicU32::new(1),
            next_property_row: AtomicU32::new(1),
            object_members: OnceLock::new(),
            resolver: MethodResolver::new(),
        };

        registry.register_builtin("Void", TypeFlavor::Void)?;
        let object = registry.register_builtin("Object", TypeFlavor::Object)?;
        for (name, kind) in [
            ("Boolean", ValueKind::Bool),
            ("Char", ValueKind::Char),
            ("Int32", ValueKind::Int),
            ("Int64", ValueKind::Int),
            ("UInt32", ValueKind::UInt),
            ("UInt64", ValueKind::UInt),
            ("Double", ValueKind::Float),
            ("String", ValueKind::String),
            ("Array", ValueKind::Array),
        ] {
            let primitive = registry.register_builtin(name, TypeFlavor::Primitive(kind))?;
            primitive.set_base(&object)?;
        }

        let members = ObjectMembers {
            equals: registry.object_method(
                &object,
                "Equals",
                vec![Parameter {
                    name: "obj".to_string(),
                    param_type: TypeRef::new(&object),
                    by_ref: false,
                    flags: ParamAttributes::empty(),
                }],
                &registry.primitive(ValueKind::Bool)?,
            )?,
            get_hash_code: registry.object_method(
                &object,
                "GetHashCode",
                Vec::new(),
                &registry.primitive(ValueKind::Int)?,
            )?,
            to_string: registry.object_method(
                &object,
                "ToString",
                Vec::new(),
                &registry.primitive(ValueKind::String)?,
            )?,
        };
        registry
            .object_members
            .set(members)
            .map_err(|_| TypeError("System.Object members already initialized".to_string()))?;

        Ok(registry)
    }

    fn register_builtin(&self, name: &str, flavor: TypeFlavor) -> Result<TypeRc> {
        let flags = match flavor {
            TypeFlavor::Object => TypeAttributes::empty(),
            _ => TypeAttributes::SEALED,
        };
        let builtin = Arc::new(ManagedType::new(
            self.next_type_token()?,
            "System".to_string(),
            name.to_string(),
            flavor,
            flags,
        ));
        self.insert(&builtin)?;
        Ok(builtin)
    }

    fn object_method(
        &self,
        object: &TypeRc,
        name: &str,
        params: Vec<Parameter>,
        return_type: &TypeRc,
    ) -> Result<MethodRc> {
        let method = Arc::new(Method::new(
            self.next_method_token()?,
            name.to_string(),
            MethodModifiers::VIRTUAL | MethodModifiers::NEW_SLOT,
            params,
            return_type,
            0,
        ));
        method.set_declaring_type(object);
        object.methods.push(method.clone());
        Ok(method)
    }

    fn allocate(counter: &AtomicU32, table: u8, table_name: &str) -> Result<Token> {
        counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |row| {
                (row <= MAX_ROW).then_some(row + 1)
            })
            .map(|row| Token::from_parts(table, row))
            .map_err(|_| {
                TypeError(format!(
                    "The {} table is full, no row above {:#x} can be allocated",
                    table_name, MAX_ROW
                ))
            })
    }

    /// Allocate a new, unique type token
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] once the type table has run out of rows
    pub fn next_type_token(&self) -> Result<Token> {
        Self::allocate(&self.next_type_row, TABLE_TYPE, "type")
    }

    /// Allocate a new, unique method token
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] once the method table has run out of rows
    pub fn next_method_token(&self) -> Result<Token> {
        Self::allocate(&self.next_method_row, TABLE_METHOD, "method")
    }

    /// Allocate a new, unique property token
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] once the property table has run out of rows
    pub fn next_property_token(&self) -> Result<Token> {
        Self::allocate(&self.next_property_row, TABLE_PROPERTY, "property")
    }

    /// Register a new type
    ///
    /// ## Arguments
    /// * 'new_type' - The type to register
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if a type with the same full name or token is
    /// already registered
    pub fn insert(&self, new_type: &TypeRc) -> Result<()> {
        if self.types.contains_key(&new_type.token) {
            return Err(TypeInsert(new_type.token));
        }

        match self.types_by_fullname.entry(new_type.fullname()) {
            Entry::Occupied(_) => Err(TypeInsert(new_type.token)),
            Entry::Vacant(slot) => {
                slot.insert(new_type.token);
                self.types.insert(new_type.token, new_type.clone());
                Ok(())
            }
        }
    }

    /// Get a type by its token
    pub fn get(&self, token: &Token) -> Option<TypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Get a type by its full name (Namespace.Name)
    pub fn get_by_fullname(&self, fullname: &str) -> Option<TypeRc> {
        let token = *self.types_by_fullname.get(fullname)?;
        self.get(&token)
    }

    /// The primitive type used for values of `kind`
    ///
    /// # Errors
    /// Returns an error for kinds without a primitive type (`Null`)
    pub fn primitive(&self, kind: ValueKind) -> Result<TypeRc> {
        let name = match kind {
            ValueKind::Bool => "System.Boolean",
            ValueKind::Int => "System.Int32",
            ValueKind::UInt => "System.UInt32",
            ValueKind::Float => "System.Double",
            ValueKind::Char => "System.Char",
            ValueKind::String => "System.String",
            ValueKind::Array => "System.Array",
            ValueKind::Object => "System.Object",
            ValueKind::Null => {
                return Err(TypeError("There is no primitive type for null".to_string()))
            }
        };

        self.get_by_fullname(name)
            .ok_or_else(|| TypeError(format!("Built-in type {} is missing", name)))
    }

    /// `System.Void`
    ///
    /// # Errors
    /// Returns an error if the built-in type is missing
    pub fn void(&self) -> Result<TypeRc> {
        self.get_by_fullname("System.Void")
            .ok_or_else(|| TypeError("Built-in type System.Void is missing".to_string()))
    }

    /// `System.Object`
    ///
    /// # Errors
    /// Returns an error if the built-in type is missing
    pub fn object(&self) -> Result<TypeRc> {
        self.primitive(ValueKind::Object)
    }

    /// The members of `System.Object`
    ///
    /// # Errors
    /// Returns an error if the registry was not fully initialized
    pub fn object_members(&self) -> Result<&ObjectMembers> {
        self.object_members
            .get()
            .ok_or_else(|| TypeError("System.Object members are missing".to_string()))
    }

    /// The method equivalence resolver for the types of this registry
    pub fn resolver(&self) -> &MethodResolver {
        &self.resolver
    }

    /// Returns all registered types, in token order
    pub fn types(&self) -> Vec<TypeRc> {
        self.types.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns the number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
