//! Methods of the managed type model.
//!
//! A [`Method`] carries everything the method-identity resolver needs: its signature, its
//! modifiers, the method it overrides, the property it is an accessor of, and for closed
//! generic instantiations the generic definition plus the concrete generic arguments.

use std::{
    fmt,
    sync::{Arc, OnceLock, Weak},
};

use bitflags::bitflags;

use crate::{
    typesystem::{PropertyRc, PropertyRef, Token, TypeFlavor, TypeRc, TypeRef},
    Error::TypeError,
    Result,
};

/// A vector that holds a list of `Method`
pub type MethodList = boxcar::Vec<MethodRc>;
/// Reference to a `Method`
pub type MethodRc = Arc<Method>;

/// A smart reference to a `Method` that holds a weak reference
#[derive(Clone, Debug)]
pub struct MethodRef {
    weak_ref: Weak<Method>,
}

impl MethodRef {
    /// Create a new `MethodRef` from a strong reference
    pub fn new(strong_ref: &MethodRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the method, returning None if it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<MethodRc> {
        self.weak_ref.upgrade()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method modifiers
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method can not be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Parameter attributes
    pub struct ParamAttributes: u32 {
        /// Param is \[In\]
        const IN = 0x0001;
        /// Param is \[out\]
        const OUT = 0x0002;
        /// Param is optional
        const OPTIONAL = 0x0010;
    }
}

/// A single method parameter
#[derive(Clone, Debug)]
pub struct Parameter {
    /// Name of the parameter
    pub name: String,
    /// Declared type of the parameter
    pub param_type: TypeRef,
    /// Parameter is passed by reference (`ref` / `out`)
    pub by_ref: bool,
    /// Parameter attributes
    pub flags: ParamAttributes,
}

impl Parameter {
    /// True for parameters whose slot the callee may write to
    #[must_use]
    pub fn is_out_or_ref(&self) -> bool {
        self.by_ref
    }
}

/// The accessor role of a method
#[derive(Clone, Debug)]
pub enum MethodSemantics {
    /// The method is the getter of the property
    Getter(PropertyRef),
    /// The method is the setter of the property
    Setter(PropertyRef),
}

/// The identity key of a method: its token plus, for closed generic instantiations, the
/// tokens of the generic arguments.
///
/// Two methods with the same identity are the same invocable member.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodIdentity {
    /// Token of the method (the generic definition's token for instantiations)
    pub token: Token,
    /// Tokens of the generic arguments, empty unless the method is a closed instantiation
    pub generic_args: Vec<Token>,
}

/// A method declared by a `ManagedType`
pub struct Method {
    /// Token
    pub token: Token,
    /// Name
    pub name: String,
    /// Modifiers
    pub modifiers: MethodModifiers,
    /// Parameters in declaration order
    pub params: Vec<Parameter>,
    /// Return type (`System.Void` for methods without a return value)
    pub return_type: TypeRef,
    /// Number of generic parameters of the method definition
    pub generic_arity: usize,
    /// Generic arguments, non-empty for closed instantiations only
    pub generic_args: Vec<TypeRef>,
    declaring_type: OnceLock<TypeRef>,
    overrides: OnceLock<MethodRef>,
    semantics: OnceLock<MethodSemantics>,
    generic_definition: OnceLock<MethodRef>,
}

impl Method {
    /// Create a new method, not yet attached to a declaring type
    pub fn new(
        token: Token,
        name: String,
        modifiers: MethodModifiers,
        params: Vec<Parameter>,
        return_type: &TypeRc,
        generic_arity: usize,
    ) -> Self {
        Method {
            token,
            name,
            modifiers,
            params,
            return_type: TypeRef::new(return_type),
            generic_arity,
            generic_args: Vec::new(),
            declaring_type: OnceLock::new(),
            overrides: OnceLock::new(),
            semantics: OnceLock::new(),
            generic_definition: OnceLock::new(),
        }
    }

    /// The identity key of this method
    #[must_use]
    pub fn identity(&self) -> MethodIdentity {
        MethodIdentity {
            token: self.token,
            generic_args: self
                .generic_args
                .iter()
                .filter_map(TypeRef::token)
                .collect(),
        }
    }

    /// The type declaring this method
    pub fn declaring_type(&self) -> Option<TypeRc> {
        self.declaring_type.get().and_then(TypeRef::upgrade)
    }

    pub(crate) fn set_declaring_type(&self, declaring: &TypeRc) {
        self.declaring_type.set(TypeRef::new(declaring)).ok();
    }

    /// The method this one directly overrides, if any
    pub fn overridden(&self) -> Option<MethodRc> {
        self.overrides.get().and_then(MethodRef::upgrade)
    }

    pub(crate) fn set_overrides(&self, base: &MethodRc) {
        self.overrides.set(MethodRef::new(base)).ok();
    }

    /// The property accessor role of this method, if any
    pub fn semantics(&self) -> Option<&MethodSemantics> {
        self.semantics.get()
    }

    pub(crate) fn set_semantics(&self, semantics: MethodSemantics) {
        self.semantics.set(semantics).ok();
    }

    /// The property this method is the getter of
    pub fn getter_of(&self) -> Option<PropertyRc> {
        match self.semantics.get() {
            Some(MethodSemantics::Getter(property)) => property.upgrade(),
            _ => None,
        }
    }

    /// The property this method is the setter of
    pub fn setter_of(&self) -> Option<PropertyRc> {
        match self.semantics.get() {
            Some(MethodSemantics::Setter(property)) => property.upgrade(),
            _ => None,
        }
    }

    /// The generic definition of a closed instantiation
    pub fn generic_definition(&self) -> Option<MethodRc> {
        self.generic_definition.get().and_then(MethodRef::upgrade)
    }

    /// The return type of the method
    pub fn return_type(&self) -> Option<TypeRc> {
        self.return_type.upgrade()
    }

    /// True if the method has no return value
    pub fn returns_void(&self) -> bool {
        self.return_type()
            .is_none_or(|ty| ty.flavor == TypeFlavor::Void)
    }

    /// True for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MethodModifiers::STATIC)
    }

    /// True for virtual methods
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.modifiers.contains(MethodModifiers::VIRTUAL)
    }

    /// True for methods without an implementation
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(MethodModifiers::ABSTRACT)
    }

    /// True for generic method definitions (open, not instantiated)
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        self.generic_arity > 0 && self.generic_args.is_empty()
    }

    /// True for closed generic instantiations
    #[must_use]
    pub fn is_generic_instance(&self) -> bool {
        !self.generic_args.is_empty()
    }

    /// Follows the override chain to the method that introduced the vtable slot
    pub fn base_definition(self: &Arc<Self>) -> MethodRc {
        let mut current = self.clone();
        // Bounded walk, override chains can not be longer than the number of base types
        for _ in 0..256 {
            match current.overridden() {
                Some(base) => current = base,
                None => break,
            }
        }
        current
    }

    /// Checks if both methods have the same name, generic arity and parameter list
    pub fn same_signature(&self, other: &Method) -> bool {
        self.name == other.name
            && self.generic_arity == other.generic_arity
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(left, right)| {
                    left.by_ref == right.by_ref
                        && left.param_type.token() == right.param_type.token()
                })
    }

    /// Indices of all out and ref parameters, in declaration order
    #[must_use]
    pub fn out_and_ref_indices(&self) -> Vec<usize> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, param)| param.is_out_or_ref())
            .map(|(index, _)| index)
            .collect()
    }

    /// Closes a generic method definition over concrete generic arguments
    ///
    /// ## Arguments
    /// * 'args' - The generic arguments, one per generic parameter
    ///
    /// # Errors
    /// Returns an error if the method is not a generic definition or the number of
    /// arguments does not match its generic arity
    pub fn make_generic(self: &Arc<Self>, args: &[TypeRc]) -> Result<MethodRc> {
        if !self.is_generic_definition() {
            return Err(TypeError(format!(
                "{} is not a generic method definition",
                self.name
            )));
        }
        if args.len() != self.generic_arity {
            return Err(TypeError(format!(
                "{} expects {} generic arguments, got {}",
                self.name,
                self.generic_arity,
                args.len()
            )));
        }

        let instance = Method {
            token: self.token,
            name: self.name.clone(),
            modifiers: self.modifiers,
            params: self.params.clone(),
            return_type: self.return_type.clone(),
            generic_arity: self.generic_arity,
            generic_args: args.iter().map(TypeRef::new).collect(),
            declaring_type: OnceLock::new(),
            overrides: OnceLock::new(),
            semantics: OnceLock::new(),
            generic_definition: OnceLock::new(),
        };
        if let Some(declaring) = self.declaring_type() {
            instance.set_declaring_type(&declaring);
        }
        instance.generic_definition.set(MethodRef::new(self)).ok();

        Ok(Arc::new(instance))
    }

    /// Returns the full name (Namespace.Type.Name) of the method
    pub fn fullname(&self) -> String {
        match self.declaring_type() {
            Some(declaring) => format!("{}.{}", declaring.fullname(), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("token", &self.token)
            .field("name", &self.fullname())
            .field("modifiers", &self.modifiers)
            .field("generic_arity", &self.generic_arity)
            .field("generic_args", &self.identity().generic_args)
            .finish()
    }
}
