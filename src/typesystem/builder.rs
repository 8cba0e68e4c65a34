//! Builders for declaring managed types and their members.
//!
//! The host program's interception layer describes the types it fakes through these
//! builders. A [`TypeBuilder`] collects the type's base, interfaces, methods, properties and
//! explicit interface implementations, then [`TypeBuilder::build`] allocates tokens, wires
//! all links (declaring types, overrides, accessor semantics) and registers the type.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fakescope::typesystem::{MethodBuilder, PropertyBuilder, TypeBuilder, TypeRegistry};
//! use fakescope::ValueKind;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let int32 = registry.primitive(ValueKind::Int)?;
//! let string = registry.primitive(ValueKind::String)?;
//!
//! let service = TypeBuilder::interface(&registry, "Demo", "IService")
//!     .method(MethodBuilder::new("Compute").with_param("x", &int32).with_return(&int32))
//!     .property(PropertyBuilder::new("Name", &string))
//!     .build()?;
//!
//! let implementation = TypeBuilder::class(&registry, "Demo", "Service")
//!     .implements(&service)
//!     .method(MethodBuilder::new("Compute").with_param("x", &int32).with_return(&int32).with_virtual())
//!     .build()?;
//! # Ok::<(), fakescope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    typesystem::{
        ManagedType, Method, MethodImpl, MethodModifiers, MethodRc, MethodRef, MethodSemantics,
        ParamAttributes, Parameter, Property, PropertyRef, TypeAttributes, TypeFlavor, TypeRc,
        TypeRef, TypeRegistry,
    },
    Error::TypeError,
    Result,
};

/// Declaration of a single method
#[derive(Clone)]
pub struct MethodBuilder {
    name: String,
    params: Vec<(String, TypeRc, bool, ParamAttributes)>,
    return_type: Option<TypeRc>,
    modifiers: MethodModifiers,
    generic_arity: usize,
}

impl MethodBuilder {
    /// Start declaring a non-virtual instance method returning void
    pub fn new(name: &str) -> Self {
        MethodBuilder {
            name: name.to_string(),
            params: Vec::new(),
            return_type: None,
            modifiers: MethodModifiers::empty(),
            generic_arity: 0,
        }
    }

    /// Append a by-value parameter
    #[must_use]
    pub fn with_param(mut self, name: &str, param_type: &TypeRc) -> Self {
        self.params.push((
            name.to_string(),
            param_type.clone(),
            false,
            ParamAttributes::empty(),
        ));
        self
    }

    /// Append an `out` parameter
    #[must_use]
    pub fn with_out_param(mut self, name: &str, param_type: &TypeRc) -> Self {
        self.params.push((
            name.to_string(),
            param_type.clone(),
            true,
            ParamAttributes::OUT,
        ));
        self
    }

    /// Append a `ref` parameter
    #[must_use]
    pub fn with_ref_param(mut self, name: &str, param_type: &TypeRc) -> Self {
        self.params.push((
            name.to_string(),
            param_type.clone(),
            true,
            ParamAttributes::empty(),
        ));
        self
    }

    /// Set the return type
    #[must_use]
    pub fn with_return(mut self, return_type: &TypeRc) -> Self {
        self.return_type = Some(return_type.clone());
        self
    }

    /// Mark the method as virtual; it overrides a matching virtual base method if one exists
    #[must_use]
    pub fn with_virtual(mut self) -> Self {
        self.modifiers |= MethodModifiers::VIRTUAL;
        self
    }

    /// Mark the method as abstract (implies virtual)
    #[must_use]
    pub fn with_abstract(mut self) -> Self {
        self.modifiers |= MethodModifiers::VIRTUAL | MethodModifiers::ABSTRACT;
        self
    }

    /// Mark the method as static
    #[must_use]
    pub fn with_static(mut self) -> Self {
        self.modifiers |= MethodModifiers::STATIC;
        self
    }

    /// Mark the method as final (sealed override)
    #[must_use]
    pub fn with_final(mut self) -> Self {
        self.modifiers |= MethodModifiers::FINAL;
        self
    }

    /// Give the method a new vtable slot, hiding instead of overriding base methods
    #[must_use]
    pub fn with_new_slot(mut self) -> Self {
        self.modifiers |= MethodModifiers::NEW_SLOT;
        self
    }

    /// Declare the method as a generic definition with `arity` generic parameters
    #[must_use]
    pub fn with_generic(mut self, arity: usize) -> Self {
        self.generic_arity = arity;
        self
    }
}

/// Declaration of a single property
#[derive(Clone)]
pub struct PropertyBuilder {
    name: String,
    property_type: TypeRc,
    readable: bool,
    writable: bool,
    modifiers: MethodModifiers,
}

impl PropertyBuilder {
    /// Start declaring a read/write property
    pub fn new(name: &str, property_type: &TypeRc) -> Self {
        PropertyBuilder {
            name: name.to_string(),
            property_type: property_type.clone(),
            readable: true,
            writable: true,
            modifiers: MethodModifiers::empty(),
        }
    }

    /// Only declare a getter
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.readable = true;
        self.writable = false;
        self
    }

    /// Only declare a setter
    #[must_use]
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self.writable = true;
        self
    }

    /// Make both accessors virtual
    #[must_use]
    pub fn with_virtual(mut self) -> Self {
        self.modifiers |= MethodModifiers::VIRTUAL;
        self
    }
}

/// Builder for a `ManagedType` and all of its members
pub struct TypeBuilder {
    registry: Arc<TypeRegistry>,
    namespace: String,
    name: String,
    flavor: TypeFlavor,
    flags: TypeAttributes,
    base: Option<TypeRc>,
    interfaces: Vec<TypeRc>,
    methods: Vec<MethodBuilder>,
    properties: Vec<PropertyBuilder>,
    explicit_impls: Vec<MethodRc>,
}

impl TypeBuilder {
    fn new(registry: &Arc<TypeRegistry>, namespace: &str, name: &str, flavor: TypeFlavor) -> Self {
        TypeBuilder {
            registry: registry.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            flavor,
            flags: TypeAttributes::empty(),
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            explicit_impls: Vec::new(),
        }
    }

    /// Start declaring a class
    pub fn class(registry: &Arc<TypeRegistry>, namespace: &str, name: &str) -> Self {
        Self::new(registry, namespace, name, TypeFlavor::Class)
    }

    /// Start declaring an interface
    pub fn interface(registry: &Arc<TypeRegistry>, namespace: &str, name: &str) -> Self {
        Self::new(registry, namespace, name, TypeFlavor::Interface)
    }

    /// Start declaring a value type (implicitly sealed)
    pub fn value_type(registry: &Arc<TypeRegistry>, namespace: &str, name: &str) -> Self {
        let mut builder = Self::new(registry, namespace, name, TypeFlavor::ValueType);
        builder.flags |= TypeAttributes::SEALED;
        builder
    }

    /// Mark the type as sealed
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.flags |= TypeAttributes::SEALED;
        self
    }

    /// Mark the type as abstract
    #[must_use]
    pub fn with_abstract(mut self) -> Self {
        self.flags |= TypeAttributes::ABSTRACT;
        self
    }

    /// Set the base class. Classes without an explicit base extend `System.Object`
    #[must_use]
    pub fn extends(mut self, base: &TypeRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Add an implemented interface (or, for interfaces, an inherited interface)
    #[must_use]
    pub fn implements(mut self, interface: &TypeRc) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    /// Declare a method
    #[must_use]
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Declare a property with its accessors
    #[must_use]
    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.properties.push(property);
        self
    }

    /// Declare an explicit implementation of `interface_method`.
    ///
    /// The body gets the interface method's signature and the name `Ns.IFace.Method`, so it
    /// is only reachable through the interface.
    #[must_use]
    pub fn explicit_impl(mut self, interface_method: &MethodRc) -> Self {
        self.explicit_impls.push(interface_method.clone());
        self
    }

    /// Create the type, wire all member links and register it
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] if the declaration is inconsistent (an interface
    /// with a base class, a sealed or non-class base, a non-interface in the interface
    /// list, or an explicit implementation of an interface the type does not implement), or
    /// [`crate::Error::TypeInsert`] if a type with the same name already exists
    pub fn build(self) -> Result<TypeRc> {
        self.validate()?;

        let new_type = Arc::new(ManagedType::new(
            self.registry.next_type_token()?,
            self.namespace.clone(),
            self.name.clone(),
            self.flavor,
            self.flags,
        ));

        match (&self.base, self.flavor) {
            (_, TypeFlavor::Interface) => {}
            (Some(base), _) => new_type.set_base(base)?,
            (None, _) => new_type.set_base(&self.registry.object()?)?,
        }

        for interface in &self.interfaces {
            new_type.interfaces.push(TypeRef::new(interface));
        }

        let void = self.registry.void()?;
        for declaration in &self.methods {
            let return_type = declaration.return_type.as_ref().unwrap_or(&void);
            let params = declaration
                .params
                .iter()
                .map(|(name, param_type, by_ref, flags)| Parameter {
                    name: name.clone(),
                    param_type: TypeRef::new(param_type),
                    by_ref: *by_ref,
                    flags: *flags,
                })
                .collect();

            let method = Arc::new(Method::new(
                self.registry.next_method_token()?,
                declaration.name.clone(),
                self.member_modifiers(declaration.modifiers),
                params,
                return_type,
                declaration.generic_arity,
            ));
            self.attach(&new_type, &method);
        }

        for declaration in &self.properties {
            self.build_property(&new_type, declaration, &void)?;
        }

        for interface_method in &self.explicit_impls {
            let interface = interface_method.declaring_type().ok_or_else(|| {
                TypeError(format!(
                    "Explicitly implemented method {} has no declaring type",
                    interface_method.name
                ))
            })?;
            if !new_type.implements(&interface) {
                return Err(TypeError(format!(
                    "{} does not implement {}",
                    new_type.fullname(),
                    interface.fullname()
                )));
            }

            let return_type = interface_method.return_type().unwrap_or_else(|| void.clone());
            let body = Arc::new(Method::new(
                self.registry.next_method_token()?,
                format!("{}.{}", interface.fullname(), interface_method.name),
                MethodModifiers::FINAL | MethodModifiers::VIRTUAL | MethodModifiers::NEW_SLOT,
                interface_method.params.clone(),
                &return_type,
                interface_method.generic_arity,
            ));
            body.set_declaring_type(&new_type);
            new_type.methods.push(body.clone());
            new_type.method_impls.push(MethodImpl {
                interface_method: MethodRef::new(interface_method),
                body: MethodRef::new(&body),
            });
        }

        self.registry.insert(&new_type)?;
        log::debug!("Registered type {} ({})", new_type.fullname(), new_type.token);

        Ok(new_type)
    }

    fn validate(&self) -> Result<()> {
        if let Some(base) = &self.base {
            if self.flavor == TypeFlavor::Interface {
                return Err(TypeError(format!(
                    "Interface {}.{} can not extend a class",
                    self.namespace, self.name
                )));
            }
            if base.is_sealed() {
                return Err(TypeError(format!(
                    "{}.{} can not extend sealed type {}",
                    self.namespace,
                    self.name,
                    base.fullname()
                )));
            }
            if !matches!(base.flavor, TypeFlavor::Class | TypeFlavor::Object) {
                return Err(TypeError(format!(
                    "{}.{} can not extend {}, it is not a class",
                    self.namespace,
                    self.name,
                    base.fullname()
                )));
            }
        }

        if let Some(interface) = self.interfaces.iter().find(|ty| !ty.is_interface()) {
            return Err(TypeError(format!(
                "{}.{} can not implement {}, it is not an interface",
                self.namespace,
                self.name,
                interface.fullname()
            )));
        }

        Ok(())
    }

    fn member_modifiers(&self, declared: MethodModifiers) -> MethodModifiers {
        if self.flavor == TypeFlavor::Interface && !declared.contains(MethodModifiers::STATIC) {
            declared | MethodModifiers::VIRTUAL | MethodModifiers::ABSTRACT
        } else {
            declared
        }
    }

    /// Adds `method` to `new_type`, linking it to the base method it overrides
    fn attach(&self, new_type: &TypeRc, method: &MethodRc) {
        method.set_declaring_type(new_type);

        if method.is_virtual()
            && !method.modifiers.contains(MethodModifiers::NEW_SLOT)
            && !new_type.is_interface()
        {
            let overridden = new_type.base().and_then(|base| {
                base.hierarchy().into_iter().find_map(|ty| {
                    ty.methods
                        .iter()
                        .map(|(_, candidate)| candidate)
                        .find(|candidate| {
                            candidate.is_virtual()
                                && !candidate.modifiers.contains(MethodModifiers::FINAL)
                                && candidate.same_signature(method)
                        })
                        .cloned()
                })
            });
            if let Some(overridden) = overridden {
                method.set_overrides(&overridden);
            }
        }

        new_type.methods.push(method.clone());
    }

    fn build_property(
        &self,
        new_type: &TypeRc,
        declaration: &PropertyBuilder,
        void: &TypeRc,
    ) -> Result<()> {
        let property = Arc::new(Property::new(
            self.registry.next_property_token()?,
            declaration.name.clone(),
            &declaration.property_type,
        ));
        property.set_declaring_type(new_type);
        let modifiers = self.member_modifiers(declaration.modifiers);

        if declaration.readable {
            let getter = Arc::new(Method::new(
                self.registry.next_method_token()?,
                format!("get_{}", declaration.name),
                modifiers,
                Vec::new(),
                &declaration.property_type,
                0,
            ));
            getter.set_semantics(MethodSemantics::Getter(PropertyRef::new(&property)));
            property.set_getter(&getter);
            self.attach(new_type, &getter);
        }

        if declaration.writable {
            let setter = Arc::new(Method::new(
                self.registry.next_method_token()?,
                format!("set_{}", declaration.name),
                modifiers,
                vec![Parameter {
                    name: "value".to_string(),
                    param_type: TypeRef::new(&declaration.property_type),
                    by_ref: false,
                    flags: ParamAttributes::empty(),
                }],
                void,
                0,
            ));
            setter.set_semantics(MethodSemantics::Setter(PropertyRef::new(&property)));
            property.set_setter(&setter);
            self.attach(new_type, &setter);
        }

        new_type.properties.push(property);
        Ok(())
    }
}
