//! Receiver-relative method equivalence.
//!
//! A rule is configured with one method reference, a call arrives with another: the rule was
//! written against an interface method, the call hits the class implementing it; the rule
//! names a base class method, the call dispatches to an override. The [`MethodResolver`]
//! decides whether two method references denote the same invocable member *on a specific
//! receiver type*.
//!
//! # Algorithm
//!
//! Both methods are located on the receiver ("which member runs if this method is invoked on
//! an instance of the receiver type"), then the located members' identities are compared.
//! Locating a method tries, in order:
//!
//! 1. The most derived method of the receiver's hierarchy that shares the method's base
//!    definition (override chains, non-virtual members)
//! 2. The receiver's implementation of an interface method. The search starts at the most
//!    derived type that declares the interface and walks toward the root, explicit
//!    implementations first, then the implicit implementation with the same signature. The
//!    implementation found is then followed down its override chain; `NEW_SLOT` members of
//!    more derived types hide it without taking over the interface slot
//! 3. For class methods implementing an interface method of their declaring type, the
//!    receiver's implementation of that interface method
//!
//! Generic instantiations are located through their generic definition and closed over the
//! same generic arguments afterwards.
//!
//! # Caching
//!
//! Results are cached by `(receiver, first, second)` with the two identities ordered, so the
//! symmetric question shares the entry. The cache is a `DashMap` and safe to use from any
//! number of threads.

use dashmap::DashMap;

use crate::typesystem::{MethodIdentity, MethodRc, Token, TypeRc, TypeRef};

type CacheKey = (Token, MethodIdentity, MethodIdentity);

/// Resolves whether two method references denote the same member on a receiver type
#[derive(Default)]
pub struct MethodResolver {
    cache: DashMap<CacheKey, bool>,
}

impl MethodResolver {
    /// Create a resolver with an empty cache
    pub fn new() -> Self {
        MethodResolver {
            cache: DashMap::new(),
        }
    }

    /// Checks if invoking `first` and invoking `second` on an instance of `receiver` would
    /// run the same member
    ///
    /// ## Arguments
    /// * 'receiver' - The runtime type of the instance the methods are invoked on
    /// * 'first'    - The first method reference
    /// * 'second'   - The second method reference
    pub fn equivalent(&self, receiver: &TypeRc, first: &MethodRc, second: &MethodRc) -> bool {
        let first_identity = first.identity();
        let second_identity = second.identity();
        if first_identity == second_identity {
            return true;
        }

        let key = if first_identity < second_identity {
            (receiver.token, first_identity, second_identity)
        } else {
            (receiver.token, second_identity, first_identity)
        };

        if let Some(cached) = self.cache.get(&key).map(|entry| *entry) {
            return cached;
        }

        let result = match (
            self.method_invoked_on(receiver, first),
            self.method_invoked_on(receiver, second),
        ) {
            (Some(located_first), Some(located_second)) => {
                located_first.identity() == located_second.identity()
            }
            _ => false,
        };

        log::trace!(
            "Resolved {} and {} on {}: {}",
            first.fullname(),
            second.fullname(),
            receiver.fullname(),
            result
        );
        self.cache.insert(key, result);

        result
    }

    /// Locates the member that runs when `method` is invoked on an instance of `receiver`
    ///
    /// Returns `None` if the receiver has no member corresponding to `method`.
    pub fn method_invoked_on(&self, receiver: &TypeRc, method: &MethodRc) -> Option<MethodRc> {
        let definition = method.generic_definition().unwrap_or_else(|| method.clone());

        let located = self
            .find_by_base_definition(receiver, &definition)
            .or_else(|| self.find_interface_implementation(receiver, &definition))
            .or_else(|| self.find_through_implemented_interface(receiver, &definition))?;

        if method.is_generic_instance() && located.is_generic_definition() {
            let args: Vec<TypeRc> = method
                .generic_args
                .iter()
                .filter_map(TypeRef::upgrade)
                .collect();
            located.make_generic(&args).ok()
        } else {
            Some(located)
        }
    }

    /// Number of cached equivalence results
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop all cached results
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn find_by_base_definition(&self, receiver: &TypeRc, method: &MethodRc) -> Option<MethodRc> {
        if method
            .declaring_type()
            .is_some_and(|declaring| declaring.is_interface())
        {
            return None;
        }

        let target = method.base_definition();
        receiver.hierarchy().into_iter().find_map(|ty| {
            ty.methods
                .iter()
                .map(|(_, candidate)| candidate)
                .find(|candidate| {
                    candidate.generic_arity == method.generic_arity
                        && candidate.base_definition().token == target.token
                })
                .cloned()
        })
    }

    fn find_interface_implementation(
        &self,
        receiver: &TypeRc,
        method: &MethodRc,
    ) -> Option<MethodRc> {
        let interface = method.declaring_type()?;
        if !interface.is_interface() {
            return None;
        }

        if receiver.is_interface() {
            return (receiver.token == interface.token || receiver.implements(&interface))
                .then(|| method.clone());
        }

        if !receiver.implements(&interface) {
            return None;
        }

        // The interface map comes from the most derived type declaring the interface, a
        // subclass hiding a member without re-declaring the interface does not change it
        let hierarchy = receiver.hierarchy();
        let declaring_index = hierarchy
            .iter()
            .position(|ty| declares_interface(ty, &interface))?;

        let implementation = hierarchy[declaring_index..].iter().find_map(|ty| {
            ty.method_impls
                .iter()
                .find(|(_, method_impl)| {
                    method_impl
                        .interface_method
                        .upgrade()
                        .is_some_and(|implemented| implemented.token == method.token)
                })
                .and_then(|(_, method_impl)| method_impl.body.upgrade())
                .or_else(|| {
                    ty.methods
                        .iter()
                        .map(|(_, candidate)| candidate)
                        .find(|candidate| {
                            !candidate.is_static() && candidate.same_signature(method)
                        })
                        .cloned()
                })
        })?;

        Some(
            self.find_by_base_definition(receiver, &implementation)
                .unwrap_or(implementation),
        )
    }

    fn find_through_implemented_interface(
        &self,
        receiver: &TypeRc,
        method: &MethodRc,
    ) -> Option<MethodRc> {
        let declaring = method.declaring_type()?;
        if declaring.is_interface() {
            return None;
        }

        for interface in declaring.all_interfaces() {
            for (_, interface_method) in interface.methods.iter() {
                let implemented_by_method = self
                    .find_interface_implementation(&declaring, interface_method)
                    .is_some_and(|implementation| implementation.token == method.token);
                if implemented_by_method {
                    return self.find_interface_implementation(receiver, interface_method);
                }
            }
        }

        None
    }
}

/// Checks if `ty` lists `interface` in its own interface list, directly or through an
/// inherited interface
fn declares_interface(ty: &TypeRc, interface: &TypeRc) -> bool {
    ty.interfaces
        .iter()
        .filter_map(|(_, declared)| declared.upgrade())
        .any(|declared| declared.token == interface.token || declared.implements(interface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::test_types;

    #[test]
    fn test_identical_methods() {
        let types = test_types();
        let bar = types.ifoo.method_by_name("Bar").unwrap();
        let resolver = MethodResolver::new();

        assert!(resolver.equivalent(&types.ifoo, &bar, &bar));
        assert_eq!(resolver.cache_len(), 0);
    }

    #[test]
    fn test_override_is_equivalent_to_base() {
        let types = test_types();
        let base_bar = types.base.method_by_name("Bar").unwrap();
        let derived_bar = types.derived.method_by_name("Bar").unwrap();
        let resolver = MethodResolver::new();

        assert!(resolver.equivalent(&types.derived, &base_bar, &derived_bar));
        assert!(resolver.equivalent(&types.derived, &derived_bar, &base_bar));
    }

    #[test]
    fn test_interface_method_is_equivalent_to_implementation() {
        let types = test_types();
        let ifoo_bar = types.ifoo.method_by_name("Bar").unwrap();
        let base_bar = types.base.method_by_name("Bar").unwrap();
        let derived_bar = types.derived.method_by_name("Bar").unwrap();
        let resolver = MethodResolver::new();

        assert!(resolver.equivalent(&types.base, &ifoo_bar, &base_bar));
        assert!(resolver.equivalent(&types.derived, &ifoo_bar, &derived_bar));
        assert!(resolver.equivalent(&types.derived, &ifoo_bar, &base_bar));
    }

    #[test]
    fn test_inherited_interface_method() {
        let types = test_types();
        let ping = types.ibase.method_by_name("Ping").unwrap();
        let base_ping = types.base.method_by_name("Ping").unwrap();
        let resolver = MethodResolver::new();

        assert!(resolver.equivalent(&types.base, &ping, &base_ping));
        assert!(resolver.equivalent(&types.derived, &ping, &base_ping));
    }

    #[test]
    fn test_class_method_on_interface_receiver() {
        let types = test_types();
        let ifoo_bar = types.ifoo.method_by_name("Bar").unwrap();
        let base_bar = types.base.method_by_name("Bar").unwrap();
        let resolver = MethodResolver::new();

        assert!(resolver.equivalent(&types.ifoo, &base_bar, &ifoo_bar));
    }

    #[test]
    fn test_hiding_method_is_not_equivalent() {
        let types = test_types();
        let base_describe = types.base.method_by_name("Describe").unwrap();
        let derived_describe = types.derived.method_by_name("Describe").unwrap();
        let resolver = MethodResolver::new();

        assert!(!resolver.equivalent(&types.derived, &base_describe, &derived_describe));
    }

    #[test]
    fn test_hiding_method_does_not_take_interface_slot() {
        let types = test_types();
        let ifoo_describe = types.method(&types.ifoo, "Describe");
        let base_describe = types.method(&types.base, "Describe");
        let derived_describe = types.method(&types.derived, "Describe");
        let resolver = MethodResolver::new();

        let located = resolver
            .method_invoked_on(&types.derived, &ifoo_describe)
            .unwrap();
        assert_eq!(located.token, base_describe.token);
        assert!(resolver.equivalent(&types.derived, &ifoo_describe, &base_describe));
        assert!(!resolver.equivalent(&types.derived, &ifoo_describe, &derived_describe));
        assert!(!resolver.equivalent(&types.ifoo, &derived_describe, &ifoo_describe));
    }

    #[test]
    fn test_redeclared_interface_maps_to_hiding_method() {
        let types = test_types();
        let ifoo_describe = types.method(&types.ifoo, "Describe");
        let base_describe = types.method(&types.base, "Describe");
        let derived_describe = types.method(&types.derived, "Describe");
        let resolver = MethodResolver::new();

        let located = resolver
            .method_invoked_on(&types.rebound, &ifoo_describe)
            .unwrap();
        assert_eq!(located.token, derived_describe.token);
        assert!(!resolver.equivalent(&types.rebound, &ifoo_describe, &base_describe));

        // Members the hiding type does not declare still map to the base implementation
        let ifoo_bar = types.method(&types.ifoo, "Bar");
        let derived_bar = types.method(&types.derived, "Bar");
        assert!(resolver.equivalent(&types.rebound, &ifoo_bar, &derived_bar));
    }

    #[test]
    fn test_unrelated_methods() {
        let types = test_types();
        let bar = types.ifoo.method_by_name("Bar").unwrap();
        let ping = types.ibase.method_by_name("Ping").unwrap();
        let resolver = MethodResolver::new();

        assert!(!resolver.equivalent(&types.derived, &bar, &ping));
    }

    #[test]
    fn test_explicit_implementation() {
        let types = test_types();
        let ping = types.ibase.method_by_name("Ping").unwrap();
        let body = types.explicit.method_by_name("Tests.IBase.Ping").unwrap();
        let public_ping = types.explicit.method_by_name("Ping").unwrap();
        let resolver = MethodResolver::new();

        assert!(resolver.equivalent(&types.explicit, &ping, &body));
        assert!(!resolver.equivalent(&types.explicit, &ping, &public_ping));
    }

    #[test]
    fn test_generic_instantiations() {
        let types = test_types();
        let get = types.ifoo.method_by_name("Get").unwrap();
        let base_get = types.base.method_by_name("Get").unwrap();
        let resolver = MethodResolver::new();

        let get_int = get.make_generic(&[types.int32.clone()]).unwrap();
        let get_int_again = get.make_generic(&[types.int32.clone()]).unwrap();
        let get_string = get.make_generic(&[types.string.clone()]).unwrap();
        let base_get_int = base_get.make_generic(&[types.int32.clone()]).unwrap();

        assert!(resolver.equivalent(&types.ifoo, &get_int, &get_int_again));
        assert!(!resolver.equivalent(&types.ifoo, &get_int, &get_string));
        assert!(resolver.equivalent(&types.base, &get_int, &base_get_int));
        assert!(!resolver.equivalent(&types.base, &get_string, &base_get_int));
    }

    #[test]
    fn test_property_accessors() {
        let types = test_types();
        let getter = types.ifoo.method_by_name("get_Name").unwrap();
        let base_getter = types.base.method_by_name("get_Name").unwrap();
        let setter = types.ifoo.method_by_name("set_Name").unwrap();
        let resolver = MethodResolver::new();

        assert!(resolver.equivalent(&types.derived, &getter, &base_getter));
        assert!(!resolver.equivalent(&types.derived, &setter, &base_getter));
    }

    #[test]
    fn test_cache_is_symmetric() {
        let types = test_types();
        let ifoo_bar = types.ifoo.method_by_name("Bar").unwrap();
        let base_bar = types.base.method_by_name("Bar").unwrap();
        let resolver = MethodResolver::new();

        resolver.equivalent(&types.base, &ifoo_bar, &base_bar);
        resolver.equivalent(&types.base, &base_bar, &ifoo_bar);
        assert_eq!(resolver.cache_len(), 1);

        resolver.equivalent(&types.derived, &base_bar, &ifoo_bar);
        assert_eq!(resolver.cache_len(), 2);

        resolver.clear_cache();
        assert_eq!(resolver.cache_len(), 0);
    }

    #[test]
    fn test_method_invoked_on() {
        let types = test_types();
        let ifoo_bar = types.ifoo.method_by_name("Bar").unwrap();
        let derived_bar = types.derived.method_by_name("Bar").unwrap();
        let resolver = MethodResolver::new();

        let located = resolver.method_invoked_on(&types.derived, &ifoo_bar).unwrap();
        assert_eq!(located.token, derived_bar.token);
        assert!(resolver.method_invoked_on(&types.ichild, &ifoo_bar).is_none());
    }
}
