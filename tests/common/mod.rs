//! Type fixture shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use fakescope::prelude::*;

/// ```text
/// interface IService {
///     int Compute(int x);
///     void Reset();
///     string Name { get; set; }
///     IService Parent { get; }
///     bool TryGet(string key, out int value);
/// }
/// class Service : IService { virtual members of IService }
/// class Special : Service { override int Compute(int x); }
/// class Hiding : Special { new virtual int Compute(int x); }
/// ```
pub struct Fixture {
    pub registry: Arc<TypeRegistry>,
    pub int32: TypeRc,
    pub string: TypeRc,
    pub iservice: TypeRc,
    pub service: TypeRc,
    pub special: TypeRc,
    pub hiding: TypeRc,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(TypeRegistry::new()?);
        let int32 = registry.primitive(ValueKind::Int)?;
        let string = registry.primitive(ValueKind::String)?;
        let boolean = registry.primitive(ValueKind::Bool)?;
        let object = registry.object()?;

        let iservice = TypeBuilder::interface(&registry, "Demo", "IService")
            .method(
                MethodBuilder::new("Compute")
                    .with_param("x", &int32)
                    .with_return(&int32),
            )
            .method(MethodBuilder::new("Reset"))
            .property(PropertyBuilder::new("Name", &string))
            .property(PropertyBuilder::new("Parent", &object).read_only())
            .method(
                MethodBuilder::new("TryGet")
                    .with_param("key", &string)
                    .with_out_param("value", &int32)
                    .with_return(&boolean),
            )
            .build()?;

        let service = TypeBuilder::class(&registry, "Demo", "Service")
            .implements(&iservice)
            .method(
                MethodBuilder::new("Compute")
                    .with_param("x", &int32)
                    .with_return(&int32)
                    .with_virtual(),
            )
            .method(MethodBuilder::new("Reset").with_virtual())
            .property(PropertyBuilder::new("Name", &string).with_virtual())
            .property(PropertyBuilder::new("Parent", &object).read_only().with_virtual())
            .method(
                MethodBuilder::new("TryGet")
                    .with_param("key", &string)
                    .with_out_param("value", &int32)
                    .with_return(&boolean)
                    .with_virtual(),
            )
            .build()?;

        let special = TypeBuilder::class(&registry, "Demo", "Special")
            .extends(&service)
            .method(
                MethodBuilder::new("Compute")
                    .with_param("x", &int32)
                    .with_return(&int32)
                    .with_virtual(),
            )
            .build()?;

        let hiding = TypeBuilder::class(&registry, "Demo", "Hiding")
            .extends(&special)
            .method(
                MethodBuilder::new("Compute")
                    .with_param("x", &int32)
                    .with_return(&int32)
                    .with_virtual()
                    .with_new_slot(),
            )
            .build()?;

        Ok(Fixture {
            registry,
            int32,
            string,
            iservice,
            service,
            special,
            hiding,
        })
    }

    pub fn method(&self, declaring: &TypeRc, name: &str) -> MethodRc {
        declaring
            .method_by_name(name)
            .unwrap_or_else(|| panic!("{} declares no method {}", declaring.fullname(), name))
    }

    pub fn fake(&self, fake_type: &TypeRc) -> Result<FakeObjectRc> {
        FakeObject::new(&self.registry, fake_type)
    }
}
