use std::sync::Arc;

use crate::{
    fake::{FakeObject, FakeObjectRc},
    typesystem::{MethodBuilder, MethodRc, PropertyBuilder, TypeBuilder, TypeRc, TypeRegistry},
    CompletedCallRc, Result, Value, ValueKind,
};

/// A small type hierarchy shared by the unit tests
///
/// ```text
/// interface IBase   { void Ping(); }
/// interface IChild  { int Value { get; set; } }
/// interface IFoo : IBase {
///     int Bar(int x);
///     string Describe();
///     string Name { get; set; }
///     IChild Child { get; }
///     object Get<T>();
///     bool TryParse(string s, out int value, ref int count);
/// }
/// class Base : IFoo {
///     virtual int Bar(int x);  void Ping();  virtual string Describe();
///     virtual string Name { get; set; }  virtual IChild Child { get; }
///     virtual object Get<T>();  virtual bool TryParse(string s, out int value, ref int count);
/// }
/// class Derived : Base { override int Bar(int x); new virtual string Describe(); override string Name; }
/// class Rebound : Derived, IFoo { }
/// sealed class Sealed { }
/// class Explicit : IBase { void Ping(); void IBase.Ping(); }
/// ```
pub struct TestTypes {
    pub registry: Arc<TypeRegistry>,
    pub object: TypeRc,
    pub void: TypeRc,
    pub int32: TypeRc,
    pub string: TypeRc,
    pub boolean: TypeRc,
    pub ibase: TypeRc,
    pub ifoo: TypeRc,
    pub ichild: TypeRc,
    pub base: TypeRc,
    pub derived: TypeRc,
    pub rebound: TypeRc,
    pub sealed: TypeRc,
    pub explicit: TypeRc,
}

impl TestTypes {
    // Helper function to look up a declared method by type and name
    pub fn method(&self, declaring: &TypeRc, name: &str) -> MethodRc {
        declaring.method_by_name(name).unwrap()
    }
}

// Helper function to create the shared type hierarchy in a fresh registry
pub fn test_types() -> TestTypes {
    let registry = Arc::new(TypeRegistry::new().unwrap());
    let object = registry.object().unwrap();
    let void = registry.void().unwrap();
    let int32 = registry.primitive(ValueKind::Int).unwrap();
    let string = registry.primitive(ValueKind::String).unwrap();
    let boolean = registry.primitive(ValueKind::Bool).unwrap();

    let ibase = TypeBuilder::interface(&registry, "Tests", "IBase")
        .method(MethodBuilder::new("Ping"))
        .build()
        .unwrap();

    let ichild = TypeBuilder::interface(&registry, "Tests", "IChild")
        .property(PropertyBuilder::new("Value", &int32))
        .build()
        .unwrap();

    let ifoo = TypeBuilder::interface(&registry, "Tests", "IFoo")
        .implements(&ibase)
        .method(
            MethodBuilder::new("Bar")
                .with_param("x", &int32)
                .with_return(&int32),
        )
        .method(MethodBuilder::new("Describe").with_return(&string))
        .property(PropertyBuilder::new("Name", &string))
        .property(PropertyBuilder::new("Child", &ichild).read_only())
        .method(MethodBuilder::new("Get").with_generic(1).with_return(&object))
        .method(
            MethodBuilder::new("TryParse")
                .with_param("s", &string)
                .with_out_param("value", &int32)
                .with_ref_param("count", &int32)
                .with_return(&boolean),
        )
        .build()
        .unwrap();

    let base = TypeBuilder::class(&registry, "Tests", "Base")
        .implements(&ifoo)
        .method(
            MethodBuilder::new("Bar")
                .with_param("x", &int32)
                .with_return(&int32)
                .with_virtual(),
        )
        .method(MethodBuilder::new("Ping"))
        .method(
            MethodBuilder::new("Describe")
                .with_return(&string)
                .with_virtual(),
        )
        .property(PropertyBuilder::new("Name", &string).with_virtual())
        .property(
            PropertyBuilder::new("Child", &ichild)
                .read_only()
                .with_virtual(),
        )
        .method(
            MethodBuilder::new("Get")
                .with_generic(1)
                .with_return(&object)
                .with_virtual(),
        )
        .method(
            MethodBuilder::new("TryParse")
                .with_param("s", &string)
                .with_out_param("value", &int32)
                .with_ref_param("count", &int32)
                .with_return(&boolean)
                .with_virtual(),
        )
        .build()
        .unwrap();

    let derived = TypeBuilder::class(&registry, "Tests", "Derived")
        .extends(&base)
        .method(
            MethodBuilder::new("Bar")
                .with_param("x", &int32)
                .with_return(&int32)
                .with_virtual(),
        )
        .method(
            MethodBuilder::new("Describe")
                .with_return(&string)
                .with_virtual()
                .with_new_slot(),
        )
        .property(PropertyBuilder::new("Name", &string).with_virtual())
        .build()
        .unwrap();

    let rebound = TypeBuilder::class(&registry, "Tests", "Rebound")
        .extends(&derived)
        .implements(&ifoo)
        .build()
        .unwrap();

    let sealed = TypeBuilder::class(&registry, "Tests", "Sealed")
        .sealed()
        .build()
        .unwrap();

    let ping = ibase.method_by_name("Ping").unwrap();
    let explicit = TypeBuilder::class(&registry, "Tests", "Explicit")
        .implements(&ibase)
        .method(MethodBuilder::new("Ping"))
        .explicit_impl(&ping)
        .build()
        .unwrap();

    TestTypes {
        registry,
        object,
        void,
        int32,
        string,
        boolean,
        ibase,
        ifoo,
        ichild,
        base,
        derived,
        rebound,
        sealed,
        explicit,
    }
}

// Helper function to create a fake with the default configuration
pub fn create_fake(types: &TestTypes, fake_type: &TypeRc) -> FakeObjectRc {
    FakeObject::new(&types.registry, fake_type).unwrap()
}

// Helper function to invoke a method on a fake the way the interception layer would
pub fn invoke(fake: &FakeObjectRc, method: &MethodRc, arguments: Vec<Value>) -> Result<CompletedCallRc> {
    fake.invoke(method, arguments)
}
