//! Benchmarks for rule resolution and method identity.
//!
//! - Cached and uncached equivalence checks
//! - Intercepting calls on a fake with many rules, the matching rule added first
//! - Intercepting calls that fall through to the default rule

extern crate fakescope;

use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, Criterion};
use fakescope::prelude::*;

struct Types {
    registry: Arc<TypeRegistry>,
    service: TypeRc,
    special: TypeRc,
}

/// interface IService { int Compute(int x); }  class Service : IService  class Special : Service
fn types() -> Types {
    let registry = Arc::new(TypeRegistry::new().unwrap());
    let int32 = registry.primitive(ValueKind::Int).unwrap();
    let compute = || {
        MethodBuilder::new("Compute")
            .with_param("x", &int32)
            .with_return(&int32)
    };

    let iservice = TypeBuilder::interface(&registry, "Bench", "IService")
        .method(compute())
        .build()
        .unwrap();
    let service = TypeBuilder::class(&registry, "Bench", "Service")
        .implements(&iservice)
        .method(compute().with_virtual())
        .build()
        .unwrap();
    let special = TypeBuilder::class(&registry, "Bench", "Special")
        .extends(&service)
        .method(compute().with_virtual())
        .build()
        .unwrap();

    Types {
        registry,
        service,
        special,
    }
}

/// Benchmark equivalence of an interface method and its override, answered from the cache.
fn bench_equivalent_cached(c: &mut Criterion) {
    let types = types();
    let base = types.service.method_by_name("Compute").unwrap();
    let derived = types.special.method_by_name("Compute").unwrap();
    let resolver = types.registry.resolver();
    resolver.equivalent(&types.special, &base, &derived);

    c.bench_function("equivalent_cached", |b| {
        b.iter(|| black_box(resolver.equivalent(black_box(&types.special), &base, &derived)));
    });
}

/// Benchmark equivalence with an empty cache, walking the hierarchy every time.
fn bench_equivalent_uncached(c: &mut Criterion) {
    let types = types();
    let base = types.service.method_by_name("Compute").unwrap();
    let derived = types.special.method_by_name("Compute").unwrap();
    let resolver = types.registry.resolver();

    c.bench_function("equivalent_uncached", |b| {
        b.iter(|| {
            resolver.clear_cache();
            black_box(resolver.equivalent(black_box(&types.special), &base, &derived))
        });
    });
}

/// Benchmark a call matched by the oldest of 50 rules.
fn bench_intercept_many_rules(c: &mut Criterion) {
    let types = types();
    let compute = types.special.method_by_name("Compute").unwrap();
    let fake = FakeObject::new(&types.registry, &types.special).unwrap();

    fake.add_rule(ExpressionRule::ignoring_arguments(&compute).returns(1));
    for value in 0..49 {
        fake.add_rule(ExpressionRule::with_values(&compute, vec![Value::from(1000 + value)]).returns(2));
    }

    c.bench_function("intercept_50_rules", |b| {
        b.iter(|| black_box(fake.invoke(&compute, vec![Value::from(black_box(7))]).unwrap()));
    });
}

/// Benchmark a call no rule applies to.
fn bench_intercept_default(c: &mut Criterion) {
    let types = types();
    let compute = types.special.method_by_name("Compute").unwrap();
    let fake = FakeObject::with_config(&types.registry, &types.special, FakeConfig::minimal())
        .unwrap();

    c.bench_function("intercept_default", |b| {
        b.iter(|| black_box(fake.invoke(&compute, vec![Value::from(black_box(7))]).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_equivalent_cached,
    bench_equivalent_uncached,
    bench_intercept_many_rules,
    bench_intercept_default
);
criterion_main!(benches);
