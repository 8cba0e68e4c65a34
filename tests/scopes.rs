//! Integration tests for scoped configuration and call visibility.

mod common;

use common::Fixture;
use fakescope::prelude::*;

#[test]
fn test_nested_scope_reverts_to_parent_configuration() -> Result<()> {
    let fixture = Fixture::new()?;
    let fake = fixture.fake(&fixture.iservice)?;
    let compute = fixture.method(&fixture.iservice, "Compute");
    let matcher = ExpressionCallMatcher::ignoring_arguments(&compute);

    let outer = FakeScope::create();
    fake.add_rule(ExpressionRule::ignoring_arguments(&compute).returns(1));
    fake.invoke(&compute, vec![Value::from(0)])?;

    let inner = FakeScope::create();
    fake.add_rule(ExpressionRule::ignoring_arguments(&compute).returns(2));
    let inside = fake.invoke(&compute, vec![Value::from(0)])?;
    fake.assert_was_called(&matcher, Repeated::once())?;
    inner.dispose()?;

    let after = fake.invoke(&compute, vec![Value::from(0)])?;
    assert_eq!(inside.return_value(), Some(&Value::from(2)));
    assert_eq!(after.return_value(), Some(&Value::from(1)));

    // The call made in the disposed scope is still counted by its parent
    fake.assert_was_called(&matcher, Repeated::exactly(3))?;
    outer.dispose()?;

    let unconfigured = fake.invoke(&compute, vec![Value::from(0)])?;
    assert_eq!(unconfigured.return_value(), Some(&Value::Int(0)));
    fake.assert_was_called(&matcher, Repeated::exactly(4))?;
    Ok(())
}

#[test]
fn test_scope_reverts_rules_on_every_fake() -> Result<()> {
    let fixture = Fixture::new()?;
    let first = fixture.fake(&fixture.iservice)?;
    let second = fixture.fake(&fixture.service)?;
    let compute = fixture.method(&fixture.iservice, "Compute");

    {
        let _scope = FakeScope::create();
        first.add_rule(AnyCallRule::new().returns(5));
        second.add_rule(AnyCallRule::new().returns(6));
        assert_eq!(first.rule_count() + second.rule_count(), 2);
    }

    assert_eq!(first.rule_count(), 0);
    assert_eq!(second.rule_count(), 0);
    assert_eq!(
        second.invoke(&compute, vec![Value::from(0)])?.return_value(),
        Some(&Value::Int(0))
    );
    Ok(())
}

#[test]
fn test_rules_of_dropped_fakes_are_skipped() -> Result<()> {
    let fixture = Fixture::new()?;
    let scope = FakeScope::create();
    {
        let fake = fixture.fake(&fixture.iservice)?;
        fake.add_rule(AnyCallRule::new().returns(5));
    }
    assert_eq!(scope.scope().rule_count(), 1);
    scope.dispose()?;
    Ok(())
}

#[test]
fn test_out_of_order_disposal_is_reported() -> Result<()> {
    let fixture = Fixture::new()?;
    let fake = fixture.fake(&fixture.iservice)?;
    let compute = fixture.method(&fixture.iservice, "Compute");

    let outer = FakeScope::create();
    let inner = FakeScope::create();
    fake.add_rule(ExpressionRule::ignoring_arguments(&compute).returns(2));

    assert!(matches!(outer.dispose(), Err(Error::ScopeOrder { .. })));
    assert!(FakeScope::current().is_root());
    assert_eq!(fake.rule_count(), 0);
    assert!(inner.dispose().is_ok());
    Ok(())
}

#[test]
fn test_parallel_tests_do_not_share_scopes() -> Result<()> {
    let fixture = Fixture::new()?;
    let fake = fixture.fake(&fixture.iservice)?;
    let compute = fixture.method(&fixture.iservice, "Compute");

    let scope = FakeScope::create();
    let worker = {
        let fake = fake.clone();
        let compute = compute.clone();
        std::thread::spawn(move || -> Result<usize> {
            fake.invoke(&compute, vec![Value::from(1)])?;
            Ok(fake.calls_in_scope().len())
        })
    };
    let seen_by_worker = worker.join().expect("worker panicked")?;

    // The worker ran in its own root scope, it sees the complete history
    assert_eq!(seen_by_worker, 1);
    assert!(fake.calls_in_scope().is_empty());
    scope.dispose()?;
    assert_eq!(fake.calls_in_scope().len(), 1);
    Ok(())
}
