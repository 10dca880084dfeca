use dp_core::{DpError, PrivacyLoss};
use dp_interactive::{make_concurrent_filter, Measurement, Queryable};

fn loss(value: f64) -> PrivacyLoss {
    PrivacyLoss::new(value).expect("valid loss")
}

fn leaf(privacy_loss: f64) -> Measurement<f64> {
    Measurement::new(loss(privacy_loss), |data: &f64| Ok(*data))
}

fn spawn_filter(parent: &Queryable<f64>, cap: f64) -> Queryable<f64> {
    parent
        .query(make_concurrent_filter(loss(cap)).into())
        .expect("spawn nested filter")
        .into_queryable()
        .expect("child session")
}

#[test]
fn inner_cap_is_enforced_independently() {
    let outer = make_concurrent_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("outer session");
    let inner = spawn_filter(&outer, 0.25);

    inner
        .query(leaf(0.25).into())
        .and_then(|a| a.into_value())
        .expect("inner release at its cap");

    // The outer filter has room to spare; the inner cap alone refuses.
    match inner.query(leaf(0.125).into()) {
        Err(DpError::BudgetExceeded { attempted, cap }) => {
            assert_eq!(attempted, loss(0.375));
            assert_eq!(cap, loss(0.25));
        }
        other => panic!("expected inner refusal, got {other:?}"),
    }
}

#[test]
fn outer_budget_still_available_after_inner_refusal() {
    let outer = make_concurrent_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("outer session");
    let inner = spawn_filter(&outer, 0.25);

    inner
        .query(leaf(0.25).into())
        .and_then(|a| a.into_value())
        .expect("inner release");
    assert!(inner.query(leaf(0.25).into()).is_err());

    outer
        .query(leaf(0.5).into())
        .and_then(|a| a.into_value())
        .expect("outer spend unaffected by the inner refusal");
}

#[test]
fn inner_usage_replaces_its_declared_reservation() {
    let outer = make_concurrent_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("outer session");

    // Spawning reserves the inner declared cap in the outer ledger...
    let inner = spawn_filter(&outer, 0.75);
    assert!(outer.query(leaf(0.5).into()).is_err());

    // ...but once the inner session reports its actual usage, the outer
    // ledger tracks that instead of the reservation.
    inner
        .query(leaf(0.5).into())
        .and_then(|a| a.into_value())
        .expect("inner release");
    outer
        .query(leaf(0.5).into())
        .and_then(|a| a.into_value())
        .expect("outer spend against the updated ledger");
}

#[test]
fn outer_cap_refuses_through_the_inner_session() {
    let outer = make_concurrent_filter::<f64>(loss(0.5))
        .invoke(&10.0)
        .expect("outer session");
    // The inner declares more than the outer can ever grant.
    match outer.query(make_concurrent_filter::<f64>(loss(0.75)).into()) {
        Err(DpError::BudgetExceeded { attempted, cap }) => {
            assert_eq!(attempted, loss(0.75));
            assert_eq!(cap, loss(0.5));
        }
        other => panic!("expected outer refusal, got {other:?}"),
    }
}

#[test]
fn deep_nesting_addresses_and_halved_budgets() {
    let root = make_concurrent_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("root session");
    let middle = spawn_filter(&root, 0.5);
    let leaf_filter = spawn_filter(&middle, 0.25);
    assert_eq!(leaf_filter.address(), "root/0/0");

    for _ in 0..2 {
        leaf_filter
            .query(leaf(0.125).into())
            .and_then(|a| a.into_value())
            .expect("deepest release");
    }
    match leaf_filter.query(leaf(0.125).into()) {
        Err(DpError::BudgetExceeded { attempted, cap }) => {
            assert_eq!(attempted, loss(0.375));
            assert_eq!(cap, loss(0.25));
        }
        other => panic!("expected deepest refusal, got {other:?}"),
    }
}
