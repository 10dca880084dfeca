use dp_core::{DpError, PrivacyLoss};
use dp_interactive::{
    make_concurrent_filter, make_concurrent_odometer, make_sequential_filter, Measurement, Query,
    Queryable, Spec,
};

fn loss(value: f64) -> PrivacyLoss {
    PrivacyLoss::new(value).expect("valid loss")
}

fn leaf(privacy_loss: f64) -> Measurement<f64> {
    Measurement::new(loss(privacy_loss), |data: &f64| Ok(*data))
}

fn spawn_child(parent: &Queryable<f64>, cap: f64) -> Queryable<f64> {
    parent
        .query(make_concurrent_filter(loss(cap)).into())
        .expect("spawn child")
        .into_queryable()
        .expect("child session")
}

#[test]
fn in_order_access_is_accepted() {
    let session = make_sequential_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("session");

    // Spawn-use-spawn-use: each child is used while it is still current.
    for _ in 0..3 {
        let child = spawn_child(&session, 0.25);
        child
            .query(leaf(0.1).into())
            .and_then(|a| a.into_value())
            .expect("in-order release");
    }
}

#[test]
fn repeated_access_to_the_current_child_is_accepted() {
    let session = make_sequential_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("session");
    let first = spawn_child(&session, 0.25);
    let second = spawn_child(&session, 0.25);

    second
        .query(leaf(0.1).into())
        .and_then(|a| a.into_value())
        .expect("first touch of child 1");
    second
        .query(leaf(0.1).into())
        .and_then(|a| a.into_value())
        .expect("child 1 is still the current child");

    match first.query(leaf(0.1).into()) {
        Err(DpError::NonSequentialAccess { requested, last }) => {
            assert_eq!(requested, 0);
            assert_eq!(last, 1);
        }
        other => panic!("expected ordering refusal, got {other:?}"),
    }
}

#[test]
fn retired_children_stay_retired() {
    let session = make_sequential_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("session");
    let children: Vec<_> = (0..3).map(|_| spawn_child(&session, 0.25)).collect();

    // Spawning child 2 already retired the earlier indices.
    match children[0].query(leaf(0.1).into()) {
        Err(DpError::NonSequentialAccess { requested, last }) => {
            assert_eq!(requested, 0);
            assert_eq!(last, 2);
        }
        other => panic!("expected ordering refusal, got {other:?}"),
    }

    children[2]
        .query(leaf(0.1).into())
        .and_then(|a| a.into_value())
        .expect("newest child is usable");
}

#[test]
fn refused_ordering_does_not_spend_budget() {
    let session = make_sequential_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("session");
    let first = spawn_child(&session, 0.25);
    let second = spawn_child(&session, 0.25);

    second
        .query(leaf(0.1).into())
        .and_then(|a| a.into_value())
        .expect("release through child 1");
    assert!(first.query(leaf(0.1).into()).is_err());

    // The failed attempt through the retired child left both ledgers alone.
    second
        .query(leaf(0.1).into())
        .and_then(|a| a.into_value())
        .expect("child 1 budget intact after the refusal");
}

#[test]
fn retirement_reaches_through_grandchildren() {
    let session = make_sequential_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("session");
    let first = spawn_child(&session, 0.5);
    let grandchild = spawn_child(&first, 0.25);
    let _second = spawn_child(&session, 0.25);

    // Traffic through the grandchild routes into the retired child 0.
    match grandchild.query(leaf(0.1).into()) {
        Err(DpError::NonSequentialAccess { requested, last }) => {
            assert_eq!(requested, 0);
            assert_eq!(last, 1);
        }
        other => panic!("expected ordering refusal, got {other:?}"),
    }
}

#[test]
fn retired_odometer_report_is_rejected() {
    let session = make_sequential_filter::<f64>(loss(1.0))
        .invoke(&10.0)
        .expect("session");
    let odometer = session
        .query(Query::Spawn(Spec::Odometer(make_concurrent_odometer())))
        .expect("spawn odometer")
        .into_queryable()
        .expect("odometer session");
    let _second = spawn_child(&session, 0.25);

    // The odometer spawned at declared zero; its first real report arrives
    // after a later sibling retired it, and is refused like any other.
    match odometer.query(leaf(0.1).into()) {
        Err(DpError::NonSequentialAccess { requested, last }) => {
            assert_eq!(requested, 0);
            assert_eq!(last, 1);
        }
        other => panic!("expected ordering refusal, got {other:?}"),
    }
}
