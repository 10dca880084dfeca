use dp_core::PrivacyLoss;
use dp_interactive::{make_concurrent_filter, make_concurrent_odometer, Measurement, Query};
use proptest::prelude::*;

// Sixteenths keep every ledger sum exactly representable, so the model
// below predicts acceptance without any tolerance.
fn step_loss(sixteenths: u32) -> f64 {
    f64::from(sixteenths) / 16.0
}

fn leaf(privacy_loss: f64) -> Measurement<f64> {
    let loss = PrivacyLoss::new(privacy_loss).expect("valid loss");
    Measurement::new(loss, |data: &f64| Ok(*data))
}

proptest! {
    #[test]
    fn filter_acceptance_matches_the_greedy_model(
        cap_sixteenths in 1u32..=64,
        steps in proptest::collection::vec(1u32..=16, 1..24),
    ) {
        let cap = step_loss(cap_sixteenths);
        let session = make_concurrent_filter::<f64>(
            PrivacyLoss::new(cap).expect("valid cap"),
        )
        .invoke(&1.0)
        .expect("session");

        let mut committed = 0.0;
        for step in steps {
            let loss = step_loss(step);
            let outcome = session.query(leaf(loss).into());
            if committed + loss <= cap {
                prop_assert!(outcome.is_ok(), "step {loss} within {cap} was refused");
                committed += loss;
            } else {
                prop_assert!(outcome.is_err(), "step {loss} past {cap} was accepted");
            }
        }
        prop_assert!(committed <= cap);
    }

    #[test]
    fn odometer_reports_the_exact_running_sum(
        steps in proptest::collection::vec(1u32..=16, 1..24),
    ) {
        let session = make_concurrent_odometer::<f64>()
            .invoke(&1.0)
            .expect("session");

        let mut expected = 0.0;
        for step in steps {
            let loss = step_loss(step);
            session
                .query(leaf(loss).into())
                .and_then(|a| a.into_value())
                .expect("odometers never refuse");
            expected += loss;

            let reported = session
                .query(Query::GetPrivacyLoss)
                .and_then(|a| a.into_privacy_loss())
                .expect("reported loss");
            prop_assert_eq!(reported.value(), expected);
        }
    }
}
