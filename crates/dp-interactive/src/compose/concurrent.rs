//! Concurrent composition: children may be queried in any order, in any
//! interleaving.

use dp_core::PrivacyLoss;

use super::{composition_queryable, Policy};
use crate::measurement::{InteractiveMeasurement, Odometer};

const CONCURRENT: Policy = Policy {
    sequential: false,
    reports_loss: false,
};

const ODOMETER: Policy = Policy {
    sequential: false,
    reports_loss: true,
};

/// An interactive measurement whose sessions admit children in any order and
/// enforce `max_privacy_loss` as a hard cap on the subtree total.
///
/// The declared loss of the whole measurement is the cap itself; a spawn
/// that would push the total past it fails with `BudgetExceeded` and leaves
/// every ledger in the tree unchanged.
pub fn make_concurrent_filter<D: Clone + 'static>(
    max_privacy_loss: PrivacyLoss,
) -> InteractiveMeasurement<D> {
    InteractiveMeasurement::new(max_privacy_loss, move |data: &D| {
        Ok(composition_queryable(
            data.clone(),
            Some(max_privacy_loss),
            CONCURRENT,
        ))
    })
}

/// An odometer whose sessions admit children in any order, never reject on
/// privacy grounds, and answer `GetPrivacyLoss` with the committed running
/// total of the subtree.
pub fn make_concurrent_odometer<D: Clone + 'static>() -> Odometer<D> {
    Odometer::new(|data: &D| Ok(composition_queryable(data.clone(), None, ODOMETER)))
}
