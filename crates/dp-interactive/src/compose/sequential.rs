//! Sequential composition: once traffic is accepted for child `k`, any
//! earlier child is retired for good.

use dp_core::PrivacyLoss;

use super::{composition_queryable, Policy};
use crate::measurement::InteractiveMeasurement;

const SEQUENTIAL: Policy = Policy {
    sequential: true,
    reports_loss: false,
};

/// An interactive measurement whose sessions enforce `max_privacy_loss` and
/// additionally require child access in nondecreasing spawn order.
///
/// Accepted traffic for a child with a higher index retires every child
/// before it; a retired child's next report, including its spawn attempt's
/// pre-invoke pass, fails with `NonSequentialAccess`. Spawning itself always
/// targets the newest index, so spawns never trip the ordering rule, only
/// queries routed through retired children do.
pub fn make_sequential_filter<D: Clone + 'static>(
    max_privacy_loss: PrivacyLoss,
) -> InteractiveMeasurement<D> {
    InteractiveMeasurement::new(max_privacy_loss, move |data: &D| {
        Ok(composition_queryable(
            data.clone(),
            Some(max_privacy_loss),
            SEQUENTIAL,
        ))
    })
}
