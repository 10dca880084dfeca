//! Odometer-to-filter adapter.

use dp_core::PrivacyLoss;

use super::make_concurrent_filter;
use crate::measurement::{InteractiveMeasurement, Odometer};
use crate::query::{Query, Spec};

/// Converts an odometer into an interactive measurement with a declared
/// bound of `max_privacy_loss`.
///
/// Each session interposes a hidden single-child filter between the caller
/// and the odometer session: every loss report the odometer commits flows
/// through the filter's ledger, so any step past the bound fails exactly as
/// it would under an explicit filter. The caller receives the odometer's own
/// session and keeps its full surface, `GetPrivacyLoss` included; the hidden
/// filter stays alive through the session's parent link.
pub fn make_odometer_to_filter<D: Clone + 'static>(
    odometer: Odometer<D>,
    max_privacy_loss: PrivacyLoss,
) -> InteractiveMeasurement<D> {
    InteractiveMeasurement::new(max_privacy_loss, move |data: &D| {
        let guard = make_concurrent_filter(max_privacy_loss).invoke(data)?;
        guard
            .query(Query::Spawn(Spec::Odometer(odometer.clone())))
            .and_then(|answer| answer.into_queryable())
    })
}
