//! Privacy-loss arithmetic for the composition protocol.

use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::errors::{DpError, ErrorInfo};

/// Cumulative privacy expenditure, or a bound on it.
///
/// Values are opaque to the composition protocol: the only operations it
/// relies on are addition, comparison, and the zero element. Construction
/// rejects negative and non-finite inputs, so ordering is total across every
/// value that can exist. Serde round-trips revalidate through [`TryFrom`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PrivacyLoss(f64);

impl PrivacyLoss {
    /// The zero expenditure, used as the optimistic placeholder when an
    /// odometer is spawned before it has reported any real usage.
    pub const ZERO: PrivacyLoss = PrivacyLoss(0.0);

    /// Creates a privacy loss, rejecting negative and non-finite values.
    pub fn new(value: f64) -> Result<Self, DpError> {
        if !value.is_finite() || value < 0.0 {
            return Err(DpError::Loss(
                ErrorInfo::new(
                    "invalid-loss",
                    "privacy loss must be finite and nonnegative",
                )
                .with_context("value", value.to_string()),
            ));
        }
        Ok(PrivacyLoss(value))
    }

    /// Returns the raw numeric value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Add for PrivacyLoss {
    type Output = PrivacyLoss;

    fn add(self, rhs: PrivacyLoss) -> PrivacyLoss {
        PrivacyLoss(self.0 + rhs.0)
    }
}

impl Sum for PrivacyLoss {
    fn sum<I: Iterator<Item = PrivacyLoss>>(iter: I) -> PrivacyLoss {
        iter.fold(PrivacyLoss::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a PrivacyLoss> for PrivacyLoss {
    fn sum<I: Iterator<Item = &'a PrivacyLoss>>(iter: I) -> PrivacyLoss {
        iter.copied().sum()
    }
}

impl Display for PrivacyLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for PrivacyLoss {
    type Error = DpError;

    fn try_from(value: f64) -> Result<Self, DpError> {
        PrivacyLoss::new(value)
    }
}

impl From<PrivacyLoss> for f64 {
    fn from(loss: PrivacyLoss) -> f64 {
        loss.0
    }
}
