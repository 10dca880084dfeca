//! The query and answer vocabulary of the protocol.

use dp_core::{DpError, ErrorInfo, PrivacyLoss};

use crate::measurement::{InteractiveMeasurement, Measurement, Odometer};
use crate::queryable::Queryable;

/// A computation spec sent to a composition queryable to spawn its next
/// child session.
pub enum Spec<D> {
    /// Non-interactive leaf; auto-collapsed to its scalar release on spawn.
    Measurement(Measurement<D>),
    /// Interactive session with a declared privacy bound.
    Interactive(InteractiveMeasurement<D>),
    /// Interactive session with no declared bound.
    Odometer(Odometer<D>),
}

impl<D> Clone for Spec<D> {
    fn clone(&self) -> Self {
        match self {
            Spec::Measurement(m) => Spec::Measurement(m.clone()),
            Spec::Interactive(im) => Spec::Interactive(im.clone()),
            Spec::Odometer(od) => Spec::Odometer(od.clone()),
        }
    }
}

impl<D: Clone + 'static> Spec<D> {
    /// Privacy loss declared up front: the spec's own bound, or zero for an
    /// odometer (its true usage arrives later through descendant-change
    /// reports on the same tree link).
    pub fn declared_loss(&self) -> PrivacyLoss {
        match self {
            Spec::Measurement(m) => m.privacy_loss(),
            Spec::Interactive(im) => im.privacy_loss(),
            Spec::Odometer(_) => PrivacyLoss::ZERO,
        }
    }

    pub(crate) fn invoke(&self, data: &D) -> Result<Queryable<D>, DpError> {
        match self {
            Spec::Measurement(m) => m.invoke(data),
            Spec::Interactive(im) => im.invoke(data),
            Spec::Odometer(od) => od.invoke(data),
        }
    }

    /// Whether the spawned child should immediately be collapsed to its
    /// one-shot value.
    pub(crate) fn collapses(&self) -> bool {
        matches!(self, Spec::Measurement(_))
    }
}

/// Internal child-to-parent report of a (possibly hypothetical) new subtree
/// total. Never accepted from external callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescendantChange {
    /// The reporting child's tag within the receiving parent.
    pub index: usize,
    /// Subtree total the child wants to commit.
    pub new_privacy_loss: PrivacyLoss,
    /// True during the validation pass, when no state may change anywhere.
    pub pre_invoke: bool,
}

/// Queries accepted by [`Queryable::query`], exhaustively matched by every
/// transition.
pub enum Query<D> {
    /// Sentinel "no query": read a one-shot queryable's cached release.
    Fetch,
    /// Spawn the given spec as the receiving node's next child.
    Spawn(Spec<D>),
    /// Read the committed running privacy loss (odometer-flavored nodes).
    GetPrivacyLoss,
    /// Internal child-to-parent traffic; rejected at the public surface.
    DescendantChange(DescendantChange),
}

impl<D> Query<D> {
    /// Stable label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Query::Fetch => "fetch",
            Query::Spawn(Spec::Measurement(_)) => "spawn-measurement",
            Query::Spawn(Spec::Interactive(_)) => "spawn-interactive",
            Query::Spawn(Spec::Odometer(_)) => "spawn-odometer",
            Query::GetPrivacyLoss => "get-privacy-loss",
            Query::DescendantChange(_) => "descendant-change",
        }
    }
}

impl<D> From<Measurement<D>> for Query<D> {
    fn from(spec: Measurement<D>) -> Self {
        Query::Spawn(Spec::Measurement(spec))
    }
}

impl<D> From<InteractiveMeasurement<D>> for Query<D> {
    fn from(spec: InteractiveMeasurement<D>) -> Self {
        Query::Spawn(Spec::Interactive(spec))
    }
}

impl<D> From<Odometer<D>> for Query<D> {
    fn from(spec: Odometer<D>) -> Self {
        Query::Spawn(Spec::Odometer(spec))
    }
}

/// Answers produced by [`Queryable::query`].
pub enum Answer<D> {
    /// Scalar release from a leaf measurement.
    Value(f64),
    /// Live child session spawned by a composition queryable.
    Queryable(Queryable<D>),
    /// Running privacy loss reported by an odometer.
    PrivacyLoss(PrivacyLoss),
    /// Acknowledgement of internal traffic.
    Ack,
}

impl<D> std::fmt::Debug for Answer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Answer::Queryable(_) => f.debug_tuple("Queryable").finish_non_exhaustive(),
            Answer::PrivacyLoss(loss) => f.debug_tuple("PrivacyLoss").field(loss).finish(),
            Answer::Ack => f.write_str("Ack"),
        }
    }
}

impl<D> Answer<D> {
    /// Stable label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Answer::Value(_) => "value",
            Answer::Queryable(_) => "queryable",
            Answer::PrivacyLoss(_) => "privacy-loss",
            Answer::Ack => "ack",
        }
    }

    /// Extracts a scalar release, failing on any other shape.
    pub fn into_value(self) -> Result<f64, DpError> {
        match self {
            Answer::Value(value) => Ok(value),
            other => Err(unexpected_answer("value", &other)),
        }
    }

    /// Extracts a live child session, failing on any other shape.
    pub fn into_queryable(self) -> Result<Queryable<D>, DpError> {
        match self {
            Answer::Queryable(queryable) => Ok(queryable),
            other => Err(unexpected_answer("queryable", &other)),
        }
    }

    /// Extracts a reported privacy loss, failing on any other shape.
    pub fn into_privacy_loss(self) -> Result<PrivacyLoss, DpError> {
        match self {
            Answer::PrivacyLoss(loss) => Ok(loss),
            other => Err(unexpected_answer("privacy-loss", &other)),
        }
    }
}

fn unexpected_answer<D>(expected: &str, got: &Answer<D>) -> DpError {
    DpError::Protocol(
        ErrorInfo::new("unexpected-answer", "answer shape does not match the query")
            .with_context("expected", expected)
            .with_context("got", got.kind()),
    )
}
