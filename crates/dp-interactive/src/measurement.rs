//! Value types describing privacy-preserving computations.
//!
//! All three are immutable, cheaply cloneable specs that can be invoked any
//! number of times; each invocation produces an independent session.

use std::rc::Rc;

use dp_core::{DpError, PrivacyLoss};

use crate::query::Query;
use crate::queryable::Queryable;

type LeafFn<D> = Rc<dyn Fn(&D) -> Result<f64, DpError>>;
type SessionFn<D> = Rc<dyn Fn(&D) -> Result<Queryable<D>, DpError>>;

/// A non-interactive computation releasing one scalar at a fixed,
/// statically declared privacy cost.
pub struct Measurement<D> {
    function: LeafFn<D>,
    privacy_loss: PrivacyLoss,
}

impl<D> Clone for Measurement<D> {
    fn clone(&self) -> Self {
        Self {
            function: Rc::clone(&self.function),
            privacy_loss: self.privacy_loss,
        }
    }
}

impl<D> std::fmt::Debug for Measurement<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Measurement")
            .field("privacy_loss", &self.privacy_loss)
            .finish_non_exhaustive()
    }
}

impl<D: Clone + 'static> Measurement<D> {
    /// Wraps a data function together with its declared privacy loss.
    pub fn new(
        privacy_loss: PrivacyLoss,
        function: impl Fn(&D) -> Result<f64, DpError> + 'static,
    ) -> Self {
        Self {
            function: Rc::new(function),
            privacy_loss,
        }
    }

    /// Declared privacy loss of one invocation.
    pub fn privacy_loss(&self) -> PrivacyLoss {
        self.privacy_loss
    }

    /// Runs the data function once, caching the release in a one-shot
    /// queryable that answers every [`Query::Fetch`] with the same value.
    pub fn invoke(&self, data: &D) -> Result<Queryable<D>, DpError> {
        let answer = (self.function)(data)?;
        Ok(Queryable::fixed(answer))
    }

    /// Convenience: invoke, then read the release through the sentinel query.
    pub fn invoke1(&self, data: &D) -> Result<f64, DpError> {
        self.invoke(data)?.query(Query::Fetch)?.into_value()
    }
}

/// An interactive computation with a fixed declared privacy bound; invoking
/// it yields a live [`Queryable`] session instead of a single answer.
pub struct InteractiveMeasurement<D> {
    function: SessionFn<D>,
    privacy_loss: PrivacyLoss,
}

impl<D> Clone for InteractiveMeasurement<D> {
    fn clone(&self) -> Self {
        Self {
            function: Rc::clone(&self.function),
            privacy_loss: self.privacy_loss,
        }
    }
}

impl<D: Clone + 'static> InteractiveMeasurement<D> {
    /// Wraps a session factory together with its declared privacy bound.
    pub fn new(
        privacy_loss: PrivacyLoss,
        function: impl Fn(&D) -> Result<Queryable<D>, DpError> + 'static,
    ) -> Self {
        Self {
            function: Rc::new(function),
            privacy_loss,
        }
    }

    /// Declared privacy bound of any session this spec spawns.
    pub fn privacy_loss(&self) -> PrivacyLoss {
        self.privacy_loss
    }

    /// Spawns a fresh root session over the given data.
    pub fn invoke(&self, data: &D) -> Result<Queryable<D>, DpError> {
        (self.function)(data)
    }
}

/// An interactive computation with no declared bound; it only promises to
/// accurately report cumulative usage on demand.
pub struct Odometer<D> {
    function: SessionFn<D>,
}

impl<D> Clone for Odometer<D> {
    fn clone(&self) -> Self {
        Self {
            function: Rc::clone(&self.function),
        }
    }
}

impl<D: Clone + 'static> Odometer<D> {
    /// Wraps a session factory.
    pub fn new(function: impl Fn(&D) -> Result<Queryable<D>, DpError> + 'static) -> Self {
        Self {
            function: Rc::new(function),
        }
    }

    /// Spawns a fresh root session over the given data.
    pub fn invoke(&self, data: &D) -> Result<Queryable<D>, DpError> {
        (self.function)(data)
    }
}
