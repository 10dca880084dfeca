//! Composition strategies and the shared two-phase spawn protocol.
//!
//! All strategies run the same skeleton: build a hypothetical per-child loss
//! ledger, validate it locally, report the would-be subtree total to the
//! parent, and only commit once the whole path to the root has accepted.
//! Strategy differences are two knobs ([`Policy`]) plus the presence of a
//! cap in the node's state.

mod adapter;
mod concurrent;
mod sequential;

pub use adapter::make_odometer_to_filter;
pub use concurrent::{make_concurrent_filter, make_concurrent_odometer};
pub use sequential::make_sequential_filter;

use std::rc::Rc;

use dp_core::{DpError, ErrorInfo, PrivacyLoss};

use crate::query::{Answer, Query, Spec};
use crate::queryable::{unrecognized, NodeState, Queryable};

/// Strategy knobs applied on top of the shared ledger skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Policy {
    /// Enforce nondecreasing child-index access.
    pub sequential: bool,
    /// Answer `GetPrivacyLoss` with the committed running total.
    pub reports_loss: bool,
}

/// Ledger a composition queryable replaces wholesale on each commit.
#[derive(Clone)]
pub(crate) struct CompositionState<D> {
    pub(crate) data: D,
    /// Hard cap, when the strategy is a filter.
    pub(crate) max_privacy_loss: Option<PrivacyLoss>,
    /// Committed subtree total, reported upward on every change.
    pub(crate) privacy_loss: PrivacyLoss,
    /// Committed per-child losses, indexed by spawn order.
    pub(crate) child_losses: Vec<PrivacyLoss>,
    /// Highest child index traffic has been accepted for (sequential only).
    pub(crate) current_child: Option<usize>,
}

/// Builds a composition session over `data` with the given cap and knobs.
pub(crate) fn composition_queryable<D: Clone + 'static>(
    data: D,
    max_privacy_loss: Option<PrivacyLoss>,
    policy: Policy,
) -> Queryable<D> {
    let state = NodeState::Composition(CompositionState {
        data,
        max_privacy_loss,
        privacy_loss: PrivacyLoss::ZERO,
        child_losses: Vec::new(),
        current_child: None,
    });
    Queryable::new(
        state,
        Rc::new(move |node, state, query| eval(node, state, policy, query)),
    )
}

fn eval<D: Clone + 'static>(
    node: &Queryable<D>,
    state: &NodeState<D>,
    policy: Policy,
    query: Query<D>,
) -> Result<(Answer<D>, NodeState<D>), DpError> {
    let NodeState::Composition(state) = state else {
        return Err(DpError::Protocol(
            ErrorInfo::new(
                "state-shape",
                "composition transition reached a non-composition node",
            )
            .with_context("at", node.address()),
        ));
    };
    match query {
        Query::Spawn(spec) => spawn(node, state, policy, spec),
        Query::DescendantChange(change) => {
            let new_state = check_new_state(
                node,
                state,
                policy,
                change.index,
                change.new_privacy_loss,
                change.pre_invoke,
            )?;
            Ok((Answer::Ack, NodeState::Composition(new_state)))
        }
        Query::GetPrivacyLoss if policy.reports_loss => Ok((
            Answer::PrivacyLoss(state.privacy_loss),
            NodeState::Composition(state.clone()),
        )),
        query => Err(unrecognized(node, &query)),
    }
}

/// The two-phase spawn protocol.
///
/// The pre-invoke pass must accept on every node up to the root before the
/// child is constructed; the post-invoke pass then re-runs with identical
/// inputs and commits, exactly once per spawn, on this node and transitively
/// on every ancestor. A rejection at any depth aborts with no state changed
/// anywhere, because nothing was mutated before the unanimous commit pass.
fn spawn<D: Clone + 'static>(
    node: &Queryable<D>,
    state: &CompositionState<D>,
    policy: Policy,
    spec: Spec<D>,
) -> Result<(Answer<D>, NodeState<D>), DpError> {
    let child_index = state.child_losses.len();
    let declared = spec.declared_loss();

    check_new_state(node, state, policy, child_index, declared, true)?;

    let child = spec.invoke(&state.data)?;
    child.set_listener(node, child_index);

    let new_state = check_new_state(node, state, policy, child_index, declared, false)?;

    // A plain measurement's one-shot wrapper is collapsed right away.
    let answer = if spec.collapses() {
        child.transition(Query::Fetch)?
    } else {
        Answer::Queryable(child)
    };
    Ok((answer, NodeState::Composition(new_state)))
}

/// Shared validation/commit skeleton for every strategy.
///
/// Builds the hypothetical ledger, enforces the cap and ordering rules,
/// reports the would-be total upward, and returns either the unchanged state
/// (pre-invoke) or the committed replacement (post-invoke).
fn check_new_state<D: Clone + 'static>(
    node: &Queryable<D>,
    state: &CompositionState<D>,
    policy: Policy,
    child_index: usize,
    child_loss: PrivacyLoss,
    pre_invoke: bool,
) -> Result<CompositionState<D>, DpError> {
    let child_losses = updated_losses(&state.child_losses, child_index, child_loss);
    let new_total: PrivacyLoss = child_losses.iter().sum();

    if let Some(cap) = state.max_privacy_loss {
        if new_total > cap {
            return Err(DpError::BudgetExceeded {
                attempted: new_total,
                cap,
            });
        }
    }

    if policy.sequential {
        if let Some(last) = state.current_child {
            if child_index < last {
                return Err(DpError::NonSequentialAccess {
                    requested: child_index,
                    last,
                });
            }
        }
    }

    node.notify_listener(new_total, pre_invoke)?;

    if pre_invoke {
        return Ok(state.clone());
    }
    let mut committed = state.clone();
    committed.privacy_loss = new_total;
    committed.child_losses = child_losses;
    if policy.sequential {
        committed.current_child = Some(child_index);
    }
    Ok(committed)
}

/// Hypothetical ledger after `child_index` contributes `child_loss`.
///
/// Entries past `child_index` describe children whose admission rested on
/// this child's previous contribution; they are stale the moment it changes
/// and are dropped.
fn updated_losses(
    existing: &[PrivacyLoss],
    child_index: usize,
    child_loss: PrivacyLoss,
) -> Vec<PrivacyLoss> {
    let mut losses = existing.to_vec();
    losses.truncate(child_index);
    losses.push(child_loss);
    losses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loss(value: f64) -> PrivacyLoss {
        PrivacyLoss::new(value).unwrap()
    }

    #[test]
    fn appends_at_next_index() {
        let ledger = updated_losses(&[loss(0.5)], 1, loss(0.25));
        assert_eq!(ledger.iter().sum::<PrivacyLoss>(), loss(0.75));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn overwrite_drops_later_entries() {
        let ledger = updated_losses(&[loss(0.1), loss(0.2), loss(0.3)], 1, loss(0.5));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0], loss(0.1));
        assert_eq!(ledger[1], loss(0.5));
    }
}
