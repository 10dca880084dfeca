//! The stateful session object and its tree links.

use std::cell::RefCell;
use std::rc::Rc;

use dp_core::{DpError, ErrorInfo, PrivacyLoss};

use crate::compose::CompositionState;
use crate::query::{Answer, DescendantChange, Query};

/// Transition function: `(state, query) -> (answer, state)`.
///
/// Transitions are functional with respect to the node: they receive the
/// current state by reference and return the complete replacement state. The
/// handle commits the replacement only after the transition succeeds, so a
/// failed query provably leaves the old state untouched with no rollback
/// path.
pub(crate) type EvalFn<D> = Rc<
    dyn Fn(&Queryable<D>, &NodeState<D>, Query<D>) -> Result<(Answer<D>, NodeState<D>), DpError>,
>;

/// State held by a queryable node, replaced wholesale on every transition.
#[derive(Clone)]
pub(crate) enum NodeState<D> {
    /// One-shot cached release of a plain measurement.
    Fixed { answer: f64 },
    /// Ledger of a composition strategy.
    Composition(CompositionState<D>),
}

struct Node<D> {
    state: NodeState<D>,
    eval: EvalFn<D>,
    listener: Option<Listener<D>>,
}

/// Back-reference from a child session to its parent.
///
/// The link is owning: a parent holds no references to its children (only
/// their numeric losses), so the strong handle cannot form a cycle, and it
/// keeps interposed nodes (such as the adapter's hidden filter) alive for as
/// long as any descendant handle exists.
struct Listener<D> {
    parent: Queryable<D>,
    tag: usize,
}

/// A live, stateful session created by invoking an interactive measurement
/// or odometer; answers repeated queries until its last handle is dropped.
pub struct Queryable<D> {
    node: Rc<RefCell<Node<D>>>,
}

impl<D> Clone for Queryable<D> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<D: Clone + 'static> Queryable<D> {
    pub(crate) fn new(state: NodeState<D>, eval: EvalFn<D>) -> Self {
        Self {
            node: Rc::new(RefCell::new(Node {
                state,
                eval,
                listener: None,
            })),
        }
    }

    /// Builds the trivial one-shot queryable backing a plain measurement:
    /// every `Fetch` returns the cached release and the state never changes.
    pub(crate) fn fixed(answer: f64) -> Self {
        Queryable::new(
            NodeState::Fixed { answer },
            Rc::new(|node, state, query| match (state, &query) {
                (NodeState::Fixed { answer }, Query::Fetch) => {
                    Ok((Answer::Value(*answer), state.clone()))
                }
                _ => Err(unrecognized(node, &query)),
            }),
        )
    }

    /// Evaluates a query, committing the replacement state on success.
    ///
    /// `DescendantChange` is child-to-parent traffic only and is rejected
    /// here before it can reach a transition.
    pub fn query(&self, query: Query<D>) -> Result<Answer<D>, DpError> {
        if let Query::DescendantChange(_) = query {
            return Err(DpError::Protocol(
                ErrorInfo::new(
                    "external-internal-query",
                    "descendant-change queries may only be sent by child queryables",
                )
                .with_context("at", self.address()),
            ));
        }
        self.transition(query)
    }

    /// Runs one transition against the current state and commits its result.
    pub(crate) fn transition(&self, query: Query<D>) -> Result<Answer<D>, DpError> {
        let (eval, state) = {
            let node = self.node.borrow();
            (Rc::clone(&node.eval), node.state.clone())
        };
        let (answer, new_state) = eval(self, &state, query)?;
        self.node.borrow_mut().state = new_state;
        Ok(answer)
    }

    /// Wires this node under `parent` at spawn index `tag`.
    ///
    /// Called exactly once, by the parent, immediately after construction
    /// and before any other query reaches this node.
    pub(crate) fn set_listener(&self, parent: &Queryable<D>, tag: usize) {
        let mut node = self.node.borrow_mut();
        debug_assert!(node.listener.is_none(), "listener wired twice");
        node.listener = Some(Listener {
            parent: parent.clone(),
            tag,
        });
    }

    /// Reports a (possibly hypothetical) new subtree total to the parent.
    ///
    /// Goes straight to the parent's transition, bypassing the public query
    /// surface, so a parent's refusal propagates synchronously as part of
    /// this node's own attempted transition and internal traffic can never
    /// re-enter the external dispatch path. A no-op at the root.
    pub(crate) fn notify_listener(
        &self,
        new_privacy_loss: PrivacyLoss,
        pre_invoke: bool,
    ) -> Result<(), DpError> {
        let link = {
            let node = self.node.borrow();
            node.listener.as_ref().map(|l| (l.parent.clone(), l.tag))
        };
        if let Some((parent, tag)) = link {
            parent.transition(Query::DescendantChange(DescendantChange {
                index: tag,
                new_privacy_loss,
                pre_invoke,
            }))?;
        }
        Ok(())
    }

    /// True when this queryable is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.node.borrow().listener.is_none()
    }

    /// Diagnostic address built by walking listener links and concatenating
    /// tags ("root", "root/0", "root/0/2", ...). No correctness role.
    pub fn address(&self) -> String {
        match &self.node.borrow().listener {
            None => "root".to_string(),
            Some(link) => format!("{}/{}", link.parent.address(), link.tag),
        }
    }
}

/// Error for a query shape the receiving node does not implement.
pub(crate) fn unrecognized<D: Clone + 'static>(node: &Queryable<D>, query: &Query<D>) -> DpError {
    DpError::UnrecognizedQuery(
        ErrorInfo::new(
            "unrecognized-query",
            "query shape not implemented by this queryable",
        )
        .with_context("query", query.kind())
        .with_context("at", node.address()),
    )
}
