//! Structured error types shared across the toolkit.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loss::PrivacyLoss;

/// Diagnostic payload carried by the free-form [`DpError`] variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (addresses, indices, query kinds).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Canonical error type for the toolkit.
///
/// The two budget-protocol failures carry typed payloads so callers can react
/// to the attempted totals and indices without parsing strings; the remaining
/// variants carry an [`ErrorInfo`] payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum DpError {
    /// A proposed cumulative privacy loss breached a configured cap.
    #[error("new privacy loss {attempted} exceeds max privacy loss {cap}")]
    BudgetExceeded {
        /// Total the rejected update would have committed.
        attempted: PrivacyLoss,
        /// Cap configured on the refusing node.
        cap: PrivacyLoss,
    },
    /// A retired child of a sequential composition was addressed again.
    #[error("non-sequential access of children: child {requested} after child {last}")]
    NonSequentialAccess {
        /// Index of the child the rejected update came through.
        requested: usize,
        /// Most recently used child index.
        last: usize,
    },
    /// A query shape the receiving queryable does not implement.
    #[error("unrecognized query: {0}")]
    UnrecognizedQuery(ErrorInfo),
    /// Tree wiring or dispatch invariant violations.
    #[error("protocol error: {0}")]
    Protocol(ErrorInfo),
    /// Invalid privacy-loss construction or arithmetic.
    #[error("loss error: {0}")]
    Loss(ErrorInfo),
    /// Leaf mechanism failures.
    #[error("mechanism error: {0}")]
    Mechanism(ErrorInfo),
}
