//! Graph-specific error types.

use df_core::{InletId, NodeId, OutletId};
use df_expr::ParseError;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Expression text failed to parse; nothing was changed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An id that was never issued or has been removed.
    #[error("Unknown or removed id {id}")]
    StaleId { id: String },

    /// A port plan applied after the node changed underneath it.
    #[error("Port plan for {node} no longer matches the store")]
    StalePlan { node: NodeId },

    #[error("Node name {name:?} is already in use")]
    DuplicateName { name: String },

    /// The link would make a node depend on itself.
    #[error("Linking {outlet} to {inlet} would create a cycle")]
    CycleRejected { outlet: OutletId, inlet: InletId },

    #[error("Cannot link: {what}")]
    CannotLink { what: String },

    /// The store and its port-link index disagree.
    #[error("Port-link index inconsistency: {what}")]
    InconsistentIndex { what: String },

    #[error("Row {row} out of range (count {count})")]
    RowOutOfRange { row: usize, count: usize },

    #[error("No node named {name:?}")]
    UnknownNode { name: String },

    #[error("Node {node:?} has no port named {port:?}")]
    UnknownPort { node: String, port: String },
}

impl GraphError {
    pub(crate) fn stale(id: impl std::fmt::Display) -> Self {
        GraphError::StaleId { id: id.to_string() }
    }

    pub(crate) fn inconsistent(what: impl Into<String>) -> Self {
        GraphError::InconsistentIndex { what: what.into() }
    }
}
