//! Error types for the hierarchy projection and proxy index.

use df_core::ModelPath;
use df_graph::GraphError;
use thiserror::Error;

use crate::position::{Position, PositionKind};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The explicit tag disagrees with the kind inferred from depth and ownership.
    #[error("Position {position} is tagged {tagged:?} but sits where a {inferred:?} belongs")]
    KindMismatch {
        position: Position,
        tagged: PositionKind,
        inferred: PositionKind,
    },

    /// Wrong-kind or stale position argument.
    #[error("Invalid position {position}: {what}")]
    InvalidPosition { position: Position, what: &'static str },

    #[error("Row {row} out of range under {parent} (count {count})")]
    RowOutOfRange {
        parent: Position,
        row: usize,
        count: usize,
    },

    #[error("No item at path {path}")]
    NoSuchPath { path: ModelPath },

    /// A structural bracket was opened while another one was still open.
    #[error("Change bracket opened while another is active")]
    NestedBracket,
}

impl ModelError {
    pub(crate) fn invalid(position: Position, what: &'static str) -> Self {
        ModelError::InvalidPosition { position, what }
    }
}

pub type ProxyIndexResult<T> = Result<T, ProxyIndexError>;

/// Position-proxy index errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyIndexError {
    /// A row along the path does not exist (or is past the insertion point).
    #[error("Path {path} is out of range at depth {depth}")]
    PathOutOfRange { path: ModelPath, depth: usize },

    /// The root carries no proxy.
    #[error("The root path cannot hold a proxy")]
    EmptyPath,
}
