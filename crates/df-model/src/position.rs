//! Explicitly tagged positions in the hierarchy projection.

use core::fmt;

use df_core::{InletId, LinkId, NodeId, OutletId};
use df_graph::PortRef;

/// What a position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Subgraph,
    Node,
    Inlet,
    Outlet,
    Link,
}

/// An item of the projection, tagged with its kind.
///
/// `Subgraph` is the virtual root. Nodes sit at depth 1, their inlets and
/// outlets at depth 2 and an inlet's links at depth 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Subgraph,
    Node(NodeId),
    Inlet(InletId),
    Outlet(OutletId),
    Link(LinkId),
}

impl Position {
    pub fn kind(self) -> PositionKind {
        match self {
            Position::Subgraph => PositionKind::Subgraph,
            Position::Node(_) => PositionKind::Node,
            Position::Inlet(_) => PositionKind::Inlet,
            Position::Outlet(_) => PositionKind::Outlet,
            Position::Link(_) => PositionKind::Link,
        }
    }

    /// The port this position names, if it is one.
    pub fn port(self) -> Option<PortRef> {
        match self {
            Position::Inlet(id) => Some(PortRef::Inlet(id)),
            Position::Outlet(id) => Some(PortRef::Outlet(id)),
            _ => None,
        }
    }
}

impl From<PortRef> for Position {
    fn from(port: PortRef) -> Self {
        match port {
            PortRef::Inlet(id) => Position::Inlet(id),
            PortRef::Outlet(id) => Position::Outlet(id),
        }
    }
}

impl From<NodeId> for Position {
    fn from(id: NodeId) -> Self {
        Position::Node(id)
    }
}

impl From<InletId> for Position {
    fn from(id: InletId) -> Self {
        Position::Inlet(id)
    }
}

impl From<OutletId> for Position {
    fn from(id: OutletId) -> Self {
        Position::Outlet(id)
    }
}

impl From<LinkId> for Position {
    fn from(id: LinkId) -> Self {
        Position::Link(id)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Subgraph => f.write_str("subgraph"),
            Position::Node(id) => write!(f, "{id}"),
            Position::Inlet(id) => write!(f, "{id}"),
            Position::Outlet(id) => write!(f, "{id}"),
            Position::Link(id) => write!(f, "{id}"),
        }
    }
}
