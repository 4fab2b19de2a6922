//! Core graph data structures.

use df_core::{InletId, LinkId, NodeId, OutletId};
use df_expr::Analyzer;

/// Direction/kind of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Input port, named after a free variable of the node's expression.
    Inlet,
    /// Output port carrying the node's value.
    Outlet,
}

/// Either kind of port, by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRef {
    Inlet(InletId),
    Outlet(OutletId),
}

impl PortRef {
    pub fn kind(self) -> PortKind {
        match self {
            PortRef::Inlet(_) => PortKind::Inlet,
            PortRef::Outlet(_) => PortKind::Outlet,
        }
    }
}

impl From<InletId> for PortRef {
    fn from(id: InletId) -> Self {
        PortRef::Inlet(id)
    }
}

impl From<OutletId> for PortRef {
    fn from(id: OutletId) -> Self {
        PortRef::Outlet(id)
    }
}

/// An expression operator.
///
/// Inlets are derived from the expression and kept in free-variable order.
/// A node has no ports until its first expression is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub(crate) expression: Option<Analyzer>,
    pub(crate) inlets: Vec<InletId>,
    pub(crate) outlets: Vec<OutletId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String) -> Self {
        Self {
            id,
            name,
            expression: None,
            inlets: Vec::new(),
            outlets: Vec::new(),
        }
    }

    /// Expression text as last assigned (empty before the first assignment).
    pub fn expression(&self) -> &str {
        self.expression.as_ref().map_or("", Analyzer::source)
    }

    pub fn analyzer(&self) -> Option<&Analyzer> {
        self.expression.as_ref()
    }

    pub fn inlets(&self) -> &[InletId] {
        &self.inlets
    }

    pub fn outlets(&self) -> &[OutletId] {
        &self.outlets
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inlet {
    pub id: InletId,
    pub node: NodeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outlet {
    pub id: OutletId,
    pub node: NodeId,
    pub name: String,
}

/// A connection into an inlet.
///
/// The target is mandatory; the source is `None` while the link dangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub source: Option<OutletId>,
    pub target: InletId,
}

impl Link {
    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_ref_kind() {
        assert_eq!(PortRef::from(InletId::from_index(0)).kind(), PortKind::Inlet);
        assert_eq!(PortRef::from(OutletId::from_index(0)).kind(), PortKind::Outlet);
    }

    #[test]
    fn fresh_node_has_no_ports() {
        let node = Node::new(NodeId::from_index(3), "n1".into());
        assert_eq!(node.expression(), "");
        assert!(node.inlets().is_empty());
        assert!(node.outlets().is_empty());
    }

    #[test]
    fn dangling_link() {
        let link = Link {
            id: LinkId::from_index(0),
            source: None,
            target: InletId::from_index(1),
        };
        assert!(!link.is_connected());
    }
}
