//! Row-addressable tree view over a graph store.
//!
//! Level 0 is the virtual root, level 1 the nodes in store order, level 2 a
//! node's inlets followed by its outlets, level 3 an inlet's links. Outlets
//! and links are leaves.

use df_core::ModelPath;
use df_graph::GraphStore;

use crate::error::{ModelError, ModelResult};
use crate::position::{Position, PositionKind};

/// Read surface of the hierarchy.
///
/// Implementors supply the five structural queries; paths, path lookup and
/// the kind consistency check are derived from them.
pub trait HierarchyProjection {
    fn row_count(&self, parent: Position) -> ModelResult<usize>;

    fn child(&self, parent: Position, row: usize) -> ModelResult<Position>;

    /// Structural parent, `None` for the root.
    fn parent(&self, position: Position) -> ModelResult<Option<Position>>;

    /// Row within the parent, `None` for the root.
    fn row(&self, position: Position) -> ModelResult<Option<usize>>;

    fn contains(&self, position: Position) -> bool;

    fn kind(&self, position: Position) -> PositionKind {
        position.kind()
    }

    /// Root-to-item rows of `position`.
    fn path(&self, position: Position) -> ModelResult<ModelPath> {
        let mut rows = Vec::new();
        let mut current = position;
        while let Some(row) = self.row(current)? {
            rows.push(row);
            current = self
                .parent(current)?
                .ok_or_else(|| ModelError::invalid(current, "has a row but no parent"))?;
        }
        rows.reverse();
        Ok(ModelPath::from(rows))
    }

    fn position_at(&self, path: &ModelPath) -> ModelResult<Position> {
        let mut current = Position::Subgraph;
        for &row in path.rows() {
            current = self
                .child(current, row)
                .map_err(|_| ModelError::NoSuchPath { path: path.clone() })?;
        }
        Ok(current)
    }

    /// Compare the explicit tag against the kind implied by depth and ownership.
    fn check_kind(&self, position: Position) -> ModelResult<()> {
        let path = self.path(position)?;
        let inferred = match path.rows() {
            [] => PositionKind::Subgraph,
            [_] => PositionKind::Node,
            [node, port] => {
                let owner = self.child(Position::Subgraph, *node)?;
                let inlets = self.inlet_count(owner)?;
                if *port < inlets {
                    PositionKind::Inlet
                } else {
                    PositionKind::Outlet
                }
            }
            _ => PositionKind::Link,
        };
        let tagged = self.kind(position);
        if tagged != inferred {
            return Err(ModelError::KindMismatch {
                position,
                tagged,
                inferred,
            });
        }
        Ok(())
    }

    /// Number of leading level-2 rows of `node` that are inlets.
    fn inlet_count(&self, node: Position) -> ModelResult<usize>;
}

impl HierarchyProjection for GraphStore {
    fn row_count(&self, parent: Position) -> ModelResult<usize> {
        match parent {
            Position::Subgraph => Ok(self.nodes().len()),
            Position::Node(id) => {
                let node = self.node(id).ok_or_else(|| ModelError::invalid(parent, "stale"))?;
                Ok(node.inlets().len() + node.outlets().len())
            }
            Position::Inlet(id) => {
                self.inlet(id)
                    .ok_or_else(|| ModelError::invalid(parent, "stale"))?;
                Ok(self.index().inlet_links(id).len())
            }
            Position::Outlet(_) | Position::Link(_) => {
                if self.contains(parent) {
                    Ok(0)
                } else {
                    Err(ModelError::invalid(parent, "stale"))
                }
            }
        }
    }

    fn child(&self, parent: Position, row: usize) -> ModelResult<Position> {
        let count = self.row_count(parent)?;
        let out_of_range = || ModelError::RowOutOfRange { parent, row, count };
        match parent {
            Position::Subgraph => self
                .nodes()
                .get(row)
                .map(|&id| Position::Node(id))
                .ok_or_else(out_of_range),
            Position::Node(id) => {
                let inlets = self.inlets(id);
                match inlets.get(row) {
                    Some(&inlet) => Ok(Position::Inlet(inlet)),
                    None => self
                        .outlets(id)
                        .get(row - inlets.len())
                        .map(|&outlet| Position::Outlet(outlet))
                        .ok_or_else(out_of_range),
                }
            }
            Position::Inlet(id) => self
                .index()
                .inlet_links(id)
                .get(row)
                .map(|&link| Position::Link(link))
                .ok_or_else(out_of_range),
            Position::Outlet(_) | Position::Link(_) => Err(out_of_range()),
        }
    }

    fn parent(&self, position: Position) -> ModelResult<Option<Position>> {
        let stale = || ModelError::invalid(position, "stale");
        match position {
            Position::Subgraph => Ok(None),
            Position::Node(id) => self
                .node(id)
                .map(|_| Some(Position::Subgraph))
                .ok_or_else(stale),
            Position::Inlet(id) => self
                .inlet(id)
                .map(|p| Some(Position::Node(p.node)))
                .ok_or_else(stale),
            Position::Outlet(id) => self
                .outlet(id)
                .map(|p| Some(Position::Node(p.node)))
                .ok_or_else(stale),
            Position::Link(id) => self
                .link_target(id)
                .map(|inlet| Some(Position::Inlet(inlet)))
                .ok_or_else(stale),
        }
    }

    fn row(&self, position: Position) -> ModelResult<Option<usize>> {
        let stale = || ModelError::invalid(position, "stale");
        let row = match position {
            Position::Subgraph => return Ok(None),
            Position::Node(id) => self.node_row(id),
            Position::Inlet(id) => self
                .inlet(id)
                .and_then(|p| self.inlets(p.node).iter().position(|&i| i == id)),
            Position::Outlet(id) => self.outlet(id).and_then(|p| {
                self.outlets(p.node)
                    .iter()
                    .position(|&o| o == id)
                    .map(|row| self.inlets(p.node).len() + row)
            }),
            Position::Link(id) => self.index().row(id),
        };
        row.map(Some).ok_or_else(stale)
    }

    fn contains(&self, position: Position) -> bool {
        match position {
            Position::Subgraph => true,
            Position::Node(id) => self.node(id).is_some(),
            Position::Inlet(id) => self.inlet(id).is_some(),
            Position::Outlet(id) => self.outlet(id).is_some(),
            Position::Link(id) => self.link(id).is_some(),
        }
    }

    fn inlet_count(&self, node: Position) -> ModelResult<usize> {
        match node {
            Position::Node(id) if self.node(id).is_some() => Ok(self.inlets(id).len()),
            Position::Node(_) => Err(ModelError::invalid(node, "stale")),
            _ => Err(ModelError::invalid(node, "not a node")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_graph::GraphBuilder;

    /// A(a, b | result) -> B(x | result)
    fn two_nodes() -> GraphStore {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("A", "a + b")
            .add_node("B", "x*x")
            .add_link("A", "B", "x");
        builder.build().unwrap()
    }

    #[test]
    fn rows_and_children() {
        let store = two_nodes();
        let a = store.node_by_name("A").unwrap();
        let b = store.node_by_name("B").unwrap();

        assert_eq!(store.row_count(Position::Subgraph).unwrap(), 2);
        assert_eq!(store.row_count(Position::Node(a)).unwrap(), 3);
        assert_eq!(
            store.child(Position::Node(a), 2).unwrap(),
            Position::Outlet(store.outlets(a)[0])
        );
        let x = store.inlets(b)[0];
        assert_eq!(store.row_count(Position::Inlet(x)).unwrap(), 1);
        assert!(matches!(
            store.child(Position::Node(a), 3),
            Err(ModelError::RowOutOfRange { row: 3, count: 3, .. })
        ));
    }

    #[test]
    fn paths_round_trip() {
        let store = two_nodes();
        let b = store.node_by_name("B").unwrap();
        let x = store.inlets(b)[0];
        let link = store.index().inlet_links(x)[0];
        let out = store.outlets(b)[0];

        let path = store.path(Position::Link(link)).unwrap();
        assert_eq!(path.rows(), &[1, 0, 0]);
        assert_eq!(store.position_at(&path).unwrap(), Position::Link(link));
        assert_eq!(store.path(Position::Outlet(out)).unwrap().rows(), &[1, 1]);
        assert_eq!(store.path(Position::Subgraph).unwrap(), ModelPath::root());
        assert!(matches!(
            store.position_at(&ModelPath::from([5])),
            Err(ModelError::NoSuchPath { .. })
        ));
    }

    #[test]
    fn kinds_agree_with_depth() {
        let store = two_nodes();
        let a = store.node_by_name("A").unwrap();
        for row in 0..store.row_count(Position::Node(a)).unwrap() {
            let port = store.child(Position::Node(a), row).unwrap();
            store.check_kind(port).unwrap();
        }
        store.check_kind(Position::Subgraph).unwrap();
        store.check_kind(Position::Node(a)).unwrap();
    }

    /// Wraps a store but mislabels every outlet as an inlet.
    struct Mislabeled(GraphStore);

    impl HierarchyProjection for Mislabeled {
        fn row_count(&self, parent: Position) -> ModelResult<usize> {
            self.0.row_count(parent)
        }
        fn child(&self, parent: Position, row: usize) -> ModelResult<Position> {
            self.0.child(parent, row)
        }
        fn parent(&self, position: Position) -> ModelResult<Option<Position>> {
            self.0.parent(position)
        }
        fn row(&self, position: Position) -> ModelResult<Option<usize>> {
            self.0.row(position)
        }
        fn contains(&self, position: Position) -> bool {
            self.0.contains(position)
        }
        fn kind(&self, position: Position) -> PositionKind {
            match position {
                Position::Outlet(_) => PositionKind::Inlet,
                other => other.kind(),
            }
        }
        fn inlet_count(&self, node: Position) -> ModelResult<usize> {
            self.0.inlet_count(node)
        }
    }

    #[test]
    fn mislabeled_kind_is_reported() {
        let wrapped = Mislabeled(two_nodes());
        let a = wrapped.0.node_by_name("A").unwrap();
        let outlet = Position::Outlet(wrapped.0.outlets(a)[0]);
        assert!(matches!(
            wrapped.check_kind(outlet),
            Err(ModelError::KindMismatch {
                tagged: PositionKind::Inlet,
                inferred: PositionKind::Outlet,
                ..
            })
        ));
    }

    #[test]
    fn stale_positions_are_invalid() {
        let mut store = two_nodes();
        let a = store.node_by_name("A").unwrap();
        store.remove_node(a).unwrap();
        assert!(!store.contains(Position::Node(a)));
        assert!(matches!(
            store.path(Position::Node(a)),
            Err(ModelError::InvalidPosition { .. })
        ));
    }
}
