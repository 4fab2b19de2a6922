//! Breadth-first walks over node dependencies.

use std::collections::{HashSet, VecDeque};

use df_core::{InletId, NodeId, OutletId};

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;

/// Visit `start` and everything reachable through `next`, breadth first,
/// each node once.
fn bfs(start: NodeId, mut next: impl FnMut(NodeId) -> Vec<NodeId>) -> Vec<NodeId> {
    let mut order = vec![start];
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for child in next(node) {
            if seen.insert(child) {
                order.push(child);
                queue.push_back(child);
            }
        }
    }
    order
}

impl GraphStore {
    /// Nodes feeding `node`, directly or not. `node` itself comes first.
    ///
    /// Per inlet in row order, follows the source of each connected link.
    pub fn ancestors(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        if !self.nodes.contains_key(&node) {
            return Err(GraphError::stale(node));
        }
        Ok(bfs(node, |n| self.input_nodes(n)))
    }

    /// Nodes fed by `node`, directly or not. `node` itself comes first.
    pub fn descendants(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        if !self.nodes.contains_key(&node) {
            return Err(GraphError::stale(node));
        }
        Ok(bfs(node, |n| self.output_nodes(n)))
    }

    /// Source nodes of the connected links into `node`, inlet by inlet.
    pub(crate) fn input_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.inlets(node)
            .iter()
            .flat_map(|&inlet| self.index.inlet_links(inlet))
            .filter_map(|&link| self.index.source(link))
            .filter_map(|outlet| self.outlets.get(&outlet).map(|o| o.node))
            .collect()
    }

    fn output_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.outlets(node)
            .iter()
            .flat_map(|&outlet| self.index.outlet_links(outlet))
            .filter_map(|&link| self.index.target(link))
            .filter_map(|inlet| self.inlets.get(&inlet).map(|i| i.node))
            .collect()
    }

    /// Whether linking `outlet` into `inlet` would close a dependency loop.
    pub fn creates_cycle(&self, outlet: OutletId, inlet: InletId) -> GraphResult<bool> {
        let source = self
            .outlets
            .get(&outlet)
            .ok_or_else(|| GraphError::stale(outlet))?
            .node;
        let target = self
            .inlets
            .get(&inlet)
            .ok_or_else(|| GraphError::stale(inlet))?
            .node;
        Ok(self.descendants(target)?.contains(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a -> b -> c, plus a -> c.
    fn chain() -> (GraphStore, [NodeId; 3]) {
        let mut store = GraphStore::new();
        let a = store.create_node("a").unwrap();
        let b = store.create_node("b").unwrap();
        let c = store.create_node("c").unwrap();
        store.set_expression(a, "1").unwrap();
        store.set_expression(b, "x").unwrap();
        store.set_expression(c, "p + q").unwrap();
        let a_out = store.outlets(a)[0];
        let b_out = store.outlets(b)[0];
        store.insert_link(store.inlets(b)[0], 0, Some(a_out)).unwrap();
        store.insert_link(store.inlets(c)[0], 0, Some(b_out)).unwrap();
        store.insert_link(store.inlets(c)[1], 0, Some(a_out)).unwrap();
        (store, [a, b, c])
    }

    #[test]
    fn ancestors_breadth_first_without_duplicates() {
        let (store, [a, b, c]) = chain();
        assert_eq!(store.ancestors(c).unwrap(), vec![c, b, a]);
        assert_eq!(store.ancestors(a).unwrap(), vec![a]);
    }

    #[test]
    fn descendants_mirror_ancestors() {
        let (store, [a, b, c]) = chain();
        assert_eq!(store.descendants(a).unwrap(), vec![a, b, c]);
        assert_eq!(store.descendants(c).unwrap(), vec![c]);
    }

    #[test]
    fn dangling_links_are_not_followed() {
        let mut store = GraphStore::new();
        let n = store.create_node("n").unwrap();
        store.set_expression(n, "x").unwrap();
        store.insert_link(store.inlets(n)[0], 0, None).unwrap();
        assert_eq!(store.ancestors(n).unwrap(), vec![n]);
    }

    #[test]
    fn cycle_detection() {
        let (store, [a, b, c]) = chain();
        let c_out = store.outlets(c)[0];
        let b_in = store.inlets(b)[0];
        assert!(store.creates_cycle(c_out, b_in).unwrap());
        let a_out = store.outlets(a)[0];
        assert!(!store.creates_cycle(a_out, b_in).unwrap());
    }

    #[test]
    fn walks_terminate_on_cycles() {
        let (mut store, [_, b, c]) = chain();
        store.set_expression(b, "x + y").unwrap();
        let c_out = store.outlets(c)[0];
        store.insert_link(store.inlets(b)[1], 0, Some(c_out)).unwrap();
        let ancestors = store.ancestors(c).unwrap();
        assert_eq!(ancestors.iter().filter(|&&n| n == c).count(), 1);
        assert_eq!(ancestors[0], c);
    }

    #[test]
    fn unknown_node_is_stale() {
        let store = GraphStore::new();
        assert!(matches!(
            store.ancestors(NodeId::from_index(7)),
            Err(GraphError::StaleId { .. })
        ));
    }
}
