//! Script synthesis from a node's ancestor closure.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use df_core::NodeId;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;

impl GraphStore {
    /// Order in which `node` and its ancestors must be evaluated.
    ///
    /// Starts from the reversed breadth-first ancestor order and repairs it
    /// into a dependency order: among nodes whose inputs are all emitted,
    /// the earliest in reversed order goes next. Nodes stuck on a cycle
    /// follow at the end in reversed order.
    pub fn script_order(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut reversed = self.ancestors(node)?;
        reversed.reverse();
        let rank: HashMap<NodeId, usize> =
            reversed.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        // Build adjacency and compute in-degrees within the closure
        let mut dependents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut in_degree: HashMap<NodeId, usize> = reversed.iter().map(|&n| (n, 0)).collect();
        for &to in &reversed {
            for from in self.input_nodes(to) {
                if rank.contains_key(&from) {
                    dependents.entry(from).or_default().push(to);
                    *in_degree.entry(to).or_default() += 1;
                }
            }
        }

        // Kahn's algorithm, always taking the lowest-ranked ready node
        let mut ready: BinaryHeap<Reverse<usize>> = reversed
            .iter()
            .enumerate()
            .filter(|(_, n)| in_degree.get(*n) == Some(&0))
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(reversed.len());
        let mut emitted = vec![false; reversed.len()];
        while let Some(Reverse(i)) = ready.pop() {
            let current = reversed[i];
            emitted[i] = true;
            order.push(current);
            for next in dependents.get(&current).into_iter().flatten() {
                let Some(deg) = in_degree.get_mut(next) else {
                    continue;
                };
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    ready.push(Reverse(rank[next]));
                }
            }
        }

        // Cycle members never become ready
        if order.len() != reversed.len() {
            debug!(%node, stuck = reversed.len() - order.len(), "script closure has a cycle");
            order.extend(
                reversed
                    .iter()
                    .zip(&emitted)
                    .filter(|(_, done)| !**done)
                    .map(|(&n, _)| n),
            );
        }
        Ok(order)
    }

    /// Compile `node` and its ancestors into `name = expr` lines.
    ///
    /// Each inlet variable is replaced by the name of the node feeding its
    /// first connected link. Unconnected inlets keep the variable name.
    /// Nodes that never had an expression contribute nothing.
    pub fn build_script(&self, node: NodeId) -> GraphResult<String> {
        let mut script = String::new();
        for id in self.script_order(node)? {
            let current = self.nodes.get(&id).ok_or_else(|| GraphError::stale(id))?;
            let Some(analyzer) = current.analyzer() else {
                continue;
            };

            let mut mapping: HashMap<String, String> = HashMap::new();
            for &inlet_id in &current.inlets {
                let inlet = self
                    .inlets
                    .get(&inlet_id)
                    .ok_or_else(|| GraphError::stale(inlet_id))?;
                let feeding = self
                    .index
                    .inlet_links(inlet_id)
                    .iter()
                    .find_map(|&link| self.index.source(link))
                    .and_then(|outlet| self.outlets.get(&outlet))
                    .and_then(|outlet| self.nodes.get(&outlet.node));
                if let Some(source) = feeding {
                    mapping.insert(inlet.name.clone(), source.name.clone());
                }
            }

            script.push_str(&current.name);
            script.push_str(" = ");
            script.push_str(&analyzer.substitute(&mapping));
            script.push('\n');
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(store: &mut GraphStore, from: NodeId, to: NodeId, inlet_row: usize) {
        let outlet = store.outlets(from)[0];
        let inlet = store.inlets(to)[inlet_row];
        store.insert_link(inlet, 0, Some(outlet)).unwrap();
    }

    #[test]
    fn two_node_script() {
        let mut store = GraphStore::new();
        let a = store.create_node("A").unwrap();
        let b = store.create_node("B").unwrap();
        store.set_expression(a, "a + b").unwrap();
        store.set_expression(b, "x*x").unwrap();
        link(&mut store, a, b, 0);

        assert_eq!(store.build_script(b).unwrap(), "A = a + b\nB = A * A\n");
        assert_eq!(store.build_script(a).unwrap(), "A = a + b\n");
    }

    #[test]
    fn diamond_emits_dependencies_first() {
        // top -> left -> bottom, top -> bottom, left reached late by BFS
        let mut store = GraphStore::new();
        let top = store.create_node("top").unwrap();
        let left = store.create_node("left").unwrap();
        let bottom = store.create_node("bottom").unwrap();
        store.set_expression(top, "1").unwrap();
        store.set_expression(left, "t").unwrap();
        store.set_expression(bottom, "p + q").unwrap();
        link(&mut store, top, bottom, 0);
        link(&mut store, left, bottom, 1);
        link(&mut store, top, left, 0);

        // BFS from bottom: bottom, top, left; reversed: left, top, bottom
        assert_eq!(store.ancestors(bottom).unwrap(), vec![bottom, top, left]);
        assert_eq!(store.script_order(bottom).unwrap(), vec![top, left, bottom]);
        assert_eq!(
            store.build_script(bottom).unwrap(),
            "top = 1\nleft = top\nbottom = top + left\n"
        );
    }

    #[test]
    fn unconnected_inlets_keep_their_variable() {
        let mut store = GraphStore::new();
        let n = store.create_node("n").unwrap();
        store.set_expression(n, "x ** 2").unwrap();
        store.insert_link(store.inlets(n)[0], 0, None).unwrap();
        assert_eq!(store.build_script(n).unwrap(), "n = x ** 2\n");
    }

    #[test]
    fn first_connected_link_wins() {
        let mut store = GraphStore::new();
        let a = store.create_node("A").unwrap();
        let b = store.create_node("B").unwrap();
        let c = store.create_node("C").unwrap();
        store.set_expression(a, "1").unwrap();
        store.set_expression(b, "2").unwrap();
        store.set_expression(c, "v").unwrap();
        let inlet = store.inlets(c)[0];
        store.insert_link(inlet, 0, None).unwrap();
        store.insert_link(inlet, 1, Some(store.outlets(b)[0])).unwrap();
        store.insert_link(inlet, 2, Some(store.outlets(a)[0])).unwrap();

        assert!(store.build_script(c).unwrap().ends_with("C = B\n"));
    }

    #[test]
    fn cycle_members_follow_the_rest() {
        let mut store = GraphStore::new();
        let a = store.create_node("A").unwrap();
        let b = store.create_node("B").unwrap();
        let c = store.create_node("C").unwrap();
        store.set_expression(a, "1").unwrap();
        store.set_expression(b, "x + y").unwrap();
        store.set_expression(c, "z").unwrap();
        link(&mut store, a, b, 0);
        link(&mut store, b, c, 0);
        link(&mut store, c, b, 1);

        let order = store.script_order(c).unwrap();
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], a);
    }

    #[test]
    fn nodes_without_expression_are_skipped() {
        let mut store = GraphStore::new();
        let n = store.create_node("blank").unwrap();
        assert_eq!(store.build_script(n).unwrap(), "");
    }
}
