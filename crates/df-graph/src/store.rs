//! Mutable graph store.
//!
//! Owns nodes, ports and links, and keeps the [`PortLinkIndex`] in step with
//! every structural link change. The store does not police cycles; that is
//! left to the editing layer.

use std::collections::HashMap;

use df_core::{IdAllocator, InletId, LinkId, NodeId, OutletId, unique_name};
use df_expr::Analyzer;
use tracing::debug;

use crate::diff::PortDiff;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Inlet, Link, Node, Outlet, PortRef};
use crate::index::PortLinkIndex;
use crate::validate;

/// Name given to the outlet created on a node's first expression assignment.
pub const DEFAULT_OUTLET: &str = "result";

#[derive(Debug, Clone)]
pub struct GraphStore {
    pub(crate) order: Vec<NodeId>,
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) inlets: HashMap<InletId, Inlet>,
    pub(crate) outlets: HashMap<OutletId, Outlet>,
    pub(crate) links: HashMap<LinkId, Link>,
    pub(crate) index: PortLinkIndex,
    node_ids: IdAllocator,
    inlet_ids: IdAllocator,
    outlet_ids: IdAllocator,
    link_ids: IdAllocator,
    outlet_name: String,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_outlet_name(DEFAULT_OUTLET)
    }

    /// Store whose nodes get an outlet called `name`.
    pub fn with_outlet_name(name: impl Into<String>) -> Self {
        Self {
            order: Vec::new(),
            nodes: HashMap::new(),
            inlets: HashMap::new(),
            outlets: HashMap::new(),
            links: HashMap::new(),
            index: PortLinkIndex::new(),
            node_ids: IdAllocator::new(),
            inlet_ids: IdAllocator::new(),
            outlet_ids: IdAllocator::new(),
            link_ids: IdAllocator::new(),
            outlet_name: name.into(),
        }
    }

    // ---- queries ----

    /// Nodes in row order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    pub fn node_row(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|&n| n == id)
    }

    pub fn inlet(&self, id: InletId) -> Option<&Inlet> {
        self.inlets.get(&id)
    }

    pub fn outlet(&self, id: OutletId) -> Option<&Outlet> {
        self.outlets.get(&id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// Inlets of `node` in row order; empty for unknown nodes.
    pub fn inlets(&self, node: NodeId) -> &[InletId] {
        self.nodes.get(&node).map_or(&[], |n| &n.inlets)
    }

    /// Outlets of `node` in row order; empty for unknown nodes.
    pub fn outlets(&self, node: NodeId) -> &[OutletId] {
        self.nodes.get(&node).map_or(&[], |n| &n.outlets)
    }

    /// Links attached to `port`: row order for inlets, creation order for outlets.
    pub fn links_of(&self, port: PortRef) -> &[LinkId] {
        match port {
            PortRef::Inlet(inlet) => self.index.inlet_links(inlet),
            PortRef::Outlet(outlet) => self.index.outlet_links(outlet),
        }
    }

    pub fn link_source(&self, link: LinkId) -> Option<OutletId> {
        self.index.source(link)
    }

    pub fn link_target(&self, link: LinkId) -> Option<InletId> {
        self.index.target(link)
    }

    /// Node owning `port`.
    pub fn port_node(&self, port: PortRef) -> Option<NodeId> {
        match port {
            PortRef::Inlet(id) => self.inlets.get(&id).map(|p| p.node),
            PortRef::Outlet(id) => self.outlets.get(&id).map(|p| p.node),
        }
    }

    pub fn port_name(&self, port: PortRef) -> Option<&str> {
        match port {
            PortRef::Inlet(id) => self.inlets.get(&id).map(|p| p.name.as_str()),
            PortRef::Outlet(id) => self.outlets.get(&id).map(|p| p.name.as_str()),
        }
    }

    pub fn index(&self) -> &PortLinkIndex {
        &self.index
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Name of the outlet created on first expression assignment.
    pub fn outlet_name(&self) -> &str {
        &self.outlet_name
    }

    /// `base`, or `base` with its trailing number bumped until no node uses it.
    pub fn unique_node_name(&self, base: &str) -> String {
        unique_name(base, self.nodes.values().map(|n| n.name.as_str()))
    }

    /// Resolve an (outlet, inlet) pair from two ports, if they can be linked.
    ///
    /// Requires exactly one outlet and one inlet, owned by different nodes.
    pub fn can_link(&self, a: PortRef, b: PortRef) -> Option<(OutletId, InletId)> {
        let (outlet, inlet) = match (a, b) {
            (PortRef::Outlet(o), PortRef::Inlet(i)) | (PortRef::Inlet(i), PortRef::Outlet(o)) => {
                (o, i)
            }
            _ => return None,
        };
        let from = self.outlets.get(&outlet)?.node;
        let to = self.inlets.get(&inlet)?.node;
        (from != to).then_some((outlet, inlet))
    }

    /// Cross-check every id reference and the port-link index.
    pub fn validate(&self) -> GraphResult<()> {
        validate::validate_store(self)
    }

    fn require_node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes.get(&id).ok_or_else(|| GraphError::stale(id))
    }

    fn require_inlet(&self, id: InletId) -> GraphResult<&Inlet> {
        self.inlets.get(&id).ok_or_else(|| GraphError::stale(id))
    }

    fn require_outlet(&self, id: OutletId) -> GraphResult<&Outlet> {
        self.outlets.get(&id).ok_or_else(|| GraphError::stale(id))
    }

    fn require_link(&self, id: LinkId) -> GraphResult<&Link> {
        self.links.get(&id).ok_or_else(|| GraphError::stale(id))
    }

    fn check_name_free(&self, name: &str, except: Option<NodeId>) -> GraphResult<()> {
        let taken = self
            .nodes
            .values()
            .any(|n| n.name == name && Some(n.id) != except);
        if taken {
            return Err(GraphError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    // ---- nodes ----

    /// Append a node with no expression and no ports.
    pub fn create_node(&mut self, name: impl Into<String>) -> GraphResult<NodeId> {
        let row = self.order.len();
        self.insert_node(row, name)
    }

    /// Insert a node with no expression and no ports at `row`.
    pub fn insert_node(&mut self, row: usize, name: impl Into<String>) -> GraphResult<NodeId> {
        let name = name.into();
        if row > self.order.len() {
            return Err(GraphError::RowOutOfRange {
                row,
                count: self.order.len(),
            });
        }
        self.check_name_free(&name, None)?;

        let id = NodeId::from_index(self.node_ids.next_index());
        debug!(%id, %name, row, "create node");
        self.nodes.insert(id, Node::new(id, name));
        self.order.insert(row, id);
        Ok(id)
    }

    /// Remove a node with its ports, every link into it and every link out of it.
    ///
    /// Returns the removed links.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<Vec<Link>> {
        let node = self.require_node(id)?;
        let mut doomed: Vec<LinkId> = Vec::new();
        for &outlet in &node.outlets {
            doomed.extend_from_slice(self.index.outlet_links(outlet));
        }
        for &inlet in &node.inlets {
            for &link in self.index.inlet_links(inlet) {
                if !doomed.contains(&link) {
                    doomed.push(link);
                }
            }
        }

        let mut removed = Vec::with_capacity(doomed.len());
        for link in doomed {
            removed.push(self.remove_link(link)?);
        }

        let node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| GraphError::stale(id))?;
        for inlet in &node.inlets {
            self.inlets.remove(inlet);
        }
        for outlet in &node.outlets {
            self.outlets.remove(outlet);
        }
        self.order.retain(|&n| n != id);
        debug!(%id, name = %node.name, links = removed.len(), "remove node");
        Ok(removed)
    }

    /// Rename a node. Renaming to its own name is a no-op.
    pub fn set_node_name(&mut self, id: NodeId, name: impl Into<String>) -> GraphResult<bool> {
        let name = name.into();
        if self.require_node(id)?.name == name {
            return Ok(false);
        }
        self.check_name_free(&name, Some(id))?;
        if let Some(node) = self.nodes.get_mut(&id) {
            debug!(%id, from = %node.name, to = %name, "rename node");
            node.name = name;
        }
        Ok(true)
    }

    // ---- links ----

    /// Create a link into `target` at `row`, optionally from `source`.
    pub fn insert_link(
        &mut self,
        target: InletId,
        row: usize,
        source: Option<OutletId>,
    ) -> GraphResult<LinkId> {
        self.require_inlet(target)?;
        if let Some(source) = source {
            self.require_outlet(source)?;
        }

        let id = LinkId::from_index(self.link_ids.next_index());
        self.index.link(id, source, target, row)?;
        self.links.insert(id, Link { id, source, target });
        debug!(%id, %target, row, ?source, "insert link");
        Ok(id)
    }

    pub fn remove_link(&mut self, id: LinkId) -> GraphResult<Link> {
        self.require_link(id)?;
        let (source, target, row) = self.index.unlink(id)?;
        let link = self.links.remove(&id).ok_or_else(|| GraphError::stale(id))?;
        if link.source != source || link.target != target {
            return Err(GraphError::inconsistent(format!(
                "{id} indexed as {source:?} -> {target} but stored as {:?} -> {}",
                link.source, link.target
            )));
        }
        debug!(%id, %target, row, ?source, "remove link");
        Ok(link)
    }

    /// Point `link` at a new source (or detach it). Returns the previous source.
    pub fn relink_source(
        &mut self,
        id: LinkId,
        source: Option<OutletId>,
    ) -> GraphResult<Option<OutletId>> {
        self.require_link(id)?;
        if let Some(source) = source {
            self.require_outlet(source)?;
        }
        let previous = self.index.set_source(id, source)?;
        if let Some(link) = self.links.get_mut(&id) {
            link.source = source;
        }
        debug!(%id, ?previous, ?source, "relink source");
        Ok(previous)
    }

    // ---- expressions ----

    /// Parse `text` and plan the port changes it implies, without mutating.
    pub fn plan_expression(&self, node: NodeId, text: &str) -> GraphResult<PortDiff> {
        let current = self.require_node(node)?;
        let analyzer = Analyzer::parse(text)?;
        let inlets: Vec<(InletId, &str)> = current
            .inlets
            .iter()
            .map(|&id| {
                self.require_inlet(id)
                    .map(|inlet| (id, inlet.name.as_str()))
            })
            .collect::<GraphResult<_>>()?;
        let outlet = current
            .outlets
            .is_empty()
            .then(|| self.outlet_name.clone());
        Ok(PortDiff::plan(
            node,
            &inlets,
            current.expression.as_ref().map(Analyzer::source),
            analyzer,
            outlet,
        ))
    }

    /// Assign an expression, re-deriving the node's ports.
    ///
    /// On a parse error the store is left untouched. Returns the applied plan.
    pub fn set_expression(&mut self, node: NodeId, text: &str) -> GraphResult<PortDiff> {
        let diff = self.plan_expression(node, text)?;
        if diff.is_identical() {
            return Ok(diff);
        }
        self.remove_planned_inlets(&diff)?;
        self.insert_planned_inlets(&diff)?;
        self.insert_planned_outlet(&diff)?;
        self.commit_expression(&diff)?;
        Ok(diff)
    }

    /// First stage of applying `diff`: drop trailing inlets and their links.
    pub fn remove_planned_inlets(&mut self, diff: &PortDiff) -> GraphResult<Vec<Link>> {
        let node = self.require_node(diff.node)?;
        if diff.removed.is_empty() {
            return Ok(Vec::new());
        }
        if node.inlets.get(diff.keep..) != Some(diff.removed.as_slice()) {
            return Err(GraphError::StalePlan { node: diff.node });
        }

        let mut removed = Vec::new();
        for &inlet in &diff.removed {
            let links: Vec<LinkId> = self.index.inlet_links(inlet).to_vec();
            for link in links {
                removed.push(self.remove_link(link)?);
            }
            self.inlets.remove(&inlet);
        }
        if let Some(node) = self.nodes.get_mut(&diff.node) {
            node.inlets.truncate(diff.keep);
        }
        debug!(node = %diff.node, count = diff.removed.len(), "remove inlets");
        Ok(removed)
    }

    /// Second stage: append the planned inlets.
    pub fn insert_planned_inlets(&mut self, diff: &PortDiff) -> GraphResult<Vec<InletId>> {
        if diff.added.is_empty() {
            return Ok(Vec::new());
        }
        if self.require_node(diff.node)?.inlets.len() != diff.keep {
            return Err(GraphError::StalePlan { node: diff.node });
        }

        let mut created = Vec::with_capacity(diff.added.len());
        for name in &diff.added {
            let id = InletId::from_index(self.inlet_ids.next_index());
            self.inlets.insert(
                id,
                Inlet {
                    id,
                    node: diff.node,
                    name: name.clone(),
                },
            );
            created.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&diff.node) {
            node.inlets.extend_from_slice(&created);
        }
        debug!(node = %diff.node, names = ?diff.added, "insert inlets");
        Ok(created)
    }

    /// Third stage: create the node's outlet on its first assignment.
    pub fn insert_planned_outlet(&mut self, diff: &PortDiff) -> GraphResult<Option<OutletId>> {
        let Some(name) = &diff.outlet else {
            return Ok(None);
        };
        if !self.require_node(diff.node)?.outlets.is_empty() {
            return Err(GraphError::StalePlan { node: diff.node });
        }
        let id = OutletId::from_index(self.outlet_ids.next_index());
        self.outlets.insert(
            id,
            Outlet {
                id,
                node: diff.node,
                name: name.clone(),
            },
        );
        if let Some(node) = self.nodes.get_mut(&diff.node) {
            node.outlets.push(id);
        }
        debug!(node = %diff.node, %id, %name, "insert outlet");
        Ok(Some(id))
    }

    /// Last stage: rename kept inlets and store the new expression.
    pub fn commit_expression(&mut self, diff: &PortDiff) -> GraphResult<()> {
        if self.require_node(diff.node)?.inlets.len() != diff.final_inlet_count() {
            return Err(GraphError::StalePlan { node: diff.node });
        }
        for (_, inlet, name) in &diff.renamed {
            let inlet = self
                .inlets
                .get_mut(inlet)
                .ok_or_else(|| GraphError::stale(*inlet))?;
            inlet.name = name.clone();
        }
        if let Some(node) = self.nodes.get_mut(&diff.node) {
            debug!(id = %diff.node, expression = diff.analyzer.source(), "set expression");
            node.expression = Some(diff.analyzer.clone());
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn expression() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-f]", 1..6).prop_map(|names| names.join(" + "))
    }

    proptest! {
        #[test]
        fn inlets_follow_free_variables(exprs in prop::collection::vec(expression(), 1..8)) {
            let mut store = GraphStore::new();
            let src = store.create_node("src").unwrap();
            let n = store.create_node("n").unwrap();
            store.set_expression(src, "0").unwrap();
            let outlet = store.outlets(src)[0];

            for text in &exprs {
                store.set_expression(n, text).unwrap();
                if let Some(&first) = store.inlets(n).first() {
                    store.insert_link(first, 0, Some(outlet)).unwrap();
                }
                let names: Vec<String> = store
                    .inlets(n)
                    .iter()
                    .map(|&i| store.inlet(i).unwrap().name.clone())
                    .collect();
                prop_assert_eq!(names, df_expr::free_variables(text).unwrap());
                prop_assert!(store.validate().is_ok());
            }
        }
    }
}
