//! Graph store wrapped in bracketed change notifications.
//!
//! Every structural edit runs as begin / mutate / end. Observers see the
//! old structure during the about-to-be event and the new structure during
//! the completion event. Link removal triggered by a node or port removal
//! happens in its own brackets before the owning subtree goes.

use df_core::{InletId, LinkId, ModelPath, NodeId, OutletId};
use df_expr::Analyzer;
use df_graph::{GraphError, GraphResult, GraphStore, PortDiff, PortRef};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::events::{ModelEvent, ModelObserver, Role};
use crate::position::Position;
use crate::projection::HierarchyProjection;

/// Defaults and policy applied by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// Base from which fresh node names are generated.
    pub node_name_base: String,
    /// Expression assigned to newly created nodes.
    pub default_expression: String,
    /// Accept links that close a dependency loop.
    pub allow_cycles: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            node_name_base: "n1".to_string(),
            default_expression: "x+y".to_string(),
            allow_cycles: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Insert,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bracket {
    change: Change,
    parent: ModelPath,
    first: usize,
    last: usize,
}

/// Editing surface over a [`GraphStore`] that notifies an observer.
#[derive(Debug)]
pub struct FlowGraphModel<O> {
    store: GraphStore,
    observer: O,
    settings: ModelSettings,
    bracket: Option<Bracket>,
}

impl<O: ModelObserver> FlowGraphModel<O> {
    pub fn new(store: GraphStore, observer: O) -> Self {
        Self::with_settings(store, observer, ModelSettings::default())
    }

    pub fn with_settings(store: GraphStore, observer: O, settings: ModelSettings) -> Self {
        Self {
            store,
            observer,
            settings,
            bracket: None,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn into_parts(self) -> (GraphStore, O) {
        (self.store, self.observer)
    }

    // ---- brackets ----

    fn begin(&mut self, change: Change, parent: ModelPath, first: usize, last: usize) -> ModelResult<()> {
        if self.bracket.is_some() {
            return Err(ModelError::NestedBracket);
        }
        debug!(?change, %parent, first, last, "begin");
        let event = match change {
            Change::Insert => ModelEvent::RowsAboutToBeInserted {
                parent: parent.clone(),
                first,
                last,
            },
            Change::Remove => ModelEvent::RowsAboutToBeRemoved {
                parent: parent.clone(),
                first,
                last,
            },
        };
        self.observer.notify(&self.store, &event);
        self.bracket = Some(Bracket {
            change,
            parent,
            first,
            last,
        });
        Ok(())
    }

    fn end(&mut self) {
        let Some(Bracket {
            change,
            parent,
            first,
            last,
        }) = self.bracket.take()
        else {
            return;
        };
        debug!(?change, %parent, first, last, "end");
        let event = match change {
            Change::Insert => ModelEvent::RowsInserted {
                parent,
                first,
                last,
            },
            Change::Remove => ModelEvent::RowsRemoved {
                parent,
                first,
                last,
            },
        };
        self.observer.notify(&self.store, &event);
    }

    /// Run `mutate` inside a bracket over rows `first..first + count`.
    fn bracketed<T>(
        &mut self,
        change: Change,
        parent: Position,
        first: usize,
        count: usize,
        mutate: impl FnOnce(&mut GraphStore) -> GraphResult<T>,
    ) -> ModelResult<T> {
        let path = self.store.path(parent)?;
        self.begin(change, path, first, first + count - 1)?;
        let result = mutate(&mut self.store);
        self.end();
        Ok(result?)
    }

    fn data_changed(&mut self, position: Position, roles: Vec<Role>) -> ModelResult<()> {
        let path = self.store.path(position)?;
        self.observer
            .notify(&self.store, &ModelEvent::DataChanged { path, roles });
        Ok(())
    }

    fn require(&self, position: Position) -> ModelResult<()> {
        if self.store.contains(position) {
            Ok(())
        } else {
            Err(ModelError::invalid(position, "stale"))
        }
    }

    // ---- nodes ----

    /// Insert `count` fresh nodes at `row`, each with a generated name and the
    /// default expression.
    pub fn insert_nodes(&mut self, row: usize, count: usize) -> ModelResult<Vec<NodeId>> {
        let existing = self.store.nodes().len();
        if row > existing {
            return Err(ModelError::RowOutOfRange {
                parent: Position::Subgraph,
                row,
                count: existing,
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        Analyzer::parse(&self.settings.default_expression).map_err(GraphError::from)?;

        let base = self.settings.node_name_base.clone();
        let expression = self.settings.default_expression.clone();
        self.bracketed(Change::Insert, Position::Subgraph, row, count, |store| {
            let mut created = Vec::with_capacity(count);
            for offset in 0..count {
                let name = store.unique_node_name(&base);
                let id = store.insert_node(row + offset, name)?;
                store.set_expression(id, &expression)?;
                created.push(id);
            }
            Ok(created)
        })
    }

    /// Append one fresh node.
    pub fn create_node(&mut self) -> ModelResult<NodeId> {
        let row = self.store.nodes().len();
        let created = self.insert_nodes(row, 1)?;
        created
            .first()
            .copied()
            .ok_or_else(|| ModelError::invalid(Position::Subgraph, "no node created"))
    }

    /// Remove `count` nodes starting at `row`.
    ///
    /// Links leaving the doomed nodes are removed first, each in its own
    /// bracket under its target inlet, highest row first.
    pub fn remove_nodes(&mut self, row: usize, count: usize) -> ModelResult<()> {
        let end = row_end(Position::Subgraph, row, count, self.store.nodes().len())?;
        if count == 0 {
            return Ok(());
        }

        let doomed: Vec<NodeId> = self.store.nodes()[row..end].to_vec();
        for &node in &doomed {
            let outlets = self.store.outlets(node).to_vec();
            for outlet in outlets {
                self.remove_outgoing_links(outlet)?;
            }
        }

        self.bracketed(Change::Remove, Position::Subgraph, row, count, |store| {
            for &node in &doomed {
                store.remove_node(node)?;
            }
            Ok(())
        })
    }

    pub fn remove_node(&mut self, node: NodeId) -> ModelResult<()> {
        let row = self
            .store
            .node_row(node)
            .ok_or_else(|| ModelError::invalid(Position::Node(node), "stale"))?;
        self.remove_nodes(row, 1)
    }

    /// Remove every link whose source is `outlet`, grouped per target inlet.
    fn remove_outgoing_links(&mut self, outlet: OutletId) -> ModelResult<()> {
        let mut targets: Vec<InletId> = Vec::new();
        for &link in self.store.links_of(PortRef::Outlet(outlet)) {
            if let Some(inlet) = self.store.link_target(link)
                && !targets.contains(&inlet)
            {
                targets.push(inlet);
            }
        }

        for inlet in targets {
            let mut rows: Vec<usize> = self
                .store
                .links_of(PortRef::Inlet(inlet))
                .iter()
                .enumerate()
                .filter(|&(_, &link)| self.store.link_source(link) == Some(outlet))
                .map(|(row, _)| row)
                .collect();
            rows.sort_unstable_by(|a, b| b.cmp(a));
            for row in rows {
                self.remove_links(inlet, row, 1)?;
            }
        }
        Ok(())
    }

    pub fn set_node_name(&mut self, node: NodeId, name: impl Into<String>) -> ModelResult<()> {
        if self.store.set_node_name(node, name)? {
            self.data_changed(Position::Node(node), vec![Role::Name])?;
        }
        Ok(())
    }

    // ---- expressions ----

    /// Assign `text` to `node`, bracketing every port change.
    ///
    /// A parse failure leaves the store untouched and emits nothing. An
    /// identical expression is a no-op.
    pub fn set_expression(&mut self, node: NodeId, text: &str) -> ModelResult<PortDiff> {
        let diff = self.store.plan_expression(node, text)?;
        if diff.is_identical() {
            return Ok(diff);
        }
        let owner = Position::Node(node);

        for &inlet in diff.removed_inlets() {
            let links = self.store.links_of(PortRef::Inlet(inlet)).len();
            for row in (0..links).rev() {
                self.remove_links(inlet, row, 1)?;
            }
        }
        if !diff.removed_inlets().is_empty() {
            let first = diff.first_changed_row();
            let count = diff.removed_inlets().len();
            self.bracketed(Change::Remove, owner, first, count, |store| {
                store.remove_planned_inlets(&diff)
            })?;
        }
        if !diff.added_names().is_empty() {
            let first = diff.first_changed_row();
            let count = diff.added_names().len();
            self.bracketed(Change::Insert, owner, first, count, |store| {
                store.insert_planned_inlets(&diff)
            })?;
        }
        if diff.new_outlet().is_some() {
            let first = diff.final_inlet_count();
            self.bracketed(Change::Insert, owner, first, 1, |store| {
                store.insert_planned_outlet(&diff)
            })?;
        }

        self.store.commit_expression(&diff)?;
        self.data_changed(owner, vec![Role::Expression])?;
        for &(_, inlet, _) in diff.renamed() {
            self.data_changed(Position::Inlet(inlet), vec![Role::Name])?;
        }
        Ok(diff)
    }

    // ---- links ----

    /// Insert `count` dangling links into `inlet` at `row`.
    pub fn insert_links(&mut self, inlet: InletId, row: usize, count: usize) -> ModelResult<Vec<LinkId>> {
        let parent = Position::Inlet(inlet);
        self.require(parent)?;
        let existing = self.store.links_of(PortRef::Inlet(inlet)).len();
        if row > existing {
            return Err(ModelError::RowOutOfRange {
                parent,
                row,
                count: existing,
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        self.bracketed(Change::Insert, parent, row, count, |store| {
            (0..count)
                .map(|offset| store.insert_link(inlet, row + offset, None))
                .collect()
        })
    }

    /// Remove `count` links of `inlet` starting at `row`.
    pub fn remove_links(&mut self, inlet: InletId, row: usize, count: usize) -> ModelResult<()> {
        let parent = Position::Inlet(inlet);
        self.require(parent)?;
        let links = self.store.links_of(PortRef::Inlet(inlet));
        let end = row_end(parent, row, count, links.len())?;
        if count == 0 {
            return Ok(());
        }
        let doomed: Vec<LinkId> = links[row..end].to_vec();
        self.bracketed(Change::Remove, parent, row, count, |store| {
            for link in doomed {
                store.remove_link(link)?;
            }
            Ok(())
        })
    }

    pub fn remove_link(&mut self, link: LinkId) -> ModelResult<()> {
        let position = Position::Link(link);
        let inlet = self
            .store
            .link_target(link)
            .ok_or_else(|| ModelError::invalid(position, "stale"))?;
        let row = self
            .store
            .index()
            .row(link)
            .ok_or_else(|| ModelError::invalid(position, "stale"))?;
        self.remove_links(inlet, row, 1)
    }

    /// Point `link` at `source` without any policy check.
    pub fn set_link_source(&mut self, link: LinkId, source: Option<OutletId>) -> ModelResult<()> {
        self.store.relink_source(link, source)?;
        self.data_changed(Position::Link(link), vec![Role::Source])
    }

    /// Check that `outlet` may feed `inlet` under the model's policy.
    pub fn check_link(&self, outlet: OutletId, inlet: InletId) -> ModelResult<()> {
        self.require(Position::Outlet(outlet))?;
        self.require(Position::Inlet(inlet))?;
        if self
            .store
            .can_link(PortRef::Outlet(outlet), PortRef::Inlet(inlet))
            .is_none()
        {
            return Err(GraphError::CannotLink {
                what: format!("{outlet} and {inlet} belong to the same node"),
            }
            .into());
        }
        if !self.settings.allow_cycles && self.store.creates_cycle(outlet, inlet)? {
            return Err(GraphError::CycleRejected { outlet, inlet }.into());
        }
        Ok(())
    }

    /// Connect `outlet` to `inlet` with a new link appended to the inlet.
    pub fn add_link(&mut self, outlet: OutletId, inlet: InletId) -> ModelResult<LinkId> {
        self.check_link(outlet, inlet)?;
        let row = self.store.links_of(PortRef::Inlet(inlet)).len();
        let created = self.insert_links(inlet, row, 1)?;
        let link = created
            .first()
            .copied()
            .ok_or_else(|| ModelError::invalid(Position::Inlet(inlet), "no link created"))?;
        self.set_link_source(link, Some(outlet))?;
        Ok(link)
    }

    /// Point `link` at a new source (or detach it), subject to the link policy.
    pub fn relink_source(&mut self, link: LinkId, source: Option<OutletId>) -> ModelResult<()> {
        let inlet = self
            .store
            .link_target(link)
            .ok_or_else(|| ModelError::invalid(Position::Link(link), "stale"))?;
        if let Some(outlet) = source {
            self.check_link(outlet, inlet)?;
        }
        self.set_link_source(link, source)
    }
}

impl<O> HierarchyProjection for FlowGraphModel<O> {
    fn row_count(&self, parent: Position) -> ModelResult<usize> {
        self.store.row_count(parent)
    }

    fn child(&self, parent: Position, row: usize) -> ModelResult<Position> {
        self.store.child(parent, row)
    }

    fn parent(&self, position: Position) -> ModelResult<Option<Position>> {
        self.store.parent(position)
    }

    fn row(&self, position: Position) -> ModelResult<Option<usize>> {
        self.store.row(position)
    }

    fn contains(&self, position: Position) -> bool {
        self.store.contains(position)
    }

    fn inlet_count(&self, node: Position) -> ModelResult<usize> {
        self.store.inlet_count(node)
    }
}

/// End of the span `row..row + count`, if it fits in `existing` rows.
fn row_end(parent: Position, row: usize, count: usize, existing: usize) -> ModelResult<usize> {
    row.checked_add(count)
        .filter(|&end| end <= existing)
        .ok_or(ModelError::RowOutOfRange {
            parent,
            row: row.saturating_add(count),
            count: existing,
        })
}
