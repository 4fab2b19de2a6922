//! Tabular and JSON views of a store.

use std::fmt::Write;

use df_core::NodeId;
use df_graph::{GraphResult, GraphStore, PortRef};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InletReport {
    pub name: String,
    /// Source node of every link into the inlet, in row order. `None` for a
    /// dangling link.
    pub sources: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub name: String,
    pub expression: String,
    pub inlets: Vec<InletReport>,
    pub outlets: Vec<String>,
    /// Number of links leaving the node's outlets.
    pub fan_out: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphReport {
    pub nodes: Vec<NodeReport>,
    pub links: usize,
}

impl GraphReport {
    pub fn of(store: &GraphStore) -> GraphResult<Self> {
        let name_of = |node: NodeId| store.node(node).map(|n| n.name.clone());
        let mut nodes = Vec::with_capacity(store.nodes().len());
        for &id in store.nodes() {
            let Some(node) = store.node(id) else { continue };
            let inlets = store
                .inlets(id)
                .iter()
                .filter_map(|&inlet| {
                    let name = store.inlet(inlet)?.name.clone();
                    let sources = store
                        .links_of(PortRef::Inlet(inlet))
                        .iter()
                        .map(|&link| {
                            store
                                .link_source(link)
                                .and_then(|outlet| store.port_node(PortRef::Outlet(outlet)))
                                .and_then(name_of)
                        })
                        .collect();
                    Some(InletReport { name, sources })
                })
                .collect();
            let outlets = store
                .outlets(id)
                .iter()
                .filter_map(|&outlet| store.outlet(outlet).map(|o| o.name.clone()))
                .collect();
            let fan_out = store
                .outlets(id)
                .iter()
                .map(|&outlet| store.links_of(PortRef::Outlet(outlet)).len())
                .sum::<usize>();
            nodes.push(NodeReport {
                id,
                name: node.name.clone(),
                expression: node.expression().to_string(),
                inlets,
                outlets,
                fan_out,
            });
        }
        store.validate()?;
        Ok(Self {
            nodes,
            links: store.link_count(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One line per node followed by its inlets.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        if self.nodes.is_empty() {
            out.push_str("No nodes\n");
            return out;
        }
        let width = self.nodes.iter().map(|n| n.name.len()).max().unwrap_or(0);
        for node in &self.nodes {
            let _ = writeln!(
                out,
                "{:<width$}  = {}  -> {} ({} out)",
                node.name,
                node.expression,
                node.outlets.join(", "),
                node.fan_out,
            );
            for inlet in &node.inlets {
                let sources: Vec<&str> = inlet
                    .sources
                    .iter()
                    .map(|s| s.as_deref().unwrap_or("-"))
                    .collect();
                let fed = if sources.is_empty() {
                    "free".to_string()
                } else {
                    sources.join(", ")
                };
                let _ = writeln!(out, "{:<width$}    .{} <- {}", "", inlet.name, fed);
            }
        }
        let _ = writeln!(out, "{} nodes, {} links", self.nodes.len(), self.links);
        out
    }
}
