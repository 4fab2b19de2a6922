//! Incremental graph builder addressed by names.

use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;

#[derive(Debug, Clone)]
struct NodeSpec {
    name: String,
    expression: String,
}

#[derive(Debug, Clone)]
struct LinkSpec {
    source: String,
    target_node: String,
    target_inlet: String,
}

/// Builder for constructing a store from node and link descriptions.
///
/// Use `add_node` and `add_link`, then call `build()` to resolve names,
/// derive ports and validate the result.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    outlet_name: Option<String>,
    nodes: Vec<NodeSpec>,
    links: Vec<LinkSpec>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the outlet each node gets (defaults to `result`).
    pub fn outlet_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.outlet_name = Some(name.into());
        self
    }

    pub fn add_node(&mut self, name: impl Into<String>, expression: impl Into<String>) -> &mut Self {
        self.nodes.push(NodeSpec {
            name: name.into(),
            expression: expression.into(),
        });
        self
    }

    /// Link the outlet of node `source` into inlet `inlet` of node `target`.
    pub fn add_link(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        inlet: impl Into<String>,
    ) -> &mut Self {
        self.links.push(LinkSpec {
            source: source.into(),
            target_node: target.into(),
            target_inlet: inlet.into(),
        });
        self
    }

    /// Build and validate the store.
    pub fn build(&self) -> GraphResult<GraphStore> {
        let mut store = match &self.outlet_name {
            Some(name) => GraphStore::with_outlet_name(name.clone()),
            None => GraphStore::new(),
        };

        for spec in &self.nodes {
            let id = store.create_node(spec.name.clone())?;
            store.set_expression(id, &spec.expression)?;
        }

        for spec in &self.links {
            let source = store
                .node_by_name(&spec.source)
                .ok_or_else(|| GraphError::UnknownNode {
                    name: spec.source.clone(),
                })?;
            let target = store
                .node_by_name(&spec.target_node)
                .ok_or_else(|| GraphError::UnknownNode {
                    name: spec.target_node.clone(),
                })?;
            let outlet = *store
                .outlets(source)
                .first()
                .ok_or_else(|| GraphError::UnknownPort {
                    node: spec.source.clone(),
                    port: store.outlet_name().to_string(),
                })?;
            let inlet = store
                .inlets(target)
                .iter()
                .copied()
                .find(|&i| store.inlet(i).is_some_and(|p| p.name == spec.target_inlet))
                .ok_or_else(|| GraphError::UnknownPort {
                    node: spec.target_node.clone(),
                    port: spec.target_inlet.clone(),
                })?;
            let row = store.index().inlet_links(inlet).len();
            store.insert_link(inlet, row, Some(outlet))?;
        }

        store.validate()?;
        debug!(
            nodes = store.nodes().len(),
            links = store.link_count(),
            "built graph"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("A", "a + b")
            .add_node("B", "x*x")
            .add_link("A", "B", "x");
        let store = builder.build().unwrap();

        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.link_count(), 1);
        let b = store.node_by_name("B").unwrap();
        assert_eq!(store.build_script(b).unwrap(), "A = a + b\nB = A * A\n");
    }

    #[test]
    fn builder_unknown_names() {
        let mut builder = GraphBuilder::new();
        builder.add_node("A", "1").add_link("A", "Z", "x");
        assert!(matches!(
            builder.build(),
            Err(GraphError::UnknownNode { name }) if name == "Z"
        ));

        let mut builder = GraphBuilder::new();
        builder
            .add_node("A", "1")
            .add_node("B", "y")
            .add_link("A", "B", "x");
        assert!(matches!(
            builder.build(),
            Err(GraphError::UnknownPort { port, .. }) if port == "x"
        ));
    }

    #[test]
    fn builder_custom_outlet_name() {
        let mut builder = GraphBuilder::new();
        builder.outlet_name("out").add_node("A", "1");
        let store = builder.build().unwrap();
        let a = store.node_by_name("A").unwrap();
        assert_eq!(store.outlet(store.outlets(a)[0]).unwrap().name, "out");
    }

    #[test]
    fn builder_rejects_bad_expression() {
        let mut builder = GraphBuilder::new();
        builder.add_node("A", "1 +");
        assert!(matches!(builder.build(), Err(GraphError::Parse(_))));
    }
}
