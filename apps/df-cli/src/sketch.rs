//! YAML scenario sketches driven through the model's CRUD surface.

use std::path::Path;

use df_core::NodeId;
use df_editor::{ConfigError, EditorConfig};
use df_graph::GraphStore;
use df_model::{FlowGraphModel, ModelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub type SketchResult<T> = Result<T, SketchError>;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("No node named {name:?}")]
    UnknownNode { name: String },

    #[error("Node {node:?} has no inlet named {inlet:?}")]
    UnknownInlet { node: String, inlet: String },

    /// A link target not written as `node.inlet`.
    #[error("Link target {target:?} is not of the form node.inlet")]
    BadTarget { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSketch {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSketch {
    /// Source node name.
    pub from: String,
    /// `node.inlet`
    pub to: String,
}

/// Read-only description of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    #[serde(default)]
    pub nodes: Vec<NodeSketch>,
    #[serde(default)]
    pub links: Vec<LinkSketch>,
}

impl Sketch {
    pub fn from_yaml_str(yaml: &str) -> SketchResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> SketchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Replay the sketch as node and link edits on a fresh model.
    ///
    /// Links are added in order, so the first link into an inlet is the one
    /// that feeds it.
    pub fn build(&self, config: &EditorConfig) -> SketchResult<GraphStore> {
        config.validate()?;
        let store = GraphStore::with_outlet_name(config.default_outlet.clone());
        let mut model = FlowGraphModel::with_settings(store, (), config.model_settings());

        for spec in &self.nodes {
            let node = model.create_node()?;
            model.set_node_name(node, spec.name.as_str())?;
            model.set_expression(node, &spec.expression)?;
        }

        for spec in &self.links {
            let (target_name, inlet_name) = spec
                .to
                .split_once('.')
                .filter(|(node, inlet)| !node.is_empty() && !inlet.is_empty())
                .ok_or_else(|| SketchError::BadTarget {
                    target: spec.to.clone(),
                })?;
            let store = model.store();
            let source = lookup(store, &spec.from)?;
            let target = lookup(store, target_name)?;
            let inlet = store
                .inlets(target)
                .iter()
                .copied()
                .find(|&i| store.inlet(i).is_some_and(|p| p.name == inlet_name))
                .ok_or_else(|| SketchError::UnknownInlet {
                    node: target_name.to_string(),
                    inlet: inlet_name.to_string(),
                })?;
            let Some(&outlet) = store.outlets(source).first() else {
                return Err(SketchError::UnknownNode {
                    name: spec.from.clone(),
                });
            };
            model.add_link(outlet, inlet)?;
        }

        let (store, ()) = model.into_parts();
        debug!(
            nodes = store.nodes().len(),
            links = store.link_count(),
            "sketch replayed"
        );
        Ok(store)
    }
}

fn lookup(store: &GraphStore, name: &str) -> SketchResult<NodeId> {
    store.node_by_name(name).ok_or_else(|| SketchError::UnknownNode {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_graph::GraphError;

    const SCENARIO: &str = r#"
nodes:
  - name: A
    expression: a + b
  - name: B
    expression: x*x
links:
  - from: A
    to: B.x
"#;

    #[test]
    fn scenario_sketch_builds_script() {
        let sketch = Sketch::from_yaml_str(SCENARIO).unwrap();
        let store = sketch.build(&EditorConfig::default()).unwrap();
        let b = store.node_by_name("B").unwrap();
        assert_eq!(store.build_script(b).unwrap(), "A = a + b\nB = A * A\n");
        store.validate().unwrap();
    }

    #[test]
    fn empty_sketch_is_empty_store() {
        let store = Sketch::from_yaml_str("{}")
            .unwrap()
            .build(&EditorConfig::default())
            .unwrap();
        assert!(store.nodes().is_empty());
    }

    #[test]
    fn outlet_name_comes_from_config() {
        let config = EditorConfig {
            default_outlet: "out".to_string(),
            ..EditorConfig::default()
        };
        let store = Sketch::from_yaml_str(SCENARIO)
            .unwrap()
            .build(&config)
            .unwrap();
        let a = store.node_by_name("A").unwrap();
        assert_eq!(store.outlet(store.outlets(a)[0]).unwrap().name, "out");
    }

    #[test]
    fn bad_targets_are_reported() {
        let mut sketch = Sketch::from_yaml_str(SCENARIO).unwrap();
        sketch.links[0].to = "Bx".to_string();
        assert!(matches!(
            sketch.build(&EditorConfig::default()),
            Err(SketchError::BadTarget { .. })
        ));

        sketch.links[0].to = "B.z".to_string();
        assert!(matches!(
            sketch.build(&EditorConfig::default()),
            Err(SketchError::UnknownInlet { .. })
        ));

        sketch.links[0].to = "C.x".to_string();
        assert!(matches!(
            sketch.build(&EditorConfig::default()),
            Err(SketchError::UnknownNode { .. })
        ));
    }

    #[test]
    fn cyclic_sketch_is_refused_by_default() {
        let yaml = r#"
nodes:
  - { name: A, expression: u }
  - { name: B, expression: v }
links:
  - { from: A, to: B.v }
  - { from: B, to: A.u }
"#;
        let sketch = Sketch::from_yaml_str(yaml).unwrap();
        assert!(matches!(
            sketch.build(&EditorConfig::default()),
            Err(SketchError::Model(ModelError::Graph(
                GraphError::CycleRejected { .. }
            )))
        ));
    }

    #[test]
    fn malformed_expression_is_a_parse_error() {
        let yaml = "nodes:\n  - { name: A, expression: 'a +' }\n";
        let sketch = Sketch::from_yaml_str(yaml).unwrap();
        assert!(matches!(
            sketch.build(&EditorConfig::default()),
            Err(SketchError::Model(ModelError::Graph(GraphError::Parse(_))))
        ));
    }
}
