//! Error types for the editor layer.

use df_graph::GraphError;
use df_model::{ModelError, Position};
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Linking(#[from] LinkingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<GraphError> for EditorError {
    fn from(err: GraphError) -> Self {
        EditorError::Model(ModelError::Graph(err))
    }
}

/// Gesture calls made in the wrong state or on the wrong kind of item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkingError {
    #[error("No link gesture in progress")]
    NotLinking,

    #[error("{position} cannot be dragged")]
    NotDraggable { position: Position },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {what}")]
    Invalid { what: String },
}
