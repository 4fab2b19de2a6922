//! df-model: hierarchy projection of a dagflow graph.
//!
//! Provides:
//! - Explicitly tagged positions and the row-addressable projection trait
//! - Bracketed CRUD over the graph store with change notifications
//! - The path-addressed position-proxy index and its sync observer

pub mod error;
pub mod events;
pub mod model;
pub mod position;
pub mod projection;
pub mod proxy_index;
pub mod proxy_sync;

pub use error::{ModelError, ModelResult, ProxyIndexError, ProxyIndexResult};
pub use events::{EventLog, ModelEvent, ModelObserver, Role};
pub use model::{FlowGraphModel, ModelSettings};
pub use position::{Position, PositionKind};
pub use projection::HierarchyProjection;
pub use proxy_index::PositionProxyIndex;
pub use proxy_sync::{ProxyFactory, ProxySync};
