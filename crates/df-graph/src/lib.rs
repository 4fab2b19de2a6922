//! df-graph: graph store for dagflow.
//!
//! Provides:
//! - Core data structures (Node, Inlet, Outlet, Link)
//! - A mutable store deriving inlets from node expressions
//! - The port/link reverse index kept in step with the store
//! - Ancestor/descendant walks and script synthesis
//! - A name-addressed builder with validation
//!
//! # Example
//!
//! ```
//! use df_graph::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! builder
//!     .add_node("A", "a + b")
//!     .add_node("B", "x*x")
//!     .add_link("A", "B", "x");
//! let store = builder.build().unwrap();
//!
//! let b = store.node_by_name("B").unwrap();
//! assert_eq!(store.build_script(b).unwrap(), "A = a + b\nB = A * A\n");
//! ```

pub mod builder;
pub mod diff;
pub mod error;
pub mod graph;
pub mod index;
mod script;
pub mod store;
mod traversal;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use diff::PortDiff;
pub use error::{GraphError, GraphResult};
pub use graph::{Inlet, Link, Node, Outlet, PortKind, PortRef};
pub use index::PortLinkIndex;
pub use store::{DEFAULT_OUTLET, GraphStore};
