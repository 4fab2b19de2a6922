//! df-core: shared foundation for dagflow.
//!
//! Contains:
//! - ids (compact typed identifiers for nodes, ports and links)
//! - path (root-to-item row paths into the hierarchy projection)
//! - naming (unique name generation)

pub mod ids;
pub mod naming;
pub mod path;

pub use ids::*;
pub use naming::unique_name;
pub use path::ModelPath;
