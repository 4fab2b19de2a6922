//! df-editor: interactive editing layer for dagflow.
//!
//! Contains:
//! - linking (the link-dragging state machine)
//! - editor (pointer event routing over the model and its proxies)
//! - scene (the rendering collaborator trait)
//! - config (YAML-loaded editor defaults)

pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod linking;
pub mod scene;

pub use config::EditorConfig;
pub use df_model::ProxyFactory;
pub use editor::{Editor, PointerEvent};
pub use error::{ConfigError, ConfigResult, EditorError, EditorResult, LinkingError};
pub use geometry::{Point, PreviewLine};
pub use linking::{AnchorKind, LinkOutcome, Linker, LinkingState, Preview};
pub use scene::Scene;
