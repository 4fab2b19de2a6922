//! df-cli: command-line front end for dagflow graphs.
//!
//! Loads YAML sketches through the editing model, reports on the resulting
//! graph and prints node scripts.

pub mod report;
pub mod sketch;

pub use report::{GraphReport, InletReport, NodeReport};
pub use sketch::{LinkSketch, NodeSketch, Sketch, SketchError, SketchResult};
