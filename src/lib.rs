// src/lib.rs
//
// Facade over the workspace crates: one `use trellis_ui::*` pulls in the unit
// helpers, modifier types, tree, compose driver, backend trait, and engine.

pub use trellis_core::*;
pub use trellis_layout::{compose, ComposeEnv};
pub use trellis_render::{
    color, RecordingBackend, RenderBackend, RenderError, RenderOp, RenderResult,
};
pub use trellis_runtime::{Engine, TreeBuilder};
