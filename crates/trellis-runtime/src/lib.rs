// crates/trellis-runtime/src/lib.rs

pub mod builder;
pub mod engine;
mod raster;
mod render_pass;

pub use builder::TreeBuilder;
pub use engine::Engine;
