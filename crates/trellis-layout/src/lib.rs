// crates/trellis-layout/src/lib.rs

pub mod compose;
mod passes;

pub use compose::{compose, ComposeEnv};
