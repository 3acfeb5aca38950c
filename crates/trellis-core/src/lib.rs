// crates/trellis-core/src/lib.rs
pub mod modifier;
pub mod node;
pub mod tree;
pub mod units;

pub use modifier::*;
pub use node::*;
pub use tree::*;
pub use units::*;

#[derive(Debug, thiserror::Error)]
pub enum TrellisError {
    #[error("{unit} unit on node '{node}' is only valid on a layout")]
    LayoutScopedUnit { unit: &'static str, node: String },

    #[error("node '{0}' is not attached to a composition")]
    NotAttached(String),

    #[error("cannot attach '{child}' to non-composition node '{parent}'")]
    AttachToLeaf { parent: String, child: String },
}

pub type Result<T> = std::result::Result<T, TrellisError>;
