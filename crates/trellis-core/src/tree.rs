// crates/trellis-core/src/tree.rs
use glam::Vec2;
use tracing::trace;

use crate::node::{Node, NodeId};
use crate::{Result, TrellisError};

/// Arena that exclusively owns every node. Parents own children only through
/// their `children` lists; `parent`/`composition` back-references are
/// lookup-only indices. Nodes are attached exactly once and never re-parented.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a detached node (used for roots). Prefer [`Tree::attach`].
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    /// Attaches `node` as the last child of `parent`, wiring both back-references.
    pub fn attach(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId> {
        let parent_node = self.node(parent);
        if !parent_node.is_composition() {
            return Err(TrellisError::AttachToLeaf {
                parent: parent_node.name.clone(),
                child: node.name,
            });
        }
        node.parent = Some(parent);
        node.composition = Some(parent);
        let id = self.insert(node);
        self.node_mut(parent).children.push(id);
        trace!(parent, id, "node attached");
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    /// Parent size for unit resolution, falling back to the owning composition
    /// when the node has no parent. This is how a top-level node resolves
    /// percentage units against its composition.
    pub fn parent_size(&self, id: NodeId) -> Result<Vec2> {
        let node = self.node(id);
        if let Some(parent) = node.parent {
            return Ok(self.node(parent).size());
        }
        if let Some(composition) = node.composition {
            return Ok(self.node(composition).size());
        }
        Err(TrellisError::NotAttached(node.name.clone()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len() as NodeId
    }
}
