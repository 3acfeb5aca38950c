// crates/trellis-runtime/src/engine.rs

use glam::Vec2;
use tracing::debug;
use trellis_core::{units::px, CompositionKind, Modifier, Node, NodeId, Tree};
use trellis_layout::{compose, ComposeEnv};
use trellis_render::RenderBackend;

use crate::builder::TreeBuilder;
use crate::raster::rasterize_pass;
use crate::render_pass::render_node;

/// Owns the tree, the display parameters, and the backend. All state that the
/// engine needs is carried here explicitly; nothing is looked up through a
/// process-wide instance.
pub struct Engine<B: RenderBackend> {
    tree: Tree,
    backend: B,
    root: NodeId,
    viewport: Vec2,
    scale: f32,
    debug_overlay: bool,
}

impl<B: RenderBackend> Engine<B> {
    /// Creates an engine with a plain root composition sized to the display.
    /// The root always renders live; caching starts at its descendants.
    pub fn new(backend: B, width: f32, height: f32, scale: f32) -> Self {
        let mut tree = Tree::new();
        let mut root_node = Node::composition(
            "root",
            CompositionKind::Plain,
            Modifier::new().with_size(px(width), px(height)),
        );
        root_node.optimize = false;
        let root = tree.insert(root_node);

        Self {
            tree,
            backend,
            root,
            viewport: Vec2::new(width, height),
            scale,
            debug_overlay: false,
        }
    }

    /// Declares the tree under the root via a scoped builder.
    pub fn build(&mut self, f: impl FnOnce(&mut TreeBuilder)) {
        let mut builder = TreeBuilder::new(&mut self.tree, self.root);
        f(&mut builder);
    }

    /// Applies new display metrics. The next compose re-resolves everything
    /// that depends on them; static subtrees are untouched, and a scale change
    /// reallocates raster targets through the size check in the raster pass.
    pub fn update_display(&mut self, width: f32, height: f32, scale: f32) {
        debug!(width, height, scale, "display changed");
        self.viewport = Vec2::new(width, height);
        self.scale = scale;
        let root = self.tree.node_mut(self.root);
        root.modifier.width = Some(px(width));
        root.modifier.height = Some(px(height));
        root.composed = false;
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }

    /// Forces `id` and its composition chain to recompose on the next
    /// [`Engine::compose`], for callers that mutated modifiers directly.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.tree.node_mut(node_id);
            node.composed = false;
            current = node.composition;
        }
    }

    /// Lays out the tree, then refreshes raster caches for every composition
    /// that changed. Compositions that did not recompose keep their caches.
    pub fn compose(&mut self) -> anyhow::Result<()> {
        let env = ComposeEnv {
            viewport: self.viewport,
            root: self.root,
        };
        compose(&mut self.tree, self.root, &env)?;
        rasterize_pass(&mut self.tree, self.root, &mut self.backend, self.scale)?;
        Ok(())
    }

    /// Draws one frame from the composed tree.
    pub fn render(&mut self) -> anyhow::Result<()> {
        self.backend
            .begin_frame(self.viewport.x, self.viewport.y, self.scale)?;
        render_node(&self.tree, self.root, &mut self.backend, self.debug_overlay)?;
        self.backend.end_frame()?;
        Ok(())
    }

    pub fn frame(&mut self) -> anyhow::Result<()> {
        self.compose()?;
        self.render()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: RenderBackend> Drop for Engine<B> {
    fn drop(&mut self) {
        // Best-effort release of every raster target still alive.
        let ids: Vec<NodeId> = self.tree.ids().collect();
        for id in ids {
            if let Some(raster) = self.tree.node_mut(id).raster.take() {
                let _ = self.backend.destroy_target(raster.target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::units::percent;
    use trellis_render::{RecordingBackend, RenderOp};

    #[test]
    fn empty_frame_brackets_begin_and_end() {
        let mut engine = Engine::new(RecordingBackend::new(), 800.0, 600.0, 1.0);
        engine.frame().unwrap();

        let ops = engine.backend().ops();
        assert!(matches!(
            ops.first(),
            Some(RenderOp::BeginFrame { width, height, .. }) if *width == 800.0 && *height == 600.0
        ));
        assert!(matches!(ops.last(), Some(RenderOp::EndFrame)));
    }

    #[test]
    fn display_change_resolves_root_relative_sizes() {
        let mut engine = Engine::new(RecordingBackend::new(), 800.0, 600.0, 1.0);
        let mut panel = 0;
        engine.build(|ui| {
            panel = ui.composition(
                "panel",
                Modifier::new().with_size(percent(0.5), percent(1.0)),
                |_| {},
            );
        });
        engine.compose().unwrap();
        assert_eq!(engine.node(panel).width, 400.0);

        engine.update_display(1000.0, 600.0, 1.0);
        engine.compose().unwrap();
        assert_eq!(engine.node(panel).width, 500.0);
    }

    #[test]
    fn static_composition_keeps_one_target_across_frames() {
        let mut engine = Engine::new(RecordingBackend::new(), 800.0, 600.0, 1.0);
        engine.build(|ui| {
            ui.composition("panel", Modifier::new().with_size(px(100.0), px(50.0)), |_| {});
        });
        engine.compose().unwrap();
        engine.compose().unwrap();

        assert_eq!(engine.backend().live_target_count(), 1);
        let creates = engine
            .backend()
            .ops()
            .iter()
            .filter(|op| matches!(op, RenderOp::CreateTarget { .. }))
            .count();
        assert_eq!(creates, 1);
    }
}
