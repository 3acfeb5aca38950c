// crates/trellis-runtime/src/builder.rs

use glam::Vec4;
use trellis_core::{
    CompositionKind, Content, CustomLayoutHooks, LayoutStyle, Modifier, Node, NodeId, Tree,
};

/// Scoped declaration of a subtree. Compositions open a scope for the duration
/// of their closure; everything declared inside attaches to them in order.
pub struct TreeBuilder<'a> {
    tree: &'a mut Tree,
    stack: Vec<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(tree: &'a mut Tree, root: NodeId) -> Self {
        Self {
            tree,
            stack: vec![root],
        }
    }

    fn parent(&self) -> NodeId {
        *self.stack.last().expect("builder scope stack is never empty")
    }

    fn attach(&mut self, node: Node) -> NodeId {
        let parent = self.parent();
        self.tree
            .attach(parent, node)
            .expect("builder parents are always compositions")
    }

    fn scoped(
        &mut self,
        name: &str,
        kind: CompositionKind,
        modifier: Modifier,
        layout: LayoutStyle,
        children: impl FnOnce(&mut Self),
    ) -> NodeId {
        let id = self.attach(Node::composition(name, kind, modifier).with_layout(layout));
        self.stack.push(id);
        children(self);
        self.stack.pop();
        id
    }

    pub fn element(&mut self, name: &str, modifier: Modifier) -> NodeId {
        self.attach(Node::element(name, modifier))
    }

    pub fn text(
        &mut self,
        name: &str,
        modifier: Modifier,
        text: impl Into<String>,
        font_size: f32,
        color: Vec4,
    ) -> NodeId {
        self.attach(Node::element(name, modifier).with_content(Content::Text {
            text: text.into(),
            font_size,
            color,
        }))
    }

    pub fn image(
        &mut self,
        name: &str,
        modifier: Modifier,
        source: impl Into<String>,
        opacity: f32,
    ) -> NodeId {
        self.attach(Node::element(name, modifier).with_content(Content::Image {
            source: source.into(),
            opacity,
        }))
    }

    pub fn composition(
        &mut self,
        name: &str,
        modifier: Modifier,
        children: impl FnOnce(&mut Self),
    ) -> NodeId {
        self.scoped(
            name,
            CompositionKind::Plain,
            modifier,
            LayoutStyle::default(),
            children,
        )
    }

    pub fn box_layout(
        &mut self,
        name: &str,
        modifier: Modifier,
        layout: LayoutStyle,
        children: impl FnOnce(&mut Self),
    ) -> NodeId {
        self.scoped(name, CompositionKind::Box, modifier, layout, children)
    }

    pub fn auto_layout(
        &mut self,
        name: &str,
        modifier: Modifier,
        layout: LayoutStyle,
        children: impl FnOnce(&mut Self),
    ) -> NodeId {
        self.scoped(name, CompositionKind::Auto, modifier, layout, children)
    }

    pub fn list(
        &mut self,
        name: &str,
        modifier: Modifier,
        layout: LayoutStyle,
        children: impl FnOnce(&mut Self),
    ) -> NodeId {
        self.scoped(name, CompositionKind::List, modifier, layout, children)
    }

    pub fn custom(
        &mut self,
        name: &str,
        modifier: Modifier,
        hooks: CustomLayoutHooks,
        children: impl FnOnce(&mut Self),
    ) -> NodeId {
        let id = self.scoped(
            name,
            CompositionKind::Custom,
            modifier,
            LayoutStyle::default(),
            children,
        );
        self.tree.node_mut(id).custom = Some(hooks);
        id
    }

    /// Disables raster caching for the most recently declared composition,
    /// forcing its subtree to render live every frame.
    pub fn live(&mut self, id: NodeId) {
        self.tree.node_mut(id).optimize = false;
    }

    pub fn tree(&mut self) -> &mut Tree {
        self.tree
    }
}
