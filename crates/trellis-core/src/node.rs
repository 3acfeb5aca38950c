// crates/trellis-core/src/node.rs
use std::fmt;

use glam::{Vec2, Vec4};

use crate::modifier::{LayoutDirection, LayoutStyle, Modifier};
use crate::tree::Tree;

pub type NodeId = u32;

/// Opaque handle to an offscreen raster target, issued by the render backend.
pub type RasterId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    /// Children composed in insertion order at their own positions.
    Plain,
    /// Sizing context only; children place themselves.
    Box,
    /// Primary-axis flow with alignment and spacing distribution.
    Auto,
    /// Sequential stacking along one axis, cross axis pinned to the padded origin.
    List,
    /// Caller-supplied placement hooks, still inside the two-pass machinery.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Composition(CompositionKind),
}

/// Leaf content, passed through to the backend. Text measurement and image
/// decoding stay on the backend side.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text {
        text: String,
        font_size: f32,
        color: Vec4,
    },
    Image {
        source: String,
        opacity: f32,
    },
}

/// Cached offscreen raster of a composition's subtree. The handle is
/// exclusively owned by the composition and released when it is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterCache {
    pub target: RasterId,
    pub width: u32,
    pub height: u32,
}

/// Caller hooks for [`CompositionKind::Custom`]. `update_layout` assigns child
/// positions for the given potential size and returns the layout size; the
/// driver composes the children afterwards.
pub struct CustomLayoutHooks {
    pub update_units: Option<Box<dyn Fn(&mut Tree, NodeId, Vec2)>>,
    pub update_layout: Box<dyn Fn(&mut Tree, NodeId, Vec2) -> Vec2>,
}

impl fmt::Debug for CustomLayoutHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomLayoutHooks")
            .field("update_units", &self.update_units.is_some())
            .finish()
    }
}

/// A tree element with resolved geometry. Coordinates are composition-local:
/// `x,y` are relative to the owning composition's origin, which keeps cached
/// rasters valid when a composition merely moves.
#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Non-owning back-reference; lookup only, never used to free or extend
    /// lifetime.
    pub parent: Option<NodeId>,
    /// Nearest ancestor composition; percentage fallback when `parent` is None.
    pub composition: Option<NodeId>,
    /// Insertion order is layout order and paint order.
    pub children: Vec<NodeId>,
    pub modifier: Modifier,
    pub layout: LayoutStyle,
    pub custom: Option<CustomLayoutHooks>,
    pub content: Option<Content>,

    // Resolved geometry, pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    // Bounds expanded by padding and margin, used by layouts for spacing and
    // overflow.
    pub rel_x: f32,
    pub rel_y: f32,
    pub rel_width: f32,
    pub rel_height: f32,
    /// Union bounding box of children relative to this node's origin, written
    /// by the layout pass.
    pub content_size: Vec2,

    /// Has been laid out at least once.
    pub composed: bool,
    /// A resolved unit depends on parent or content size; requires a second
    /// layout pass.
    pub dynamic: bool,
    /// Position is assigned externally by a parent layout; the node's own
    /// modifier x/y are ignored.
    pub overridden: bool,
    /// Rasterize this composition's subtree into an offscreen cache.
    pub optimize: bool,
    /// Geometry changed since the last rasterization.
    pub needs_raster: bool,
    pub raster: Option<RasterCache>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, modifier: Modifier) -> Self {
        let optimize = matches!(kind, NodeKind::Composition(_));
        Self {
            name: name.into(),
            kind,
            parent: None,
            composition: None,
            children: Vec::new(),
            modifier,
            layout: LayoutStyle::default(),
            custom: None,
            content: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rel_x: 0.0,
            rel_y: 0.0,
            rel_width: 0.0,
            rel_height: 0.0,
            content_size: Vec2::ZERO,
            composed: false,
            dynamic: false,
            overridden: false,
            optimize,
            needs_raster: false,
            raster: None,
        }
    }

    pub fn element(name: impl Into<String>, modifier: Modifier) -> Self {
        Self::new(name, NodeKind::Element, modifier)
    }

    pub fn composition(name: impl Into<String>, kind: CompositionKind, modifier: Modifier) -> Self {
        Self::new(name, NodeKind::Composition(kind), modifier)
    }

    pub fn with_layout(mut self, layout: LayoutStyle) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    pub fn is_composition(&self) -> bool {
        matches!(self.kind, NodeKind::Composition(_))
    }

    /// True for the layout kinds whose unit resolution accepts hug and
    /// spacing-distribution units.
    pub fn is_layout(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Composition(
                CompositionKind::Box
                    | CompositionKind::Auto
                    | CompositionKind::List
                    | CompositionKind::Custom
            )
        )
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Padded extent along the given layout direction.
    pub fn rel_extent(&self, direction: LayoutDirection) -> f32 {
        match direction {
            LayoutDirection::Horizontal => self.rel_width,
            LayoutDirection::Vertical => self.rel_height,
        }
    }

    /// Padded extent across the given layout direction.
    pub fn rel_cross_extent(&self, direction: LayoutDirection) -> f32 {
        match direction {
            LayoutDirection::Horizontal => self.rel_height,
            LayoutDirection::Vertical => self.rel_width,
        }
    }

    /// Assigns a position from a parent layout, keeping the padded bounds in
    /// step. The offsets between `x` and `rel_x` (padding plus margin) were
    /// computed by the node's last compose and are preserved.
    pub fn override_position(&mut self, rel_x: f32, rel_y: f32) {
        let dx = self.x - self.rel_x;
        let dy = self.y - self.rel_y;
        self.rel_x = rel_x;
        self.rel_y = rel_y;
        self.x = rel_x + dx;
        self.y = rel_y + dy;
        self.overridden = true;
    }
}
