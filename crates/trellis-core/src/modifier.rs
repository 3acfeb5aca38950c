// crates/trellis-core/src/modifier.rs
use glam::Vec4;

use crate::units::{ResolveCtx, Unit};
use crate::Result;

/// Node background. Image sources are opaque asset keys passed through to the
/// rendering backend; the engine never decodes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Color(Vec4),
    Image { source: String, opacity: f32 },
}

/// Per-side unit values for padding and margin. Absent sides contribute zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edges {
    pub top: Option<Unit>,
    pub right: Option<Unit>,
    pub bottom: Option<Unit>,
    pub left: Option<Unit>,
}

impl Edges {
    pub fn all(unit: Unit) -> Self {
        Self {
            top: Some(unit.clone()),
            right: Some(unit.clone()),
            bottom: Some(unit.clone()),
            left: Some(unit),
        }
    }

    pub fn symmetric(horizontal: Unit, vertical: Unit) -> Self {
        Self {
            top: Some(vertical.clone()),
            right: Some(horizontal.clone()),
            bottom: Some(vertical),
            left: Some(horizontal),
        }
    }

    /// Resolves every present side. Left/right use the x context, top/bottom
    /// the y context. Returns the pixel values and whether any side is dynamic.
    pub fn resolve(&mut self, x_ctx: ResolveCtx, y_ctx: ResolveCtx) -> Result<(EdgesPx, bool)> {
        let mut out = EdgesPx::default();
        let mut dynamic = false;
        if let Some(unit) = self.top.as_mut() {
            let r = unit.resolve(y_ctx)?;
            out.top = r.value;
            dynamic |= r.dynamic;
        }
        if let Some(unit) = self.right.as_mut() {
            let r = unit.resolve(x_ctx)?;
            out.right = r.value;
            dynamic |= r.dynamic;
        }
        if let Some(unit) = self.bottom.as_mut() {
            let r = unit.resolve(y_ctx)?;
            out.bottom = r.value;
            dynamic |= r.dynamic;
        }
        if let Some(unit) = self.left.as_mut() {
            let r = unit.resolve(x_ctx)?;
            out.left = r.value;
            dynamic |= r.dynamic;
        }
        Ok((out, dynamic))
    }
}

/// Resolved edge values in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgesPx {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgesPx {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Offset subtracted from the resolved position, enabling center/right/bottom
/// anchoring. Typically `self_percent(0.5)` on both axes for centering.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub x: Unit,
    pub y: Unit,
}

impl Anchor {
    pub fn center() -> Self {
        Self {
            x: crate::units::self_percent(0.5),
            y: crate::units::self_percent(0.5),
        }
    }
}

/// The copyable, mergeable, animatable bag of unit-valued properties attached
/// to a node. Every `Unit` inside is exclusively owned; assigning a unit into a
/// modifier moves (or clones) it, so two nodes never alias a cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifier {
    pub x: Option<Unit>,
    pub y: Option<Unit>,
    pub width: Option<Unit>,
    pub height: Option<Unit>,
    pub anchor: Option<Anchor>,
    pub padding: Option<Edges>,
    pub margin: Option<Edges>,
    pub background: Option<Background>,
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_x(mut self, unit: Unit) -> Self {
        self.x = Some(unit);
        self
    }

    pub fn with_y(mut self, unit: Unit) -> Self {
        self.y = Some(unit);
        self
    }

    pub fn with_width(mut self, unit: Unit) -> Self {
        self.width = Some(unit);
        self
    }

    pub fn with_height(mut self, unit: Unit) -> Self {
        self.height = Some(unit);
        self
    }

    pub fn with_size(self, width: Unit, height: Unit) -> Self {
        self.with_width(width).with_height(height)
    }

    pub fn with_position(self, x: Unit, y: Unit) -> Self {
        self.with_x(x).with_y(y)
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_padding(mut self, edges: Edges) -> Self {
        self.padding = Some(edges);
        self
    }

    pub fn with_margin(mut self, edges: Edges) -> Self {
        self.margin = Some(edges);
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    /// Overwrites only the properties present in `other`, cloning their values.
    /// Everything absent in `other` is preserved.
    pub fn merge(&mut self, other: &Modifier) {
        if let Some(unit) = &other.x {
            self.x = Some(unit.clone());
        }
        if let Some(unit) = &other.y {
            self.y = Some(unit.clone());
        }
        if let Some(unit) = &other.width {
            self.width = Some(unit.clone());
        }
        if let Some(unit) = &other.height {
            self.height = Some(unit.clone());
        }
        if let Some(anchor) = &other.anchor {
            self.anchor = Some(anchor.clone());
        }
        if let Some(edges) = &other.padding {
            self.padding = Some(edges.clone());
        }
        if let Some(edges) = &other.margin {
            self.margin = Some(edges.clone());
        }
        if let Some(background) = &other.background {
            self.background = Some(background.clone());
        }
    }

    /// Linearly interpolates every unit present in both endpoints and writes
    /// the result straight into this modifier's caches via `write_resolved`.
    /// This intentionally skips context-based resolution for one frame; it is
    /// the documented exception to "resolve is the only writer of the cache".
    pub fn animate(&mut self, start: &Modifier, end: &Modifier, fraction: f32) {
        lerp_unit(&mut self.x, &start.x, &end.x, fraction);
        lerp_unit(&mut self.y, &start.y, &end.y, fraction);
        lerp_unit(&mut self.width, &start.width, &end.width, fraction);
        lerp_unit(&mut self.height, &start.height, &end.height, fraction);
        if let (Some(dst), Some(s), Some(e)) = (&mut self.anchor, &start.anchor, &end.anchor) {
            dst.x.write_resolved(lerp(s.x.cached(), e.x.cached(), fraction));
            dst.y.write_resolved(lerp(s.y.cached(), e.y.cached(), fraction));
        }
        lerp_edges(&mut self.padding, &start.padding, &end.padding, fraction);
        lerp_edges(&mut self.margin, &start.margin, &end.margin, fraction);
    }
}

fn lerp(start: f32, end: f32, fraction: f32) -> f32 {
    start + (end - start) * fraction
}

fn lerp_unit(dst: &mut Option<Unit>, start: &Option<Unit>, end: &Option<Unit>, fraction: f32) {
    if let (Some(dst), Some(s), Some(e)) = (dst.as_mut(), start, end) {
        dst.write_resolved(lerp(s.cached(), e.cached(), fraction));
    }
}

fn lerp_edges(dst: &mut Option<Edges>, start: &Option<Edges>, end: &Option<Edges>, fraction: f32) {
    if let (Some(dst), Some(s), Some(e)) = (dst.as_mut(), start, end) {
        lerp_unit(&mut dst.top, &s.top, &e.top, fraction);
        lerp_unit(&mut dst.right, &s.right, &e.right, fraction);
        lerp_unit(&mut dst.bottom, &s.bottom, &e.bottom, fraction);
        lerp_unit(&mut dst.left, &s.left, &e.left, fraction);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutAlignment {
    Start,
    Center,
    End,
}

/// Layout-owned style for Box/Auto/List/Custom nodes, copied and merged
/// alongside the modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    pub direction: LayoutDirection,
    pub alignment: LayoutAlignment,
    pub padding: Option<Edges>,
    /// Literal gap, `space_between()`, or `space_evenly()`.
    pub item_spacing: Option<Unit>,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::Horizontal,
            alignment: LayoutAlignment::Start,
            padding: None,
            item_spacing: None,
        }
    }
}

impl LayoutStyle {
    pub fn horizontal() -> Self {
        Self::default()
    }

    pub fn vertical() -> Self {
        Self {
            direction: LayoutDirection::Vertical,
            ..Self::default()
        }
    }

    pub fn with_alignment(mut self, alignment: LayoutAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_padding(mut self, edges: Edges) -> Self {
        self.padding = Some(edges);
        self
    }

    pub fn with_item_spacing(mut self, unit: Unit) -> Self {
        self.item_spacing = Some(unit);
        self
    }

    pub fn merge(&mut self, other: &LayoutStyle) {
        self.direction = other.direction;
        self.alignment = other.alignment;
        if let Some(edges) = &other.padding {
            self.padding = Some(edges.clone());
        }
        if let Some(unit) = &other.item_spacing {
            self.item_spacing = Some(unit.clone());
        }
    }
}
