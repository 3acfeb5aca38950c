// crates/trellis-layout/src/passes.rs

use glam::Vec2;
use tracing::{debug, warn};
use trellis_core::{
    Axis, CompositionKind, EdgesPx, LayoutAlignment, LayoutDirection, NodeId, ResolveCtx,
    Result, Tree, Unit, UnitKind,
};

use crate::compose::{compose, context_size, resolve_geometry, ComposeEnv};

fn main_axis(direction: LayoutDirection) -> Axis {
    match direction {
        LayoutDirection::Horizontal => Axis::X,
        LayoutDirection::Vertical => Axis::Y,
    }
}

fn extent(size: Vec2, direction: LayoutDirection) -> f32 {
    match direction {
        LayoutDirection::Horizontal => size.x,
        LayoutDirection::Vertical => size.y,
    }
}

/// Union of child bounds, tracked from the layout's origin.
#[derive(Debug, Default)]
struct Bounds {
    max: Vec2,
}

impl Bounds {
    fn add(&mut self, rel_x: f32, rel_y: f32, rel_width: f32, rel_height: f32) {
        self.max.x = self.max.x.max(rel_x + rel_width);
        self.max.y = self.max.y.max(rel_y + rel_height);
    }

    fn size(&self) -> Vec2 {
        self.max.max(Vec2::ZERO)
    }
}

/// Drives the two-pass layout contract: potential size from children, hug
/// accumulation, own geometry, units and placement, and one repeat when any
/// dynamic unit surfaced along the way.
pub(crate) fn compose_layout(
    tree: &mut Tree,
    id: NodeId,
    kind: CompositionKind,
    env: &ComposeEnv,
) -> Result<()> {
    let potential = potential_pass(tree, id, env)?;
    accumulate_hug(tree, id, potential);
    resolve_geometry(tree, id, env)?;

    let (spacing, pad) = update_units(tree, id, potential)?;
    let mut layout_size = update_layout(tree, id, kind, env, spacing, pad, potential)?;

    if tree.node(id).dynamic {
        // A dynamic unit resolved above may change spacing or positions, but
        // potential size is stable after the first pass. One repeat, no loop.
        let (spacing, pad) = update_units(tree, id, potential)?;
        layout_size = update_layout(tree, id, kind, env, spacing, pad, potential)?;
    }

    debug!(
        layout = %tree.node(id).name,
        width = tree.node(id).width,
        height = tree.node(id).height,
        ?potential,
        "layout composed"
    );
    tree.node_mut(id).content_size = layout_size;
    Ok(())
}

/// Pass 1: force-compose children with what resolves statically and accumulate
/// extents: sum plus inter-item spacing along the primary axis, max across.
/// Spacing sits between items, so one trailing gap is subtracted.
fn potential_pass(tree: &mut Tree, id: NodeId, env: &ComposeEnv) -> Result<Vec2> {
    let kids = tree.node(id).children.clone();
    let direction = tree.node(id).layout.direction;
    let parent_size = context_size(tree, id, env)?;

    {
        let node = tree.node_mut(id);
        if let Some(unit) = node.modifier.width.as_mut() {
            unit.reset_hug();
        }
        if let Some(unit) = node.modifier.height.as_mut() {
            unit.reset_hug();
        }
    }

    let spacing = static_spacing(tree, id, parent_size)?;

    let mut main = 0.0f32;
    let mut cross = 0.0f32;
    for &kid in &kids {
        tree.node_mut(kid).composed = false;
        compose(tree, kid, env)?;
        let child = tree.node(kid);
        main += child.rel_extent(direction) + spacing;
        cross = cross.max(child.rel_cross_extent(direction));
        let child_dynamic = child.dynamic;
        if child_dynamic {
            tree.node_mut(id).dynamic = true;
        }
    }
    if !kids.is_empty() {
        main -= spacing;
    }

    let pad = resolve_layout_padding(tree, id, parent_size)?;
    let (pad_main, pad_cross) = match direction {
        LayoutDirection::Horizontal => (pad.horizontal(), pad.vertical()),
        LayoutDirection::Vertical => (pad.vertical(), pad.horizontal()),
    };
    main += pad_main;
    cross += pad_cross;

    Ok(match direction {
        LayoutDirection::Horizontal => Vec2::new(main, cross),
        LayoutDirection::Vertical => Vec2::new(cross, main),
    })
}

/// Spacing value available before the layout's own size is final. Distribution
/// units contribute nothing until `update_units` writes them.
fn static_spacing(tree: &mut Tree, id: NodeId, parent_size: Vec2) -> Result<f32> {
    let name = tree.node(id).name.clone();
    let direction = tree.node(id).layout.direction;
    let own = tree.node(id).size();

    let node = tree.node_mut(id);
    let Some(unit) = node.layout.item_spacing.as_mut() else {
        return Ok(0.0);
    };
    match unit.kind {
        UnitKind::SpaceBetween | UnitKind::SpaceEvenly => Ok(0.0),
        _ => {
            let ctx = ResolveCtx {
                parent: parent_size,
                own,
                axis: main_axis(direction),
                in_layout: true,
                node: &name,
            };
            Ok(unit.resolve(ctx)?.value)
        }
    }
}

fn resolve_layout_padding(tree: &mut Tree, id: NodeId, parent_size: Vec2) -> Result<EdgesPx> {
    let name = tree.node(id).name.clone();
    let own = tree.node(id).size();
    let node = tree.node_mut(id);
    let Some(edges) = node.layout.padding.as_mut() else {
        return Ok(EdgesPx::default());
    };
    let x_ctx = ResolveCtx {
        parent: parent_size,
        own,
        axis: Axis::X,
        in_layout: true,
        node: &name,
    };
    let y_ctx = ResolveCtx {
        axis: Axis::Y,
        ..x_ctx
    };
    let (values, dynamic) = edges.resolve(x_ctx, y_ctx)?;
    node.dynamic |= dynamic;
    Ok(values)
}

/// Pass 2 entry: feed the potential size into any hug-sized axis. The cache is
/// incremented rather than overwritten so compound units keep their other
/// contributions, then rounded to whole pixels.
fn accumulate_hug(tree: &mut Tree, id: NodeId, potential: Vec2) {
    let no_children = tree.node(id).children.is_empty();
    let node = tree.node_mut(id);
    let mut hugged = false;
    if let Some(unit) = node.modifier.width.as_mut() {
        hugged |= unit.accumulate_hug(potential.x);
    }
    if let Some(unit) = node.modifier.height.as_mut() {
        hugged |= unit.accumulate_hug(potential.y);
    }
    if hugged && no_children {
        warn!(
            layout = %node.name,
            "hug-sized layout has no children; resolving to padding only"
        );
    }
}

/// Resolves layout-scoped units once the container size is final. Returns the
/// effective item spacing and the resolved layout padding.
fn update_units(tree: &mut Tree, id: NodeId, potential: Vec2) -> Result<(f32, EdgesPx)> {
    let name = tree.node(id).name.clone();
    let direction = tree.node(id).layout.direction;
    let own = tree.node(id).size();
    let child_count = tree.node(id).children.len();
    let potential_main = extent(potential, direction);

    let pad = resolve_layout_padding(tree, id, own)?;

    let node = tree.node_mut(id);
    let mut spacing = 0.0;
    let mut dynamic = false;
    if let Some(unit) = node.layout.item_spacing.as_mut() {
        let ctx = ResolveCtx {
            parent: own,
            own,
            axis: main_axis(direction),
            in_layout: true,
            node: &name,
        };
        let (value, unit_dynamic) = distribute_spacing(unit, potential_main, child_count, ctx)?;
        spacing = value;
        dynamic |= unit_dynamic;
    }
    node.dynamic |= dynamic;
    Ok((spacing, pad))
}

/// Effective spacing for distribution units. Space-between deliberately
/// divides by the potential extent rather than the final container extent;
/// switch the divisor here if product behavior ever requires the
/// final-size interpretation.
fn distribute_spacing(
    unit: &mut Unit,
    potential_main: f32,
    child_count: usize,
    ctx: ResolveCtx,
) -> Result<(f32, bool)> {
    match unit.kind {
        UnitKind::SpaceBetween => {
            let value = if child_count == 0 {
                0.0
            } else {
                potential_main / child_count as f32
            };
            unit.write_resolved(value);
            Ok((value, true))
        }
        UnitKind::SpaceEvenly => {
            let value = potential_main / (child_count + 1) as f32;
            unit.write_resolved(value);
            Ok((value, true))
        }
        _ => {
            let resolved = unit.resolve(ctx)?;
            Ok((resolved.value, resolved.dynamic))
        }
    }
}

fn update_layout(
    tree: &mut Tree,
    id: NodeId,
    kind: CompositionKind,
    env: &ComposeEnv,
    spacing: f32,
    pad: EdgesPx,
    potential: Vec2,
) -> Result<Vec2> {
    let kids = tree.node(id).children.clone();
    match kind {
        CompositionKind::Auto => update_flow(tree, id, env, &kids, spacing, pad, potential, true),
        CompositionKind::List => update_flow(tree, id, env, &kids, spacing, pad, potential, false),
        CompositionKind::Custom => update_custom(tree, id, env, &kids, potential),
        // Box (and plain compositions routed here) provide sizing context
        // only; children place themselves.
        CompositionKind::Box | CompositionKind::Plain => update_box(tree, id, env, &kids),
    }
}

/// Cursor placement shared by AutoLayout and ListLayout. Lists skip the
/// alignment offsets: children stack from the padded origin.
#[allow(clippy::too_many_arguments)]
fn update_flow(
    tree: &mut Tree,
    id: NodeId,
    env: &ComposeEnv,
    kids: &[NodeId],
    spacing: f32,
    pad: EdgesPx,
    potential: Vec2,
    aligned: bool,
) -> Result<Vec2> {
    let (direction, alignment, container, leading_gap) = {
        let node = tree.node(id);
        // Space-evenly puts a gap before the first child as well; every other
        // spacing unit only separates neighbors.
        let leading_gap = matches!(
            node.layout.item_spacing.as_ref().map(|unit| &unit.kind),
            Some(UnitKind::SpaceEvenly)
        );
        (
            node.layout.direction,
            node.layout.alignment,
            node.size(),
            leading_gap,
        )
    };
    let container_main = extent(container, direction);
    let container_cross = match direction {
        LayoutDirection::Horizontal => container.y,
        LayoutDirection::Vertical => container.x,
    };
    let leftover = container_main - extent(potential, direction);
    let offset = if aligned {
        match alignment {
            LayoutAlignment::Start => 0.0,
            LayoutAlignment::Center => (leftover / 2.0).max(0.0),
            LayoutAlignment::End => leftover.max(0.0),
        }
    } else {
        0.0
    };
    let (pad_main_start, pad_cross_start, pad_cross_end) = match direction {
        LayoutDirection::Horizontal => (pad.left, pad.top, pad.bottom),
        LayoutDirection::Vertical => (pad.top, pad.left, pad.right),
    };

    let mut cursor = pad_main_start + offset;
    if leading_gap {
        cursor += spacing;
    }
    let mut bounds = Bounds::default();
    for &kid in kids {
        let child_cross = tree.node(kid).rel_cross_extent(direction);
        let cross_pos = if aligned {
            match alignment {
                LayoutAlignment::Start => pad_cross_start,
                LayoutAlignment::Center => ((container_cross - child_cross) / 2.0).max(0.0),
                LayoutAlignment::End => (container_cross - pad_cross_end - child_cross).max(0.0),
            }
        } else {
            pad_cross_start
        };
        let (rel_x, rel_y) = match direction {
            LayoutDirection::Horizontal => (cursor, cross_pos),
            LayoutDirection::Vertical => (cross_pos, cursor),
        };
        tree.node_mut(kid).override_position(rel_x, rel_y);
        compose(tree, kid, env)?;

        let child = tree.node(kid);
        bounds.add(child.rel_x, child.rel_y, child.rel_width, child.rel_height);
        let advance = child.rel_extent(direction);
        let child_dynamic = child.dynamic;
        if child_dynamic {
            tree.node_mut(id).dynamic = true;
        }
        cursor += advance + spacing;
    }
    Ok(bounds.size())
}

/// BoxLayout: children compose at their own modifier-resolved positions; the
/// layout contributes sizing context and reports the union bounding box.
fn update_box(tree: &mut Tree, id: NodeId, env: &ComposeEnv, kids: &[NodeId]) -> Result<Vec2> {
    let mut bounds = Bounds::default();
    for &kid in kids {
        tree.node_mut(kid).overridden = false;
        compose(tree, kid, env)?;
        let child = tree.node(kid);
        bounds.add(child.rel_x, child.rel_y, child.rel_width, child.rel_height);
        let child_dynamic = child.dynamic;
        if child_dynamic {
            tree.node_mut(id).dynamic = true;
        }
    }
    Ok(bounds.size())
}

/// CustomLayout: caller hooks assign positions; the driver still composes the
/// children afterwards so grandchildren finalize, and still participates in
/// the dynamic-repeat machinery.
fn update_custom(
    tree: &mut Tree,
    id: NodeId,
    env: &ComposeEnv,
    kids: &[NodeId],
    potential: Vec2,
) -> Result<Vec2> {
    // Hooks are taken out for the call so they can borrow the tree mutably.
    let hooks = tree.node_mut(id).custom.take();
    let size = match hooks {
        Some(hooks) => {
            if let Some(update_units) = hooks.update_units.as_ref() {
                update_units(tree, id, potential);
            }
            let size = (hooks.update_layout)(tree, id, potential);
            tree.node_mut(id).custom = Some(hooks);
            size
        }
        None => Vec2::ZERO,
    };
    for &kid in kids {
        compose(tree, kid, env)?;
        let child_dynamic = tree.node(kid).dynamic;
        if child_dynamic {
            tree.node_mut(id).dynamic = true;
        }
    }
    Ok(size)
}
