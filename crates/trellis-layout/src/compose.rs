// crates/trellis-layout/src/compose.rs

use glam::Vec2;
use trellis_core::{
    Axis, CompositionKind, EdgesPx, NodeId, NodeKind, ResolveCtx, Result, Tree,
};

use crate::passes::compose_layout;

/// Compose-time environment: the display size the root resolves against, and
/// which node is the root. All state is explicit; there is no process-wide
/// active instance.
#[derive(Debug, Clone, Copy)]
pub struct ComposeEnv {
    pub viewport: Vec2,
    pub root: NodeId,
}

/// Size a node's units resolve against: the viewport for the root, otherwise
/// the parent with composition fallback.
pub(crate) fn context_size(tree: &Tree, id: NodeId, env: &ComposeEnv) -> Result<Vec2> {
    if id == env.root {
        Ok(env.viewport)
    } else {
        tree.parent_size(id)
    }
}

/// Composes a node: resolves its geometry and, for compositions, lays out the
/// subtree. A composition that is already composed and not dynamic is a no-op,
/// which is what makes externally-triggered recomposition requests idempotent.
pub fn compose(tree: &mut Tree, id: NodeId, env: &ComposeEnv) -> Result<()> {
    {
        let node = tree.node(id);
        if node.is_composition() && node.composed && !node.dynamic {
            return Ok(());
        }
    }
    tree.node_mut(id).dynamic = false;

    match tree.node(id).kind {
        NodeKind::Element => resolve_geometry(tree, id, env)?,
        NodeKind::Composition(CompositionKind::Plain) => {
            resolve_geometry(tree, id, env)?;
            compose_plain_children(tree, id, env)?;
        }
        NodeKind::Composition(kind) => compose_layout(tree, id, kind, env)?,
    }

    let node = tree.node_mut(id);
    node.composed = true;
    if node.is_composition() {
        node.needs_raster = true;
    }
    Ok(())
}

/// Plain compositions compose children in insertion order, then run a second
/// sub-pass over the dynamic ones once the first pass marked the composition
/// dynamic.
fn compose_plain_children(tree: &mut Tree, id: NodeId, env: &ComposeEnv) -> Result<()> {
    let kids = tree.node(id).children.clone();
    for &kid in &kids {
        compose(tree, kid, env)?;
        if tree.node(kid).dynamic {
            tree.node_mut(id).dynamic = true;
        }
    }
    if tree.node(id).dynamic {
        for &kid in &kids {
            if tree.node(kid).dynamic {
                compose(tree, kid, env)?;
            }
        }
    }
    Ok(())
}

/// Resolves one node's geometry in the documented order: padding and margin,
/// then size, then anchor against the now-known size, then position (skipped
/// when a parent layout owns it), then the padded bounds.
pub(crate) fn resolve_geometry(tree: &mut Tree, id: NodeId, env: &ComposeEnv) -> Result<()> {
    let parent_size = context_size(tree, id, env)?;
    let name = tree.node(id).name.clone();
    let in_layout = tree.node(id).is_layout();

    let node = tree.node_mut(id);
    let mut own = node.size();
    let mut dynamic = false;

    let make_ctx = |axis: Axis, own: Vec2| ResolveCtx {
        parent: parent_size,
        own,
        axis,
        in_layout,
        node: &name,
    };

    let mut padding = EdgesPx::default();
    if let Some(edges) = node.modifier.padding.as_mut() {
        let (values, edges_dynamic) =
            edges.resolve(make_ctx(Axis::X, own), make_ctx(Axis::Y, own))?;
        padding = values;
        dynamic |= edges_dynamic;
    }
    let mut margin = EdgesPx::default();
    if let Some(edges) = node.modifier.margin.as_mut() {
        let (values, edges_dynamic) =
            edges.resolve(make_ctx(Axis::X, own), make_ctx(Axis::Y, own))?;
        margin = values;
        dynamic |= edges_dynamic;
    }

    own.x = match node.modifier.width.as_mut() {
        Some(unit) => {
            let r = unit.resolve(make_ctx(Axis::X, own))?;
            dynamic |= r.dynamic;
            r.value
        }
        None => 0.0,
    };
    own.y = match node.modifier.height.as_mut() {
        Some(unit) => {
            let r = unit.resolve(make_ctx(Axis::Y, own))?;
            dynamic |= r.dynamic;
            r.value
        }
        None => 0.0,
    };
    node.width = own.x;
    node.height = own.y;

    if !node.overridden {
        let mut anchor = Vec2::ZERO;
        if let Some(a) = node.modifier.anchor.as_mut() {
            let r = a.x.resolve(make_ctx(Axis::X, own))?;
            anchor.x = r.value;
            dynamic |= r.dynamic;
            let r = a.y.resolve(make_ctx(Axis::Y, own))?;
            anchor.y = r.value;
            dynamic |= r.dynamic;
        }
        let resolved_x = match node.modifier.x.as_mut() {
            Some(unit) => {
                let r = unit.resolve(make_ctx(Axis::X, own))?;
                dynamic |= r.dynamic;
                r.value
            }
            None => 0.0,
        };
        let resolved_y = match node.modifier.y.as_mut() {
            Some(unit) => {
                let r = unit.resolve(make_ctx(Axis::Y, own))?;
                dynamic |= r.dynamic;
                r.value
            }
            None => 0.0,
        };
        // Coordinates are composition-local, so no parent offset applies.
        node.x = resolved_x - anchor.x;
        node.y = resolved_y - anchor.y;
    }

    node.rel_x = node.x - padding.left - margin.left;
    node.rel_y = node.y - padding.top - margin.top;
    node.rel_width = node.width + padding.horizontal() + margin.horizontal();
    node.rel_height = node.height + padding.vertical() + margin.vertical();

    node.dynamic |= dynamic;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::cell::Cell;
    use std::rc::Rc;
    use trellis_core::{
        hug, percent, px, space_between, space_evenly, Anchor, CompositionKind,
        CustomLayoutHooks, Edges, LayoutAlignment, LayoutStyle, Modifier, Node, Tree,
        TrellisError,
    };

    fn fixture() -> (Tree, NodeId, ComposeEnv) {
        let mut tree = Tree::new();
        let root = tree.insert(Node::composition(
            "root",
            CompositionKind::Plain,
            Modifier::new().with_size(px(800.0), px(600.0)),
        ));
        let env = ComposeEnv {
            viewport: Vec2::new(800.0, 600.0),
            root,
        };
        (tree, root, env)
    }

    fn fixed(name: &str, width: f32, height: f32) -> Node {
        Node::element(name, Modifier::new().with_size(px(width), px(height)))
    }

    fn geometry(tree: &Tree, id: NodeId) -> [f32; 8] {
        let n = tree.node(id);
        [
            n.x,
            n.y,
            n.width,
            n.height,
            n.rel_x,
            n.rel_y,
            n.rel_width,
            n.rel_height,
        ]
    }

    // Hug width sums child extents plus inter-item spacing.
    #[test]
    fn hug_sizes_to_content() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(hug(), px(40.0)),
                )
                .with_layout(LayoutStyle::horizontal().with_item_spacing(px(5.0))),
            )
            .unwrap();
        for (name, width) in [("a", 10.0), ("b", 20.0), ("c", 30.0)] {
            tree.attach(layout, fixed(name, width, 10.0)).unwrap();
        }

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(layout).width, 70.0);
    }

    #[test]
    fn hug_includes_layout_padding() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(hug(), hug()),
                )
                .with_layout(
                    LayoutStyle::horizontal().with_padding(Edges::all(px(4.0))),
                ),
            )
            .unwrap();
        tree.attach(layout, fixed("a", 10.0, 20.0)).unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(layout).width, 18.0);
        assert_eq!(tree.node(layout).height, 28.0);
    }

    // Space-between divides the potential extent by the child count.
    #[test]
    fn space_between_distributes_from_potential_size() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(px(200.0), px(40.0)),
                )
                .with_layout(LayoutStyle::horizontal().with_item_spacing(space_between())),
            )
            .unwrap();
        for (name, width) in [("a", 30.0), ("b", 30.0), ("c", 30.0), ("d", 30.0)] {
            tree.attach(layout, fixed(name, width, 10.0)).unwrap();
        }

        compose(&mut tree, root, &env).unwrap();
        let spacing = tree
            .node(layout)
            .layout
            .item_spacing
            .as_ref()
            .unwrap()
            .cached();
        assert_eq!(spacing, 120.0 / 4.0);

        // Children advance by extent + distributed spacing.
        let kids = tree.node(layout).children.clone();
        assert_eq!(tree.node(kids[0]).x, 0.0);
        assert_eq!(tree.node(kids[1]).x, 60.0);
        assert_eq!(tree.node(kids[2]).x, 120.0);
    }

    #[test]
    fn space_evenly_adds_edge_gaps() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(px(200.0), px(40.0)),
                )
                .with_layout(LayoutStyle::horizontal().with_item_spacing(space_evenly())),
            )
            .unwrap();
        tree.attach(layout, fixed("a", 50.0, 10.0)).unwrap();
        tree.attach(layout, fixed("b", 50.0, 10.0)).unwrap();

        compose(&mut tree, root, &env).unwrap();
        let spacing = tree
            .node(layout)
            .layout
            .item_spacing
            .as_ref()
            .unwrap()
            .cached();
        let gap = 100.0f32 / 3.0;
        assert_eq!(spacing, gap);

        // The first child sits one gap in from the origin, not flush with it.
        let kids = tree.node(layout).children.clone();
        assert_eq!(tree.node(kids[0]).x, gap);
        assert_eq!(tree.node(kids[1]).x, gap + (50.0 + gap));
    }

    // Center alignment offsets the first child by half the leftover.
    #[test]
    fn center_alignment_offsets_cursor() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(px(300.0), px(40.0)),
                )
                .with_layout(
                    LayoutStyle::horizontal().with_alignment(LayoutAlignment::Center),
                ),
            )
            .unwrap();
        let child = tree.attach(layout, fixed("a", 100.0, 10.0)).unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(child).x, 100.0);
        // Cross axis centered too.
        assert_eq!(tree.node(child).y, 15.0);
    }

    #[test]
    fn end_alignment_consumes_full_leftover() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(px(300.0), px(40.0)),
                )
                .with_layout(LayoutStyle::horizontal().with_alignment(LayoutAlignment::End)),
            )
            .unwrap();
        let child = tree.attach(layout, fixed("a", 100.0, 40.0)).unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(child).x, 200.0);
    }

    // Recomposing with unchanged state yields identical geometry.
    #[test]
    fn compose_is_idempotent() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(hug(), px(40.0)),
                )
                .with_layout(LayoutStyle::horizontal().with_item_spacing(px(5.0))),
            )
            .unwrap();
        let a = tree.attach(layout, fixed("a", 10.0, 10.0)).unwrap();
        let b = tree.attach(layout, fixed("b", 20.0, 10.0)).unwrap();
        // Percent against the fixed-size root keeps the tree dynamic without
        // making it self-referential.
        let c = tree
            .attach(
                root,
                Node::element("c", Modifier::new().with_size(percent(0.5), px(10.0))),
            )
            .unwrap();

        compose(&mut tree, root, &env).unwrap();
        let first: Vec<[f32; 8]> = [root, layout, a, b, c]
            .iter()
            .map(|&id| geometry(&tree, id))
            .collect();

        compose(&mut tree, root, &env).unwrap();
        let second: Vec<[f32; 8]> = [root, layout, a, b, c]
            .iter()
            .map(|&id| geometry(&tree, id))
            .collect();
        assert_eq!(first, second);
        assert_eq!(tree.node(c).width, 400.0);
    }

    // A dynamic child triggers exactly one extra units/layout pass.
    #[test]
    fn dynamic_layout_runs_exactly_two_passes() {
        let (mut tree, root, env) = fixture();
        let calls = Rc::new(Cell::new(0u32));
        let seen = calls.clone();
        let hooks = CustomLayoutHooks {
            update_units: None,
            update_layout: Box::new(move |tree, id, _potential| {
                seen.set(seen.get() + 1);
                let kids = tree.node(id).children.clone();
                let mut cursor = 0.0;
                for kid in kids {
                    let main = tree.node(kid).rel_width;
                    tree.node_mut(kid).override_position(cursor, 0.0);
                    cursor += main;
                }
                Vec2::new(cursor, tree.node(id).height)
            }),
        };
        let layout = {
            let mut node = Node::composition(
                "custom",
                CompositionKind::Custom,
                Modifier::new().with_size(px(100.0), px(40.0)),
            );
            node.custom = Some(hooks);
            tree.attach(root, node).unwrap()
        };
        // Percent width depends on the layout's size, marking the child dynamic.
        tree.attach(
            layout,
            Node::element("a", Modifier::new().with_size(percent(0.5), px(10.0))),
        )
        .unwrap();

        compose(&mut tree, layout, &env).unwrap();
        assert_eq!(calls.get(), 2);

        // Steady state still converges in two, never loops.
        compose(&mut tree, layout, &env).unwrap();
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn box_layout_keeps_child_positions() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "box",
                    CompositionKind::Box,
                    Modifier::new().with_size(px(200.0), px(200.0)),
                ),
            )
            .unwrap();
        let child = tree
            .attach(
                layout,
                Node::element(
                    "a",
                    Modifier::new()
                        .with_position(px(30.0), px(40.0))
                        .with_size(px(50.0), px(60.0)),
                ),
            )
            .unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(child).x, 30.0);
        assert_eq!(tree.node(child).y, 40.0);
        // Union bounding box of children.
        assert_eq!(tree.node(layout).content_size, Vec2::new(80.0, 100.0));
    }

    #[test]
    fn list_stacks_along_direction() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "list",
                    CompositionKind::List,
                    Modifier::new().with_size(px(100.0), hug()),
                )
                .with_layout(LayoutStyle::vertical().with_item_spacing(px(2.0))),
            )
            .unwrap();
        let a = tree.attach(layout, fixed("a", 100.0, 30.0)).unwrap();
        let b = tree.attach(layout, fixed("b", 100.0, 30.0)).unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(layout).height, 62.0);
        assert_eq!(tree.node(a).y, 0.0);
        assert_eq!(tree.node(b).y, 32.0);
    }

    #[test]
    fn percent_child_resolves_against_final_layout_size() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "row",
                    CompositionKind::Auto,
                    Modifier::new().with_size(px(240.0), px(40.0)),
                ),
            )
            .unwrap();
        let child = tree
            .attach(
                layout,
                Node::element("a", Modifier::new().with_size(percent(0.25), px(10.0))),
            )
            .unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(child).width, 60.0);
    }

    #[test]
    fn anchor_centers_node_on_position() {
        let (mut tree, root, env) = fixture();
        let child = tree
            .attach(
                root,
                Node::element(
                    "badge",
                    Modifier::new()
                        .with_position(px(400.0), px(300.0))
                        .with_size(px(100.0), px(50.0))
                        .with_anchor(Anchor::center()),
                ),
            )
            .unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(child).x, 350.0);
        assert_eq!(tree.node(child).y, 275.0);
    }

    #[test]
    fn padding_expands_rel_bounds() {
        let (mut tree, root, env) = fixture();
        let child = tree
            .attach(
                root,
                Node::element(
                    "padded",
                    Modifier::new()
                        .with_position(px(10.0), px(10.0))
                        .with_size(px(20.0), px(20.0))
                        .with_padding(Edges::all(px(3.0))),
                ),
            )
            .unwrap();

        compose(&mut tree, root, &env).unwrap();
        let n = tree.node(child);
        assert_eq!(n.rel_x, 7.0);
        assert_eq!(n.rel_y, 7.0);
        assert_eq!(n.rel_width, 26.0);
        assert_eq!(n.rel_height, 26.0);
    }

    #[test]
    fn hug_outside_layout_fails_with_node_name() {
        let (mut tree, root, env) = fixture();
        tree.attach(
            root,
            Node::element("stray", Modifier::new().with_width(hug())),
        )
        .unwrap();

        match compose(&mut tree, root, &env) {
            Err(TrellisError::LayoutScopedUnit { unit, node }) => {
                assert_eq!(unit, "hug");
                assert_eq!(node, "stray");
            }
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn empty_hug_layout_resolves_to_padding_only() {
        let (mut tree, root, env) = fixture();
        let layout = tree
            .attach(
                root,
                Node::composition(
                    "empty",
                    CompositionKind::Auto,
                    Modifier::new().with_size(hug(), hug()),
                )
                .with_layout(LayoutStyle::horizontal().with_padding(Edges::all(px(6.0)))),
            )
            .unwrap();

        compose(&mut tree, root, &env).unwrap();
        assert_eq!(tree.node(layout).width, 12.0);
        assert_eq!(tree.node(layout).height, 12.0);
    }
}
