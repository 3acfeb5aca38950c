// crates/trellis-runtime/src/render_pass.rs

use glam::Vec2;
use trellis_core::{Background, Content, Node, NodeId, Tree};
use trellis_render::{color, RenderBackend, RenderResult};

/// Draws one node at its composition-local position. Optimized compositions
/// with a live raster are a single blit; everything else renders in place,
/// children in insertion order (which is paint order).
pub(crate) fn render_node<B: RenderBackend>(
    tree: &Tree,
    id: NodeId,
    backend: &mut B,
    overlay: bool,
) -> RenderResult<()> {
    let node = tree.node(id);
    let position = node.position();
    let size = node.size();

    if node.is_composition() {
        if node.optimize {
            if let Some(raster) = node.raster {
                backend.draw_raster(raster.target, position, size)?;
                if overlay {
                    outline(backend, position, size, node.composed)?;
                }
                return Ok(());
            }
        }
        // Live path: no cache, draw the subtree directly.
        draw_background(backend, node, position, size)?;
        backend.push_translate(position)?;
        backend.set_clip(Vec2::ZERO, size)?;
        for &child in &node.children {
            render_node(tree, child, backend, overlay)?;
        }
        backend.clear_clip()?;
        backend.pop_transform()?;
    } else {
        draw_background(backend, node, position, size)?;
        draw_content(backend, node, position, size)?;
    }

    if overlay {
        outline(backend, position, size, node.composed)?;
    }
    Ok(())
}

/// Draws a composition's subtree at the raster origin: its own background
/// fills the target, children land at their composition-local coordinates.
pub(crate) fn render_subtree_local<B: RenderBackend>(
    tree: &Tree,
    id: NodeId,
    backend: &mut B,
) -> RenderResult<()> {
    let node = tree.node(id);
    draw_background(backend, node, Vec2::ZERO, node.size())?;
    for &child in &node.children {
        render_node(tree, child, backend, false)?;
    }
    Ok(())
}

fn draw_background<B: RenderBackend>(
    backend: &mut B,
    node: &Node,
    position: Vec2,
    size: Vec2,
) -> RenderResult<()> {
    match &node.modifier.background {
        Some(Background::Color(color)) => {
            backend.draw_rect(position, size, *color, 0.0, color::TRANSPARENT)
        }
        Some(Background::Image { source, opacity }) => {
            backend.draw_image(position, size, source, *opacity)
        }
        None => Ok(()),
    }
}

fn draw_content<B: RenderBackend>(
    backend: &mut B,
    node: &Node,
    position: Vec2,
    size: Vec2,
) -> RenderResult<()> {
    match &node.content {
        Some(Content::Text {
            text,
            font_size,
            color,
        }) => backend.draw_text(position, text, *font_size, *color),
        Some(Content::Image { source, opacity }) => {
            backend.draw_image(position, size, source, *opacity)
        }
        None => Ok(()),
    }
}

fn outline<B: RenderBackend>(
    backend: &mut B,
    position: Vec2,
    size: Vec2,
    composed: bool,
) -> RenderResult<()> {
    // Never-composed nodes get a solid marker fill instead of just an outline.
    let fill = if composed {
        color::TRANSPARENT
    } else {
        color::MAGENTA
    };
    backend.draw_rect(position, size, fill, 1.0, color::MAGENTA)
}
