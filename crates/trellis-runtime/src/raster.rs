// crates/trellis-runtime/src/raster.rs

use tracing::warn;
use trellis_core::{NodeId, RasterCache, Tree};
use trellis_render::{color, RenderBackend, RenderError, RenderResult};

use crate::render_pass::render_subtree_local;

/// Post-order rasterization: descendant compositions first, so a parent's
/// raster can blit its children's caches. A composition is re-rastered only
/// when it recomposed since the last pass or its target size changed.
pub(crate) fn rasterize_pass<B: RenderBackend>(
    tree: &mut Tree,
    id: NodeId,
    backend: &mut B,
    scale: f32,
) -> RenderResult<()> {
    let kids = tree.node(id).children.clone();
    for &kid in &kids {
        if tree.node(kid).is_composition() {
            rasterize_pass(tree, kid, backend, scale)?;
        }
    }

    let node = tree.node(id);
    if !node.is_composition() || !node.optimize {
        return Ok(());
    }
    let width = (node.width * scale).round() as u32;
    let height = (node.height * scale).round() as u32;
    let needs_raster = node.needs_raster;
    let raster = node.raster;

    if width == 0 || height == 0 {
        if let Some(raster) = tree.node_mut(id).raster.take() {
            let name = tree.node(id).name.clone();
            release_target(backend, raster, &name);
        }
        tree.node_mut(id).needs_raster = false;
        return Ok(());
    }

    match raster {
        Some(raster) if !needs_raster && raster.width == width && raster.height == height => {
            return Ok(());
        }
        Some(raster) if raster.width != width || raster.height != height => {
            let name = tree.node(id).name.clone();
            release_target(backend, raster, &name);
            tree.node_mut(id).raster = None;
        }
        _ => {}
    }

    let target = match tree.node(id).raster {
        Some(raster) => raster.target,
        None => match backend.create_target(width, height) {
            Ok(target) => target,
            Err(RenderError::TargetAllocation(reason)) => {
                // Degrade to live rendering rather than failing the frame.
                warn!(
                    node = %tree.node(id).name,
                    %reason,
                    "raster target allocation failed, disabling caching"
                );
                tree.node_mut(id).optimize = false;
                return Ok(());
            }
            Err(err) => return Err(err),
        },
    };

    backend.bind_target(target)?;
    backend.clear(color::TRANSPARENT)?;
    render_subtree_local(tree, id, backend)?;
    backend.unbind_target()?;

    let node = tree.node_mut(id);
    node.raster = Some(RasterCache {
        target,
        width,
        height,
    });
    node.needs_raster = false;
    Ok(())
}

fn release_target<B: RenderBackend>(backend: &mut B, raster: RasterCache, name: &str) {
    if let Err(err) = backend.destroy_target(raster.target) {
        warn!(node = %name, %err, "failed to release raster target");
    }
}
