// crates/trellis-render/src/recording.rs

use std::collections::HashSet;

use glam::{Vec2, Vec4};
use trellis_core::RasterId;

use crate::{RenderBackend, RenderError, RenderResult};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    BeginFrame { width: f32, height: f32, scale: f32 },
    EndFrame,
    CreateTarget { target: RasterId, width: u32, height: u32 },
    DestroyTarget { target: RasterId },
    BindTarget { target: RasterId },
    UnbindTarget,
    Clear { color: Vec4 },
    Rect { position: Vec2, size: Vec2, color: Vec4, border_width: f32, border_color: Vec4 },
    Ellipse { center: Vec2, radii: Vec2, color: Vec4 },
    Image { position: Vec2, size: Vec2, source: String, opacity: f32 },
    Raster { target: RasterId, position: Vec2, size: Vec2 },
    Text { position: Vec2, text: String, font_size: f32, color: Vec4 },
    PushTranslate { offset: Vec2 },
    PopTransform,
    SetClip { position: Vec2, size: Vec2 },
    ClearClip,
}

/// Backend that records every call for assertions. Target allocation can be
/// rigged to fail to exercise the degraded (live-rendering) path.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    ops: Vec<RenderOp>,
    live_targets: HashSet<RasterId>,
    next_target: RasterId,
    pub fail_target_allocation: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn live_target_count(&self) -> usize {
        self.live_targets.len()
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, width: f32, height: f32, scale: f32) -> RenderResult<()> {
        self.ops.push(RenderOp::BeginFrame { width, height, scale });
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        self.ops.push(RenderOp::EndFrame);
        Ok(())
    }

    fn create_target(&mut self, width: u32, height: u32) -> RenderResult<RasterId> {
        if self.fail_target_allocation {
            return Err(RenderError::TargetAllocation(format!(
                "{width}x{height} refused"
            )));
        }
        self.next_target += 1;
        let target = self.next_target;
        self.live_targets.insert(target);
        self.ops.push(RenderOp::CreateTarget { target, width, height });
        Ok(target)
    }

    fn destroy_target(&mut self, target: RasterId) -> RenderResult<()> {
        if !self.live_targets.remove(&target) {
            return Err(RenderError::UnknownTarget(target));
        }
        self.ops.push(RenderOp::DestroyTarget { target });
        Ok(())
    }

    fn bind_target(&mut self, target: RasterId) -> RenderResult<()> {
        if !self.live_targets.contains(&target) {
            return Err(RenderError::UnknownTarget(target));
        }
        self.ops.push(RenderOp::BindTarget { target });
        Ok(())
    }

    fn unbind_target(&mut self) -> RenderResult<()> {
        self.ops.push(RenderOp::UnbindTarget);
        Ok(())
    }

    fn clear(&mut self, color: Vec4) -> RenderResult<()> {
        self.ops.push(RenderOp::Clear { color });
        Ok(())
    }

    fn draw_rect(
        &mut self,
        position: Vec2,
        size: Vec2,
        color: Vec4,
        border_width: f32,
        border_color: Vec4,
    ) -> RenderResult<()> {
        self.ops.push(RenderOp::Rect {
            position,
            size,
            color,
            border_width,
            border_color,
        });
        Ok(())
    }

    fn draw_ellipse(&mut self, center: Vec2, radii: Vec2, color: Vec4) -> RenderResult<()> {
        self.ops.push(RenderOp::Ellipse { center, radii, color });
        Ok(())
    }

    fn draw_image(
        &mut self,
        position: Vec2,
        size: Vec2,
        source: &str,
        opacity: f32,
    ) -> RenderResult<()> {
        self.ops.push(RenderOp::Image {
            position,
            size,
            source: source.to_string(),
            opacity,
        });
        Ok(())
    }

    fn draw_raster(&mut self, target: RasterId, position: Vec2, size: Vec2) -> RenderResult<()> {
        if !self.live_targets.contains(&target) {
            return Err(RenderError::UnknownTarget(target));
        }
        self.ops.push(RenderOp::Raster { target, position, size });
        Ok(())
    }

    fn draw_text(
        &mut self,
        position: Vec2,
        text: &str,
        font_size: f32,
        color: Vec4,
    ) -> RenderResult<()> {
        self.ops.push(RenderOp::Text {
            position,
            text: text.to_string(),
            font_size,
            color,
        });
        Ok(())
    }

    fn push_translate(&mut self, offset: Vec2) -> RenderResult<()> {
        self.ops.push(RenderOp::PushTranslate { offset });
        Ok(())
    }

    fn pop_transform(&mut self) -> RenderResult<()> {
        self.ops.push(RenderOp::PopTransform);
        Ok(())
    }

    fn set_clip(&mut self, position: Vec2, size: Vec2) -> RenderResult<()> {
        self.ops.push(RenderOp::SetClip { position, size });
        Ok(())
    }

    fn clear_clip(&mut self) -> RenderResult<()> {
        self.ops.push(RenderOp::ClearClip);
        Ok(())
    }
}
