// crates/trellis-render/src/lib.rs

use glam::{Vec2, Vec4};
use trellis_core::RasterId;

pub mod recording;
pub use recording::*;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("offscreen target allocation failed: {0}")]
    TargetAllocation(String),

    #[error("unknown raster target: {0}")]
    UnknownTarget(RasterId),

    #[error("render operation failed: {0}")]
    RenderFailed(String),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Drawing interface the engine issues calls against. The engine never
/// constructs pixels itself; it computes geometry and delegates here.
/// Implementations are assumed synchronous (immediate-mode submission) and
/// apply their own device-pixel-ratio scaling inside bound targets.
pub trait RenderBackend {
    fn begin_frame(&mut self, width: f32, height: f32, scale: f32) -> RenderResult<()>;
    fn end_frame(&mut self) -> RenderResult<()>;

    /// Allocates an offscreen raster target; the handle is exclusively owned
    /// by the requesting composition until `destroy_target`.
    fn create_target(&mut self, width: u32, height: u32) -> RenderResult<RasterId>;
    fn destroy_target(&mut self, target: RasterId) -> RenderResult<()>;
    fn bind_target(&mut self, target: RasterId) -> RenderResult<()>;
    fn unbind_target(&mut self) -> RenderResult<()>;

    fn clear(&mut self, color: Vec4) -> RenderResult<()>;
    fn draw_rect(
        &mut self,
        position: Vec2,
        size: Vec2,
        color: Vec4,
        border_width: f32,
        border_color: Vec4,
    ) -> RenderResult<()>;
    fn draw_ellipse(&mut self, center: Vec2, radii: Vec2, color: Vec4) -> RenderResult<()>;
    fn draw_image(
        &mut self,
        position: Vec2,
        size: Vec2,
        source: &str,
        opacity: f32,
    ) -> RenderResult<()>;
    /// Blits a cached raster target.
    fn draw_raster(&mut self, target: RasterId, position: Vec2, size: Vec2) -> RenderResult<()>;
    fn draw_text(
        &mut self,
        position: Vec2,
        text: &str,
        font_size: f32,
        color: Vec4,
    ) -> RenderResult<()>;

    fn push_translate(&mut self, offset: Vec2) -> RenderResult<()>;
    fn pop_transform(&mut self) -> RenderResult<()>;
    fn set_clip(&mut self, position: Vec2, size: Vec2) -> RenderResult<()>;
    fn clear_clip(&mut self) -> RenderResult<()>;
}

/// Color utilities
pub mod color {
    use glam::Vec4;

    pub const TRANSPARENT: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);

    pub fn from_hex(hex: u32) -> Vec4 {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Vec4::new(r, g, b, a)
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Vec4 {
        Vec4::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }
}
