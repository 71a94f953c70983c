//! Per-frame uniforms handed to cameras and renderables

use crate::foundation::math::{Mat4, Vec2};

use super::render_queue::RenderQueue;

/// Frame-level render context
///
/// The scene passes this through untouched; cameras write the view and
/// projection matrices, renderables read them and submit draw commands.
#[derive(Debug, Clone)]
pub struct FrameUniforms {
    /// Render target size in pixels
    pub viewport_dimension: Vec2,

    /// World to view, written by the current camera
    pub view_matrix: Mat4,

    /// View to clip, written by the current camera
    pub projection_matrix: Mat4,

    /// `projection_matrix * view_matrix`
    pub view_projection_matrix: Mat4,

    /// Frame number, starting at 0
    pub frame: u64,

    /// Seconds since the previous frame
    pub delta_time: f32,

    /// Draw submissions for this frame
    pub render_queue: RenderQueue,
}

impl FrameUniforms {
    /// Uniforms for a render target of the given size
    pub fn new(viewport_dimension: Vec2) -> Self {
        Self {
            viewport_dimension,
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            view_projection_matrix: Mat4::identity(),
            frame: 0,
            delta_time: 0.0,
            render_queue: RenderQueue::new(),
        }
    }

    /// Reset per-frame state before a new render
    pub fn begin_frame(&mut self, frame: u64, delta_time: f32) {
        self.frame = frame;
        self.delta_time = delta_time;
        self.view_matrix = Mat4::identity();
        self.projection_matrix = Mat4::identity();
        self.view_projection_matrix = Mat4::identity();
        self.render_queue.clear();
    }

    /// Width over height, 1.0 for an empty target
    pub fn aspect_ratio(&self) -> f32 {
        if self.viewport_dimension.y > 0.0 {
            self.viewport_dimension.x / self.viewport_dimension.y
        } else {
            1.0
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(Vec2::new(1280.0, 720.0))
    }
}
