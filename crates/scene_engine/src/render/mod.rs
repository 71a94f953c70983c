//! Render dispatch
//!
//! The scene hands [`FrameUniforms`] to every active [`Camera`]; each camera
//! opens a pass in the [`RenderQueue`] and asks its visible renderables to
//! submit draw commands. No graphics API is touched here.

mod camera;
mod frame;
mod line_renderer;
mod mesh_renderer;
mod render_queue;

pub use camera::{Camera, ClearFlags, Projection};
pub use frame::FrameUniforms;
pub use line_renderer::LineRenderer;
pub use mesh_renderer::{MaterialId, MeshId, MeshRenderer};
pub use render_queue::{CameraPass, LineTopology, Primitive, RenderCommand, RenderQueue, ViewportRect};

use crate::scene::ComponentContext;

/// Submit a draw for the running component using its transform
pub(crate) fn submit_draw(
    ctx: &ComponentContext<'_>,
    uniforms: &mut FrameUniforms,
    render_order: i32,
    primitive: Primitive,
) {
    let Some(model_matrix) = ctx.transform_ref().map(|t| t.global_matrix()) else {
        return;
    };
    uniforms.render_queue.submit(RenderCommand {
        component: ctx.component_id(),
        game_object: ctx.game_object(),
        model_matrix,
        model_view_projection: uniforms.view_projection_matrix * model_matrix,
        render_order,
        primitive,
    });
}
