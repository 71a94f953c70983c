//! Mesh renderer referring to externally owned assets

use crate::scene::{Capabilities, Component, ComponentContext};

use super::frame::FrameUniforms;
use super::render_queue::Primitive;
use super::submit_draw;

/// Opaque id of a mesh owned by the asset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Opaque id of a material owned by the asset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Draws one mesh with one material
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    mesh: Option<MeshId>,
    material: MaterialId,
    render_order: i32,
}

impl MeshRenderer {
    /// Renderer for a mesh/material pair
    pub fn new(mesh: MeshId, material: MaterialId) -> Self {
        Self {
            mesh: Some(mesh),
            material,
            render_order: 0,
        }
    }

    /// Mesh drawn, if any
    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    /// Swap the mesh; `None` disables drawing
    pub fn set_mesh(&mut self, mesh: Option<MeshId>) {
        self.mesh = mesh;
    }

    /// Material used
    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Swap the material
    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }

    /// Change the draw order
    pub fn set_render_order(&mut self, order: i32) {
        self.render_order = order;
    }
}

impl Component for MeshRenderer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER
    }

    fn render(&mut self, ctx: &mut ComponentContext<'_>, uniforms: &mut FrameUniforms) {
        let Some(mesh) = self.mesh else {
            return;
        };
        let primitive = Primitive::Mesh {
            mesh,
            material: self.material,
        };
        submit_draw(ctx, uniforms, self.render_order, primitive);
    }

    fn render_order(&self) -> i32 {
        self.render_order
    }
}
