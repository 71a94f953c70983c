//! Line geometry renderer

use crate::foundation::math::{Vec3, Vec4};
use crate::scene::{Capabilities, Component, ComponentContext};

use super::frame::FrameUniforms;
use super::render_queue::{LineTopology, Primitive};
use super::submit_draw;

/// Draws lines through a set of object-space points
#[derive(Debug, Clone, PartialEq)]
pub struct LineRenderer {
    points: Vec<Vec3>,
    indices: Vec<u16>,
    topology: LineTopology,
    color: Vec4,
    smooth: bool,
    render_order: i32,
}

impl LineRenderer {
    /// Segments between consecutive pairs of points
    pub fn new(points: Vec<Vec3>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    /// Points in object space
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Index list; empty means points are used in order
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// How points are connected
    pub fn topology(&self) -> LineTopology {
        self.topology
    }

    /// Replace the geometry
    pub fn set_points(&mut self, points: Vec<Vec3>, topology: LineTopology, indices: Vec<u16>) {
        self.points = points;
        self.topology = topology;
        self.indices = indices;
    }

    /// Line colour
    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Set the line colour
    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    /// Whether anti-aliased lines are requested
    pub fn smooth_line(&self) -> bool {
        self.smooth
    }

    /// Request anti-aliased lines
    pub fn set_smooth_line(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    /// Change the draw order
    pub fn set_render_order(&mut self, order: i32) {
        self.render_order = order;
    }
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            indices: Vec::new(),
            topology: LineTopology::Lines,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            smooth: true,
            render_order: 0,
        }
    }
}

impl Component for LineRenderer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER
    }

    fn render(&mut self, ctx: &mut ComponentContext<'_>, uniforms: &mut FrameUniforms) {
        if self.points.is_empty() {
            return;
        }
        let primitive = Primitive::Lines {
            points: self.points.clone(),
            indices: self.indices.clone(),
            topology: self.topology,
            color: self.color,
            smooth: self.smooth,
        };
        submit_draw(ctx, uniforms, self.render_order, primitive);
    }

    fn render_order(&self) -> i32 {
        self.render_order
    }
}
