//! Render queue standing in for GPU submission
//!
//! Each active camera opens a [`CameraPass`]; renderables append
//! [`RenderCommand`]s to the most recent pass. The queue is cleared at the
//! start of every frame.

use crate::foundation::collections::{ComponentId, GameObjectId};
use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::camera::ClearFlags;
use super::mesh_renderer::{MaterialId, MeshId};

/// Pixel rectangle of a camera pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportRect {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl ViewportRect {
    /// Width over height, 1.0 for an empty rect
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }
}

/// Primitive layout of a line renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineTopology {
    /// Every two points form a segment
    #[default]
    Lines,
    /// Consecutive points are connected
    LineStrip,
}

/// What a command draws
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Line geometry in object space
    Lines {
        /// Vertex positions
        points: Vec<Vec3>,
        /// Optional index list; empty means sequential
        indices: Vec<u16>,
        /// How points are connected
        topology: LineTopology,
        /// Line colour
        color: Vec4,
        /// Anti-aliased lines requested
        smooth: bool,
    },
    /// A mesh owned by the asset layer
    Mesh {
        /// Mesh id
        mesh: MeshId,
        /// Material id
        material: MaterialId,
    },
}

/// One draw submission
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    /// Submitting component
    pub component: ComponentId,
    /// Its GameObject
    pub game_object: GameObjectId,
    /// Object to world
    pub model_matrix: Mat4,
    /// Object to clip
    pub model_view_projection: Mat4,
    /// Render order the camera sorted by
    pub render_order: i32,
    /// Geometry to draw
    pub primitive: Primitive,
}

/// Draws issued by one camera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPass {
    /// Camera component
    pub camera: ComponentId,
    /// Target rectangle
    pub viewport: ViewportRect,
    /// Buffers cleared before drawing
    pub clear_flags: ClearFlags,
    /// Clear colour, used when `clear_flags` has `COLOR`
    pub clear_color: Vec4,
    /// Camera view-projection
    pub view_projection: Mat4,
    /// Draws in submission order
    pub commands: Vec<RenderCommand>,
}

impl CameraPass {
    /// Start an empty pass
    pub fn new(
        camera: ComponentId,
        viewport: ViewportRect,
        clear_flags: ClearFlags,
        clear_color: Vec4,
        view_projection: Mat4,
    ) -> Self {
        Self {
            camera,
            viewport,
            clear_flags,
            clear_color,
            view_projection,
            commands: Vec::new(),
        }
    }

    /// Number of commands
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

/// All camera passes of a frame, in render order
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    passes: Vec<CameraPass>,
}

impl RenderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Open a new pass; later submissions go into it
    pub fn begin_pass(&mut self, pass: CameraPass) {
        self.passes.push(pass);
    }

    /// Append a command to the current pass
    ///
    /// Returns `false` and drops the command when no pass is open.
    pub fn submit(&mut self, command: RenderCommand) -> bool {
        match self.passes.last_mut() {
            Some(pass) => {
                pass.commands.push(command);
                true
            }
            None => {
                log::warn!("Dropping draw from {:?}: no camera pass is open", command.component);
                false
            }
        }
    }

    /// The pass currently receiving submissions
    pub fn current_pass(&self) -> Option<&CameraPass> {
        self.passes.last()
    }

    /// All passes
    pub fn passes(&self) -> &[CameraPass] {
        &self.passes
    }

    /// Number of passes
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Commands across all passes
    pub fn command_count(&self) -> usize {
        self.passes.iter().map(CameraPass::command_count).sum()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.passes.clear();
    }
}
