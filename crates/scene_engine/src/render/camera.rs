//! Camera component
//!
//! A camera keeps its own list of visible renderables. It seeds the list
//! from the scene once on activation and then follows the scene's component
//! event stream, so nothing is rescanned per frame.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{ComponentEvent, ComponentUpdateStatus, EventListener};
use crate::foundation::collections::{ComponentId, SecondaryMap};
use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec4};
use crate::scene::{Capabilities, Component, ComponentContext, Scene};

use super::frame::FrameUniforms;
use super::render_queue::{CameraPass, ViewportRect};

bitflags::bitflags! {
    /// Buffers cleared at the start of a camera pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Colour buffer
        const COLOR = 1 << 0;
        /// Depth buffer
        const DEPTH = 1 << 1;
        /// Stencil buffer
        const STENCIL = 1 << 2;
    }
}

impl Default for ClearFlags {
    fn default() -> Self {
        Self::COLOR | Self::DEPTH
    }
}

/// Camera projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective with a vertical field of view in radians
    Perspective {
        /// Vertical field of view
        fov_y: f32,
        /// Near plane distance
        near: f32,
        /// Far plane distance
        far: f32,
    },
    /// Orthographic box in view space
    Orthographic {
        /// Left plane
        left: f32,
        /// Right plane
        right: f32,
        /// Bottom plane
        bottom: f32,
        /// Top plane
        top: f32,
        /// Near plane
        near: f32,
        /// Far plane
        far: f32,
    },
    /// Caller supplied matrix, used as is
    Custom(Mat4),
}

impl Projection {
    /// Projection matrix for a viewport aspect ratio
    ///
    /// Only perspective projections depend on the aspect ratio.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        match *self {
            Projection::Perspective { fov_y, near, far } => Mat4::perspective(fov_y, aspect, near, far),
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Mat4::orthographic(left, right, bottom, top, near, far)
            }
            Projection::Custom(matrix) => matrix,
        }
    }
}

/// Insertion/removal in O(1); iteration order is not stable
#[derive(Debug, Default)]
struct VisibleSet {
    items: Vec<ComponentId>,
    slots: SecondaryMap<ComponentId, usize>,
}

impl VisibleSet {
    fn insert(&mut self, id: ComponentId) {
        if self.slots.contains_key(id) {
            return;
        }
        self.slots.insert(id, self.items.len());
        self.items.push(id);
    }

    fn remove(&mut self, id: ComponentId) {
        let Some(index) = self.slots.remove(id) else {
            return;
        };
        self.items.swap_remove(index);
        if let Some(moved) = self.items.get(index) {
            self.slots.insert(*moved, index);
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.slots.clear();
    }
}

/// Renders the scene's renderables from its GameObject's point of view
#[derive(Debug)]
pub struct Camera {
    projection: Projection,
    clear_flags: ClearFlags,
    clear_color: Vec4,
    viewport_offset: Vec2,
    viewport_size: Vec2,
    culling_mask: u32,
    visible: Rc<RefCell<VisibleSet>>,
    listener: EventListener<ComponentEvent>,
}

impl Camera {
    /// Camera with the given projection and full-target viewport
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            clear_flags: ClearFlags::default(),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            viewport_offset: Vec2::zeros(),
            viewport_size: Vec2::new(1.0, 1.0),
            culling_mask: u32::MAX,
            visible: Rc::new(RefCell::new(VisibleSet::default())),
            listener: EventListener::default(),
        }
    }

    /// Perspective camera; `fov_y` in radians
    pub fn perspective(fov_y: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective { fov_y, near, far })
    }

    /// Orthographic camera
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic { left, right, bottom, top, near, far })
    }

    /// Current projection
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Replace the projection
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    /// Projection matrix for a viewport aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection.matrix(aspect)
    }

    /// Buffers cleared before drawing
    pub fn clear_flags(&self) -> ClearFlags {
        self.clear_flags
    }

    /// Replace the clear flags
    pub fn set_clear_flags(&mut self, flags: ClearFlags) {
        self.clear_flags = flags;
    }

    /// Toggle individual clear flags
    pub fn set_clear(&mut self, flags: ClearFlags, enabled: bool) {
        self.clear_flags.set(flags, enabled);
    }

    /// Clear colour
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    /// Set the clear colour
    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    /// Viewport offset and size as fractions of the render target
    pub fn normalized_viewport(&self) -> (Vec2, Vec2) {
        (self.viewport_offset, self.viewport_size)
    }

    /// Set the viewport as fractions of the render target
    pub fn set_normalized_viewport(&mut self, offset: Vec2, size: Vec2) {
        self.viewport_offset = offset;
        self.viewport_size = size;
    }

    /// Layers this camera draws
    pub fn culling_mask(&self) -> u32 {
        self.culling_mask
    }

    /// Restrict the camera to GameObjects whose layer intersects `mask`
    pub fn set_culling_mask(&mut self, mask: u32) {
        self.culling_mask = mask;
    }

    /// Pixel rectangle for a render target size, rounded to whole pixels
    pub fn viewport_rect(&self, target: Vec2) -> ViewportRect {
        let offset = target.component_mul(&self.viewport_offset);
        let size = target.component_mul(&self.viewport_size);
        ViewportRect {
            x: offset.x.round() as i32,
            y: offset.y.round() as i32,
            width: size.x.round() as i32,
            height: size.y.round() as i32,
        }
    }

    /// Renderables currently tracked, in no particular order
    pub fn visible_components(&self) -> Vec<ComponentId> {
        self.visible.borrow().items.clone()
    }

    /// Whether a component belongs in a camera's visible list
    fn includes(capabilities: Capabilities) -> bool {
        capabilities.contains(Capabilities::RENDER) && !capabilities.contains(Capabilities::CAMERA)
    }

    fn rebuild(&self, scene: &Scene) {
        let mut visible = self.visible.borrow_mut();
        visible.clear();
        for id in scene.renderable_components() {
            if scene.component_capabilities(id).is_some_and(Self::includes) {
                visible.insert(id);
            }
        }
    }

    /// Visible components inside the culling mask, sorted by render order
    fn draw_list(&self, scene: &Scene) -> Vec<ComponentId> {
        let visible = self.visible.borrow();
        let mut draws: Vec<(i32, ComponentId)> = visible
            .items
            .iter()
            .filter_map(|&id| {
                let owner = scene.component_owner(id)?;
                let layer = scene.game_object(owner)?.layer();
                if layer & self.culling_mask == 0 {
                    return None;
                }
                let order = scene.component_dyn(id).map_or(0, |c| c.render_order());
                Some((order, id))
            })
            .collect();
        draws.sort_by_key(|(order, _)| *order);
        draws.into_iter().map(|(_, id)| id).collect()
    }
}

impl Component for Camera {
    fn capabilities(&self) -> Capabilities {
        Capabilities::CAMERA
    }

    fn activated(&mut self, ctx: &mut ComponentContext<'_>) {
        let visible = Rc::clone(&self.visible);
        self.listener = ctx.scene_mut().subscribe_component_events(move |event| {
            if !Camera::includes(event.capabilities) {
                return;
            }
            let mut visible = visible.borrow_mut();
            match event.status {
                ComponentUpdateStatus::Added => visible.insert(event.component),
                ComponentUpdateStatus::Removed => visible.remove(event.component),
            }
        });
        self.rebuild(ctx.scene());
        log::trace!("Camera {:?} tracking {} renderables", ctx.component_id(), self.visible.borrow().items.len());
    }

    fn deactivated(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.listener.unsubscribe();
        self.visible.borrow_mut().clear();
    }

    fn render(&mut self, ctx: &mut ComponentContext<'_>, uniforms: &mut FrameUniforms) {
        let Some(view) = ctx.transform_ref().map(|t| t.global_trs_inverse()) else {
            return;
        };
        let viewport = self.viewport_rect(uniforms.viewport_dimension);
        let projection = self.projection_matrix(viewport.aspect_ratio());

        uniforms.view_matrix = view;
        uniforms.projection_matrix = projection;
        uniforms.view_projection_matrix = projection * view;
        uniforms.render_queue.begin_pass(CameraPass::new(
            ctx.component_id(),
            viewport,
            self.clear_flags,
            self.clear_color,
            uniforms.view_projection_matrix,
        ));

        let draws = self.draw_list(ctx.scene());
        for id in draws {
            ctx.scene_mut().render_component(id, uniforms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{utils, Vec3};
    use crate::render::{LineRenderer, MeshId, MeshRenderer, MaterialId, Primitive};
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn as_set(ids: Vec<ComponentId>) -> HashSet<ComponentId> {
        ids.into_iter().collect()
    }

    fn scene_with_camera() -> (Scene, crate::foundation::collections::ComponentHandle<Camera>) {
        let mut scene = Scene::new("camera test");
        let (_, camera) = scene
            .create_perspective_camera("camera", utils::deg_to_rad(60.0), 0.1, 100.0)
            .unwrap();
        (scene, camera)
    }

    #[test]
    fn test_incremental_list_matches_rescan() {
        let (mut scene, camera) = scene_with_camera();

        let a = scene.create_game_object("a");
        let b = scene.create_game_object("b");
        let la = scene.add_component(a, LineRenderer::new(vec![Vec3::zeros(), Vec3::x()])).unwrap();
        let mb = scene.add_component(b, MeshRenderer::new(MeshId(1), MaterialId(2))).unwrap();
        let lb = scene.add_component(b, LineRenderer::default()).unwrap();

        scene.destroy_component(la).unwrap();
        scene.set_game_object_active(b, false).unwrap();
        scene.set_game_object_active(b, true).unwrap();
        scene.destroy_component(mb).unwrap();
        let c = scene.create_game_object("c");
        scene.add_component(c, LineRenderer::default()).unwrap();

        let tracked = scene.component(camera).unwrap().visible_components();
        assert_eq!(as_set(tracked.clone()), as_set(scene.renderable_components()));
        assert_eq!(tracked.len(), 2);
        assert!(tracked.contains(&lb.id()));
    }

    #[test]
    fn test_camera_seeds_from_existing_renderables() {
        let mut scene = Scene::new("late camera");
        let a = scene.create_game_object("a");
        scene.add_component(a, LineRenderer::default()).unwrap();
        scene.add_component(a, LineRenderer::default()).unwrap();

        let (_, camera) = scene.create_orthographic_camera("ortho", -1.0, 1.0, -1.0, 1.0, 0.1, 10.0).unwrap();
        assert_eq!(scene.component(camera).unwrap().visible_components().len(), 2);
    }

    #[test]
    fn test_deactivated_camera_stops_listening() {
        let (mut scene, camera) = scene_with_camera();
        assert_eq!(scene.component_listener_count(), 1);

        let owner = scene.component_owner(camera).unwrap();
        scene.set_game_object_active(owner, false).unwrap();
        assert_eq!(scene.component_listener_count(), 0);

        let a = scene.create_game_object("a");
        scene.add_component(a, LineRenderer::default()).unwrap();
        assert!(scene.component(camera).unwrap().visible_components().is_empty());

        // Reactivation rebuilds from the scene
        scene.set_game_object_active(owner, true).unwrap();
        assert_eq!(scene.component(camera).unwrap().visible_components().len(), 1);
    }

    #[test]
    fn test_render_writes_view_from_transform() {
        let (mut scene, camera) = scene_with_camera();
        let owner = scene.component_owner(camera).unwrap();
        let t = scene.transform_of(owner).unwrap();
        scene.transforms_mut().set_local_position(t, Vec3::new(0.0, 0.0, 5.0)).unwrap();

        let mut uniforms = FrameUniforms::new(Vec2::new(800.0, 400.0));
        scene.render(&mut uniforms);

        let expected_view = scene.transforms().get(t).unwrap().global_trs_inverse();
        assert_relative_eq!(uniforms.view_matrix, expected_view, epsilon = 1e-5);
        assert_relative_eq!(
            uniforms.view_projection_matrix,
            uniforms.projection_matrix * uniforms.view_matrix,
            epsilon = 1e-5
        );

        let pass = uniforms.render_queue.current_pass().unwrap();
        assert_eq!(pass.camera, camera.id());
        assert_eq!(pass.viewport, ViewportRect { x: 0, y: 0, width: 800, height: 400 });
        assert_eq!(pass.clear_flags, ClearFlags::COLOR | ClearFlags::DEPTH);
    }

    #[test]
    fn test_culling_mask_skips_layers() {
        let (mut scene, camera) = scene_with_camera();
        let near = scene.create_game_object("default layer");
        let hidden = scene.create_game_object("ui layer");
        scene.set_game_object_layer(hidden, 1 << 4).unwrap();
        scene.add_component(near, LineRenderer::default()).unwrap();
        scene.add_component(hidden, LineRenderer::default()).unwrap();

        scene.component_mut(camera).unwrap().set_culling_mask(crate::scene::DEFAULT_LAYER);

        let mut uniforms = FrameUniforms::default();
        scene.render(&mut uniforms);

        let pass = uniforms.render_queue.current_pass().unwrap();
        assert_eq!(pass.command_count(), 1);
        assert_eq!(pass.commands[0].game_object, near);
    }

    #[test]
    fn test_draws_sorted_by_render_order() {
        let (mut scene, _camera) = scene_with_camera();
        let go = scene.create_game_object("lines");
        let mut late = LineRenderer::default();
        late.set_render_order(10);
        let mut early = LineRenderer::default();
        early.set_render_order(-5);
        let mut middle = MeshRenderer::new(MeshId(7), MaterialId(1));
        middle.set_render_order(2);

        scene.add_component(go, late).unwrap();
        scene.add_component(go, early).unwrap();
        scene.add_component(go, middle).unwrap();

        let mut uniforms = FrameUniforms::default();
        scene.render(&mut uniforms);

        let orders: Vec<i32> = uniforms.render_queue.passes()[0]
            .commands
            .iter()
            .map(|c| c.render_order)
            .collect();
        assert_eq!(orders, vec![-5, 2, 10]);
        assert!(matches!(
            uniforms.render_queue.passes()[0].commands[1].primitive,
            Primitive::Mesh { mesh: MeshId(7), .. }
        ));
    }

    #[test]
    fn test_normalized_viewport_rounding() {
        let mut camera = Camera::perspective(1.0, 0.1, 10.0);
        camera.set_normalized_viewport(Vec2::new(0.5, 0.0), Vec2::new(0.5, 0.5));
        let rect = camera.viewport_rect(Vec2::new(101.0, 51.0));
        assert_eq!(rect, ViewportRect { x: 51, y: 0, width: 51, height: 26 });
    }

    #[test]
    fn test_clear_flag_toggles() {
        let mut camera = Camera::perspective(1.0, 0.1, 10.0);
        camera.set_clear(ClearFlags::DEPTH, false);
        camera.set_clear(ClearFlags::STENCIL, true);
        assert_eq!(camera.clear_flags(), ClearFlags::COLOR | ClearFlags::STENCIL);
    }
}
