//! Component behaviour attached to GameObjects
//!
//! A component is a boxed trait object owned by its [`Scene`]. The scene
//! drives every hook; components never call each other's hooks directly.
//!
//! Hooks receive a [`ComponentContext`] that lends out the whole scene, so a
//! hook may create or destroy GameObjects, add components, move transforms or
//! destroy itself. While a hook runs, the component's own instance is checked
//! out of the scene and cannot be looked up through it.

use std::any::Any;

use crate::foundation::collections::{ComponentId, GameObjectId, TransformId};
use crate::render::FrameUniforms;

use super::scene::Scene;
use super::transform::TransformRef;

bitflags::bitflags! {
    /// Per-frame services a component takes part in
    ///
    /// Fixed when the component is added to a scene.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Receives [`Component::update`] once per frame while active
        const UPDATE = 1 << 0;
        /// Draws through [`Component::render`] when a camera sees it
        const RENDER = 1 << 1;
        /// Drives a render pass over the scene's renderables
        const CAMERA = 1 << 2;
    }
}

/// Lifecycle state of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Added but never activated (scene not live or GameObject inactive)
    Constructed,
    /// Participating in update and render
    Active,
    /// Deactivated after having been active
    Inactive,
    /// Torn down or about to be; the handle is stale or soon will be
    Destroyed,
}

/// Downcasting support for component trait objects
pub trait AsAny: Any {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrow as [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour attached to a GameObject
///
/// Every hook has an empty default. `activated` and `deactivated` always
/// alternate, starting with `activated`; `destroyed` runs exactly once and
/// after a final `deactivated` if the component was active.
pub trait Component: AsAny {
    /// Services this component takes part in
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// The component became active
    fn activated(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// The component left the active set
    fn deactivated(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// The component is being removed from the scene
    fn destroyed(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Per-frame update; only called with [`Capabilities::UPDATE`]
    fn update(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Draw for the camera currently writing `uniforms`; only called with
    /// [`Capabilities::RENDER`] or [`Capabilities::CAMERA`]
    fn render(&mut self, _ctx: &mut ComponentContext<'_>, _uniforms: &mut FrameUniforms) {}

    /// Draw order within a camera pass, ascending
    fn render_order(&self) -> i32 {
        0
    }
}

/// Access to the scene from inside a component hook
pub struct ComponentContext<'a> {
    pub(crate) scene: &'a mut Scene,
    pub(crate) component: ComponentId,
    pub(crate) game_object: GameObjectId,
    pub(crate) transform: TransformId,
}

impl ComponentContext<'_> {
    /// Id of the component whose hook is running
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// Owning GameObject
    pub fn game_object(&self) -> GameObjectId {
        self.game_object
    }

    /// Transform of the owning GameObject
    pub fn transform(&self) -> TransformId {
        self.transform
    }

    /// Read the owning GameObject's transform
    pub fn transform_ref(&self) -> Option<TransformRef<'_>> {
        self.scene.transforms().get(self.transform)
    }

    /// The scene this component belongs to
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Mutable access to the owning scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    /// Destroy the running component once its hook returns
    pub fn destroy_self(&mut self) {
        let id = self.component;
        if let Err(err) = self.scene.destroy_component(id) {
            log::warn!("destroy_self on {:?} failed: {}", id, err);
        }
    }
}
