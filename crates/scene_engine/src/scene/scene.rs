//! Scene: owner of GameObjects, components and transforms
//!
//! ## Lifecycle
//!
//! A component is active exactly when its scene is live and its GameObject
//! is active. Every change to either flag is reconciled immediately, calling
//! `activated`/`deactivated` and publishing on the component event stream.
//!
//! Hooks run with the component checked out of its slot. Destroying a
//! component whose hook is on the stack only marks it; teardown finishes as
//! soon as that hook returns. A GameObject whose components are still
//! tearing down stays in the arena, flagged as destroying, until the last one
//! is gone.

use std::any::{type_name, TypeId};

use crate::events::{ComponentEvent, ComponentUpdateStatus, EventListener, EventStream};
use crate::foundation::collections::{ComponentHandle, ComponentId, GameObjectId, SlotMap, TransformId};
use crate::foundation::math::Vec3;
use crate::render::{Camera, FrameUniforms, LineRenderer};

use super::component::{Capabilities, Component, ComponentContext, ComponentState};
use super::error::SceneError;
use super::game_object::{GameObject, GameObjectData};
use super::transform::Transforms;

struct ComponentSlot {
    owner: GameObjectId,
    capabilities: Capabilities,
    type_id: TypeId,
    type_name: &'static str,
    state: ComponentState,
    /// `None` while one of the component's hooks is running
    instance: Option<Box<dyn Component>>,
    /// Destroy was requested while checked out
    destroy_requested: bool,
    /// Teardown in progress
    destroying: bool,
    /// An `Added` event went out without a matching `Removed` yet
    announced: bool,
}

impl ComponentSlot {
    /// Destruction requested or under way
    fn is_doomed(&self) -> bool {
        self.destroy_requested || self.destroying
    }
}

/// A graph of GameObjects
pub struct Scene {
    name: String,
    live: bool,
    game_objects: SlotMap<GameObjectId, GameObjectData>,
    order: Vec<GameObjectId>,
    components: SlotMap<ComponentId, ComponentSlot>,
    transforms: Transforms,
    cameras: Vec<ComponentId>,
    component_events: EventStream<ComponentEvent>,
}

impl Scene {
    /// Create an empty, live scene
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        log::debug!("Created scene '{}'", name);
        Self {
            name,
            live: true,
            game_objects: SlotMap::with_key(),
            order: Vec::new(),
            components: SlotMap::with_key(),
            transforms: Transforms::new(),
            cameras: Vec::new(),
            component_events: EventStream::new(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether components on active GameObjects are active
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Make the scene live (or not), activating or deactivating components
    pub fn set_live(&mut self, live: bool) {
        if self.live == live {
            return;
        }
        self.live = live;
        log::debug!("Scene '{}' live = {}", self.name, live);

        for id in self.all_components() {
            self.reconcile(id);
        }
    }

    // ---------------------------------------------------------------------
    // GameObjects
    // ---------------------------------------------------------------------

    /// Create an active GameObject with a root transform at the origin
    pub fn create_game_object(&mut self, name: impl Into<String>) -> GameObjectId {
        let name = name.into();
        let transforms = &mut self.transforms;
        let id = self
            .game_objects
            .insert_with_key(|key| GameObjectData::new(name, transforms.insert(key)));
        self.order.push(id);
        log::trace!("Created GameObject {:?}", id);
        id
    }

    /// Destroy a GameObject, all of its components, then its transform
    ///
    /// Children of the transform become roots. Calling this again while the
    /// same destruction is still in progress is a no-op; calling it after the
    /// GameObject is gone reports a stale id.
    pub fn destroy_game_object(&mut self, id: GameObjectId) -> Result<(), SceneError> {
        let data = self
            .game_objects
            .get_mut(id)
            .ok_or(SceneError::StaleGameObject(id))?;
        if data.destroying {
            return Ok(());
        }
        data.destroying = true;
        let components = data.components.clone();
        log::trace!("Destroying GameObject {:?} ({} components)", id, components.len());

        for component in components {
            // Another hook in this cascade may already have destroyed it
            let _ = self.destroy_component(component);
        }

        self.remove_if_torn_down(id);
        Ok(())
    }

    /// Number of GameObjects, including ones still tearing down
    pub fn game_object_count(&self) -> usize {
        self.order.len()
    }

    /// Whether the id refers to a GameObject in this scene
    pub fn contains_game_object(&self, id: GameObjectId) -> bool {
        self.game_objects.contains_key(id)
    }

    /// View a GameObject
    pub fn game_object(&self, id: GameObjectId) -> Option<GameObject<'_>> {
        self.game_objects
            .get(id)
            .map(|data| GameObject::new(self, id, data))
    }

    /// All GameObjects in creation order
    pub fn game_objects(&self) -> impl Iterator<Item = GameObject<'_>> + '_ {
        self.order.iter().filter_map(move |id| self.game_object(*id))
    }

    /// First GameObject with the given name
    pub fn find_game_object(&self, name: &str) -> Option<GameObjectId> {
        self.game_objects().find(|go| go.name() == name).map(|go| go.id())
    }

    /// Rename a GameObject
    pub fn set_game_object_name(&mut self, id: GameObjectId, name: impl Into<String>) -> Result<(), SceneError> {
        let data = self
            .game_objects
            .get_mut(id)
            .ok_or(SceneError::StaleGameObject(id))?;
        data.name = name.into();
        Ok(())
    }

    /// Set the layer tested against camera culling masks
    pub fn set_game_object_layer(&mut self, id: GameObjectId, layer: u32) -> Result<(), SceneError> {
        let data = self
            .game_objects
            .get_mut(id)
            .ok_or(SceneError::StaleGameObject(id))?;
        data.layer = layer;
        Ok(())
    }

    /// Activate or deactivate a GameObject and reconcile its components
    pub fn set_game_object_active(&mut self, id: GameObjectId, active: bool) -> Result<(), SceneError> {
        let data = self
            .game_objects
            .get_mut(id)
            .ok_or(SceneError::StaleGameObject(id))?;
        if data.active == active {
            return Ok(());
        }
        data.active = active;
        let components = data.components.clone();

        for component in components {
            self.reconcile(component);
        }
        Ok(())
    }

    /// Transform of a GameObject
    pub fn transform_of(&self, id: GameObjectId) -> Option<TransformId> {
        self.game_objects.get(id).map(|data| data.transform)
    }

    /// Parent one GameObject's transform under another's, or detach it
    pub fn set_parent(&mut self, child: GameObjectId, parent: Option<GameObjectId>) -> Result<(), SceneError> {
        let child_transform = self
            .transform_of(child)
            .ok_or(SceneError::StaleGameObject(child))?;
        let parent_transform = match parent {
            Some(parent) => Some(
                self.transform_of(parent)
                    .ok_or(SceneError::StaleGameObject(parent))?,
            ),
            None => None,
        };
        self.transforms.set_parent(child_transform, parent_transform)
    }

    /// All transforms
    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Mutable access to the transform hierarchy
    pub fn transforms_mut(&mut self) -> &mut Transforms {
        &mut self.transforms
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Attach a component to a GameObject
    ///
    /// The component is activated immediately when the scene is live and the
    /// GameObject active. Its `activated` hook may already destroy it, in
    /// which case the returned handle is stale.
    pub fn add_component<T: Component>(
        &mut self,
        game_object: GameObjectId,
        component: T,
    ) -> Result<ComponentHandle<T>, SceneError> {
        let data = self
            .game_objects
            .get(game_object)
            .ok_or(SceneError::StaleGameObject(game_object))?;
        if data.destroying {
            return Err(SceneError::GameObjectDestroyed(game_object));
        }

        let slot = ComponentSlot {
            owner: game_object,
            capabilities: component.capabilities(),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            state: ComponentState::Constructed,
            instance: Some(Box::new(component)),
            destroy_requested: false,
            destroying: false,
            announced: false,
        };
        let id = self.components.insert(slot);
        if let Some(data) = self.game_objects.get_mut(game_object) {
            data.components.push(id);
        }
        log::trace!("Added {} {:?} to {:?}", type_name::<T>(), id, game_object);

        self.reconcile(id);
        Ok(ComponentHandle::new(id))
    }

    /// Destroy a component
    ///
    /// Runs `deactivated` (if active) then `destroyed`, and publishes a
    /// `Removed` event if an `Added` was published. A component whose own
    /// hook is running finishes tearing down when that hook returns.
    pub fn destroy_component(&mut self, id: impl Into<ComponentId>) -> Result<(), SceneError> {
        let id = id.into();
        let slot = self
            .components
            .get_mut(id)
            .ok_or(SceneError::StaleComponent(id))?;
        if slot.destroying || slot.destroy_requested {
            return Ok(());
        }
        if slot.instance.is_none() {
            slot.destroy_requested = true;
            log::trace!("Deferred destroy of {} {:?}", slot.type_name, id);
            return Ok(());
        }

        self.finalize_component(id);
        Ok(())
    }

    /// Lifecycle state
    ///
    /// Ids that are gone, or whose destruction has been requested, report
    /// [`ComponentState::Destroyed`].
    pub fn component_state(&self, id: impl Into<ComponentId>) -> ComponentState {
        match self.components.get(id.into()) {
            Some(slot) if !slot.is_doomed() => slot.state,
            _ => ComponentState::Destroyed,
        }
    }

    /// Whether the id refers to a component in this scene
    pub fn contains_component(&self, id: impl Into<ComponentId>) -> bool {
        self.components.contains_key(id.into())
    }

    /// Number of components, including ones still tearing down
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Owning GameObject of a component
    pub fn component_owner(&self, id: impl Into<ComponentId>) -> Option<GameObjectId> {
        self.components.get(id.into()).map(|slot| slot.owner)
    }

    /// Capabilities of a component
    pub fn component_capabilities(&self, id: impl Into<ComponentId>) -> Option<Capabilities> {
        self.components.get(id.into()).map(|slot| slot.capabilities)
    }

    /// Concrete type name of a component
    pub fn component_type_name(&self, id: impl Into<ComponentId>) -> Option<&'static str> {
        self.components.get(id.into()).map(|slot| slot.type_name)
    }

    /// Borrow a component as a trait object
    ///
    /// Returns `None` while the component's own hook is running.
    pub fn component_dyn(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(id)?.instance.as_deref()
    }

    /// Borrow a component by typed handle
    ///
    /// Returns `None` for stale handles and while the component's own hook
    /// is running.
    pub fn component<T: Component>(&self, handle: ComponentHandle<T>) -> Option<&T> {
        let component: &dyn Component = self.components.get(handle.id())?.instance.as_deref()?;
        component.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow a component by typed handle
    pub fn component_mut<T: Component>(&mut self, handle: ComponentHandle<T>) -> Option<&mut T> {
        let component: &mut dyn Component = self.components.get_mut(handle.id())?.instance.as_deref_mut()?;
        component.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn component_type_is(&self, id: ComponentId, type_id: TypeId) -> bool {
        self.components
            .get(id)
            .is_some_and(|slot| slot.type_id == type_id && !slot.is_doomed())
    }

    /// Active renderable components in scene order
    ///
    /// Matches exactly the components announced on the event stream and not
    /// yet removed, so a listener can seed itself from this list.
    pub fn renderable_components(&self) -> Vec<ComponentId> {
        self.all_components()
            .into_iter()
            .filter(|id| {
                self.components
                    .get(*id)
                    .is_some_and(|slot| slot.announced && !slot.is_doomed())
            })
            .collect()
    }

    /// Active cameras in activation order
    pub fn cameras(&self) -> &[ComponentId] {
        &self.cameras
    }

    /// Subscribe to component `Added`/`Removed` notifications
    pub fn subscribe_component_events<F>(&mut self, callback: F) -> EventListener<ComponentEvent>
    where
        F: FnMut(&ComponentEvent) + 'static,
    {
        self.component_events.create_listener(callback)
    }

    /// Number of live component-event subscriptions
    pub fn component_listener_count(&self) -> usize {
        self.component_events.listener_count()
    }

    // ---------------------------------------------------------------------
    // Frame passes
    // ---------------------------------------------------------------------

    /// Call `update` on every active update-capable component
    ///
    /// Visits a snapshot taken at the start of the pass: components added
    /// during the pass wait for the next frame, and components destroyed
    /// during the pass are skipped.
    pub fn update(&mut self) {
        let pass: Vec<ComponentId> = self
            .all_components()
            .into_iter()
            .filter(|id| {
                self.components
                    .get(*id)
                    .is_some_and(|slot| slot.capabilities.contains(Capabilities::UPDATE))
            })
            .collect();

        for id in pass {
            if self.is_dispatchable(id) {
                self.dispatch(id, |component, ctx| component.update(ctx));
            }
        }
    }

    /// Let every active camera render the scene
    pub fn render(&mut self, uniforms: &mut FrameUniforms) {
        let cameras = self.cameras.clone();
        for id in cameras {
            if self.is_dispatchable(id) {
                self.dispatch(id, |component, ctx| component.render(ctx, uniforms));
            }
        }
    }

    /// Render one component into the current camera pass
    ///
    /// Returns whether the component was drawn.
    pub fn render_component(&mut self, id: ComponentId, uniforms: &mut FrameUniforms) -> bool {
        let renders = self
            .components
            .get(id)
            .is_some_and(|slot| slot.capabilities.contains(Capabilities::RENDER));
        if !renders || !self.is_dispatchable(id) {
            return false;
        }
        self.dispatch(id, |component, ctx| component.render(ctx, uniforms))
            .is_some()
    }

    // ---------------------------------------------------------------------
    // Factories
    // ---------------------------------------------------------------------

    /// Create a GameObject carrying a perspective camera
    pub fn create_perspective_camera(
        &mut self,
        name: impl Into<String>,
        fov_y_radians: f32,
        near: f32,
        far: f32,
    ) -> Result<(GameObjectId, ComponentHandle<Camera>), SceneError> {
        let go = self.create_game_object(name);
        let camera = self.add_component(go, Camera::perspective(fov_y_radians, near, far))?;
        Ok((go, camera))
    }

    /// Create a GameObject carrying an orthographic camera
    #[allow(clippy::too_many_arguments)]
    pub fn create_orthographic_camera(
        &mut self,
        name: impl Into<String>,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<(GameObjectId, ComponentHandle<Camera>), SceneError> {
        let go = self.create_game_object(name);
        let camera = self.add_component(go, Camera::orthographic(left, right, bottom, top, near, far))?;
        Ok((go, camera))
    }

    /// Create a GameObject carrying a line strip
    pub fn create_line(
        &mut self,
        name: impl Into<String>,
        points: Vec<Vec3>,
    ) -> Result<(GameObjectId, ComponentHandle<LineRenderer>), SceneError> {
        let go = self.create_game_object(name);
        let line = self.add_component(go, LineRenderer::new(points))?;
        Ok((go, line))
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn all_components(&self) -> Vec<ComponentId> {
        self.order
            .iter()
            .filter_map(|go| self.game_objects.get(*go))
            .flat_map(|data| data.components.iter().copied())
            .collect()
    }

    fn is_dispatchable(&self, id: ComponentId) -> bool {
        self.components.get(id).is_some_and(|slot| {
            slot.state == ComponentState::Active && slot.instance.is_some() && !slot.is_doomed()
        })
    }

    fn should_be_active(&self, owner: GameObjectId) -> bool {
        self.live && self.game_objects.get(owner).is_some_and(|data| data.active)
    }

    /// Bring a component's state in line with scene and GameObject flags
    fn reconcile(&mut self, id: ComponentId) {
        let Some(slot) = self.components.get(id) else {
            return;
        };
        // Checked-out components are reconciled when their hook returns
        if slot.destroying || slot.instance.is_none() {
            return;
        }

        match (slot.state, self.should_be_active(slot.owner)) {
            (ComponentState::Active, false) => self.deactivate(id),
            (ComponentState::Constructed | ComponentState::Inactive, true) => self.activate(id),
            _ => {}
        }
    }

    fn activate(&mut self, id: ComponentId) {
        let Some(slot) = self.components.get_mut(id) else {
            return;
        };
        slot.state = ComponentState::Active;
        if slot.capabilities.contains(Capabilities::CAMERA) {
            self.cameras.push(id);
        }

        self.dispatch(id, |component, ctx| component.activated(ctx));

        let announce = self.components.get(id).is_some_and(|slot| {
            slot.state == ComponentState::Active
                && !slot.destroying
                && !slot.announced
                && slot.capabilities.contains(Capabilities::RENDER)
        });
        if announce {
            self.publish(id, ComponentUpdateStatus::Added);
        }
    }

    fn deactivate(&mut self, id: ComponentId) {
        let Some(slot) = self.components.get_mut(id) else {
            return;
        };
        slot.state = ComponentState::Inactive;
        let announced = slot.announced;
        self.cameras.retain(|camera| *camera != id);

        // Withdrawn before the hook, so a hook that re-activates its
        // GameObject gets a fresh `Added`
        if announced {
            self.publish(id, ComponentUpdateStatus::Removed);
        }

        self.dispatch(id, |component, ctx| component.deactivated(ctx));
    }

    fn publish(&mut self, id: ComponentId, status: ComponentUpdateStatus) {
        let Some(slot) = self.components.get_mut(id) else {
            return;
        };
        slot.announced = status == ComponentUpdateStatus::Added;
        let event = ComponentEvent {
            component: id,
            game_object: slot.owner,
            status,
            capabilities: slot.capabilities,
            type_id: slot.type_id,
            type_name: slot.type_name,
        };
        self.component_events.notify(&event);
    }

    /// Run a hook with the component checked out of its slot
    ///
    /// Returns `None` if the component is missing or already checked out.
    fn dispatch<R>(
        &mut self,
        id: ComponentId,
        hook: impl FnOnce(&mut dyn Component, &mut ComponentContext<'_>) -> R,
    ) -> Option<R> {
        let owner = self.components.get(id)?.owner;
        let transform = self.game_objects.get(owner)?.transform;
        let mut instance = self.components.get_mut(id)?.instance.take()?;

        let result = {
            let mut ctx = ComponentContext {
                scene: self,
                component: id,
                game_object: owner,
                transform,
            };
            hook(instance.as_mut(), &mut ctx)
        };

        // Checked-out slots are never removed, only flagged
        let slot = self.components.get_mut(id)?;
        slot.instance = Some(instance);
        if slot.destroying {
            return Some(result);
        }
        if slot.destroy_requested {
            self.finalize_component(id);
        } else {
            self.reconcile(id);
        }
        Some(result)
    }

    fn finalize_component(&mut self, id: ComponentId) {
        let Some(slot) = self.components.get_mut(id) else {
            return;
        };
        slot.destroying = true;
        if slot.state == ComponentState::Active {
            self.deactivate(id);
        }

        self.dispatch(id, |component, ctx| component.destroyed(ctx));

        let Some(slot) = self.components.remove(id) else {
            return;
        };
        self.cameras.retain(|camera| *camera != id);
        if let Some(data) = self.game_objects.get_mut(slot.owner) {
            data.components.retain(|component| *component != id);
        }
        log::trace!("Destroyed {} {:?}", slot.type_name, id);

        let owner = slot.owner;
        drop(slot);
        self.remove_if_torn_down(owner);
    }

    /// Drop a destroying GameObject once its last component is gone
    fn remove_if_torn_down(&mut self, id: GameObjectId) {
        let ready = self
            .game_objects
            .get(id)
            .is_some_and(|data| data.destroying && data.components.is_empty());
        if !ready {
            return;
        }

        if let Some(data) = self.game_objects.remove(id) {
            self.transforms.remove(data.transform);
            self.order.retain(|go| *go != id);
            log::trace!("Destroyed GameObject {:?} '{}'", id, data.name);
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        log::debug!("Tearing down scene '{}'", self.name);
        for id in self.order.clone() {
            let _ = self.destroy_game_object(id);
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("live", &self.live)
            .field("game_objects", &self.order.len())
            .field("components", &self.components.len())
            .field("cameras", &self.cameras.len())
            .finish()
    }
}
