//! GameObjects: named containers of components with one transform each

use std::any::TypeId;

use crate::foundation::collections::{ComponentHandle, ComponentId, GameObjectId, TransformId};

use super::component::Component;
use super::scene::Scene;
use super::transform::TransformRef;

/// Layer assigned to new GameObjects
pub const DEFAULT_LAYER: u32 = 1;

/// Storage record for a GameObject
#[derive(Debug)]
pub(crate) struct GameObjectData {
    pub(crate) name: String,
    pub(crate) transform: TransformId,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) active: bool,
    pub(crate) layer: u32,
    /// Set once destruction starts; the record lives on until every
    /// component has finished tearing down
    pub(crate) destroying: bool,
}

impl GameObjectData {
    pub(crate) fn new(name: String, transform: TransformId) -> Self {
        Self {
            name,
            transform,
            components: Vec::new(),
            active: true,
            layer: DEFAULT_LAYER,
            destroying: false,
        }
    }
}

/// Read-only view of a GameObject
///
/// Obtained from [`Scene::game_object`]. Component queries read the current
/// component list, so they reflect additions and removals made earlier in the
/// same frame.
#[derive(Clone, Copy)]
pub struct GameObject<'a> {
    scene: &'a Scene,
    id: GameObjectId,
    data: &'a GameObjectData,
}

impl<'a> GameObject<'a> {
    pub(crate) fn new(scene: &'a Scene, id: GameObjectId, data: &'a GameObjectData) -> Self {
        Self { scene, id, data }
    }

    /// Stable id
    pub fn id(&self) -> GameObjectId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    /// Transform id, valid for the GameObject's lifetime
    pub fn transform(&self) -> TransformId {
        self.data.transform
    }

    /// Read the transform
    pub fn transform_ref(&self) -> Option<TransformRef<'a>> {
        self.scene.transforms().get(self.data.transform)
    }

    /// Layer bit tested against camera culling masks
    pub fn layer(&self) -> u32 {
        self.data.layer
    }

    /// Own active flag
    pub fn is_active(&self) -> bool {
        self.data.active
    }

    /// Whether destruction has started
    pub fn is_destroying(&self) -> bool {
        self.data.destroying
    }

    /// Components in insertion order
    pub fn component_ids(&self) -> &'a [ComponentId] {
        &self.data.components
    }

    /// First component of concrete type `T`
    pub fn get_component<T: Component>(&self) -> Option<ComponentHandle<T>> {
        let type_id = TypeId::of::<T>();
        self.data
            .components
            .iter()
            .copied()
            .find(|id| self.scene.component_type_is(*id, type_id))
            .map(ComponentHandle::new)
    }

    /// All components of concrete type `T`, in insertion order
    pub fn get_components<T: Component>(&self) -> Vec<ComponentHandle<T>> {
        let type_id = TypeId::of::<T>();
        self.data
            .components
            .iter()
            .copied()
            .filter(|id| self.scene.component_type_is(*id, type_id))
            .map(ComponentHandle::new)
            .collect()
    }
}

impl std::fmt::Debug for GameObject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("name", &self.data.name)
            .field("active", &self.data.active)
            .field("layer", &self.data.layer)
            .field("components", &self.data.components.len())
            .finish()
    }
}
