//! Stable handles for arena-stored scene data

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Handle to a GameObject owned by a [`Scene`](crate::scene::Scene)
    pub struct GameObjectId;

    /// Handle to a component owned by a GameObject
    pub struct ComponentId;

    /// Handle to a transform node in the scene's transform arena
    pub struct TransformId;
}

/// Typed handle for type-safe component references
///
/// Carries the concrete component type so lookups can downcast without the
/// caller repeating the type. Stale handles simply resolve to `None`.
pub struct ComponentHandle<T> {
    id: ComponentId,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> ComponentHandle<T> {
    /// Wrap an untyped id
    pub(crate) fn new(id: ComponentId) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying untyped id
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

// Manual impls: the derives would add bounds on `T`.
impl<T> Clone for ComponentHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentHandle<T> {}

impl<T> PartialEq for ComponentHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ComponentHandle<T> {}

impl<T> Hash for ComponentHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for ComponentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentHandle")
            .field(&std::any::type_name::<T>())
            .field(&self.id)
            .finish()
    }
}

impl<T> From<ComponentHandle<T>> for ComponentId {
    fn from(handle: ComponentHandle<T>) -> Self {
        handle.id
    }
}
