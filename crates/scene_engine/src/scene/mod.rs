//! Scene graph and component lifecycle
//!
//! A [`Scene`] owns three arenas:
//!
//! ```text
//! Scene
//!  ├─ GameObjects  (name, layer, active flag, component list)
//!  ├─ Components   (boxed behaviour, lifecycle state, capabilities)
//!  └─ Transforms   (local pose, parent/children, cached matrices)
//! ```
//!
//! Everything is addressed by generational ids, so a destroyed object can
//! never be reached through a stale id.

mod component;
mod error;
mod game_object;
#[allow(clippy::module_inception)]
mod scene;
mod transform;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Capabilities, Component, ComponentContext, ComponentState};
pub use error::SceneError;
pub use game_object::{GameObject, DEFAULT_LAYER};
pub use scene::Scene;
pub use transform::{TransformRef, Transforms};
