//! Scene-level errors

use crate::foundation::collections::{ComponentId, GameObjectId, TransformId};
use thiserror::Error;

/// Errors reported by scene-graph operations
///
/// Every variant describes a caller logic error. The failing operation has
/// no effect on the scene.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The GameObject was destroyed or never belonged to this scene
    #[error("GameObject {0:?} does not exist in this scene")]
    StaleGameObject(GameObjectId),

    /// The GameObject is being torn down and accepts no new components
    #[error("GameObject {0:?} is being destroyed")]
    GameObjectDestroyed(GameObjectId),

    /// The component was destroyed or never belonged to this scene
    #[error("Component {0:?} does not exist in this scene")]
    StaleComponent(ComponentId),

    /// The transform was removed or never belonged to this scene
    #[error("Transform {0:?} does not exist in this scene")]
    StaleTransform(TransformId),

    /// Reparenting would make a transform its own ancestor
    #[error("Cannot parent transform {child:?} under {parent:?}: it would create a cycle")]
    CyclicParent {
        /// Transform being reparented
        child: TransformId,
        /// Rejected parent
        parent: TransformId,
    },

    /// `look_at` direction is zero or parallel to the up vector
    #[error("look_at from {0:?} is degenerate: target coincides or forward is parallel to up")]
    DegenerateLookAt(TransformId),
}
