//! # Scene Engine
//!
//! A scene graph and component lifecycle engine.
//!
//! ## Features
//!
//! - **Hierarchical transforms**: lazily cached local and global matrices
//! - **Component model**: trait-object components with lifecycle hooks
//! - **Change events**: weakly held subscriptions that end when dropped
//! - **Camera dispatch**: incremental visible lists, culling masks, render order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct Spin;
//!
//! impl Component for Spin {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::UPDATE
//!     }
//!
//!     fn update(&mut self, ctx: &mut ComponentContext<'_>) {
//!         let id = ctx.transform();
//!         let turn = Quat::from_axis_angle(&Vec3::y_axis(), 0.01);
//!         if let Some(rotation) = ctx.transform_ref().map(|t| t.local_rotation()) {
//!             let _ = ctx.scene_mut().transforms_mut().set_local_rotation(id, turn * rotation);
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     engine.create_default_camera("camera")?;
//!     let scene = engine.active_scene_mut();
//!     let (cube, _) = scene.create_line("cube", vec![Vec3::zeros(), Vec3::x()])?;
//!     scene.add_component(cube, Spin)?;
//!     engine.frame();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, EngineConfig},
        events::{ComponentEvent, ComponentUpdateStatus, EventListener},
        foundation::{
            collections::{ComponentHandle, ComponentId, GameObjectId, TransformId},
            math::{Mat4, Pose, Quat, Vec2, Vec3, Vec4},
            time::Timer,
        },
        render::{Camera, FrameUniforms, LineRenderer, MeshRenderer, Projection},
        scene::{Capabilities, Component, ComponentContext, ComponentState, Scene, SceneError},
        Engine, EngineError,
    };
}
