//! Engine: owner of scenes and the per-frame driver state
//!
//! There is no global engine. The application owns an [`Engine`] and calls
//! [`Engine::frame`] (or `update` then `render`) once per frame.

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::foundation::collections::{ComponentHandle, GameObjectId};
use crate::foundation::math::{utils, Vec2, Vec4};
use crate::foundation::time::Timer;
use crate::render::{Camera, FrameUniforms};
use crate::scene::{Scene, SceneError};

/// Main engine struct
///
/// Exactly one scene is live at a time: the active one. Other scenes keep
/// their GameObjects but their components stay inactive.
pub struct Engine {
    scenes: Vec<Scene>,
    active_scene: usize,
    uniforms: FrameUniforms,
    timer: Timer,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with one empty, active scene
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine ({}x{} viewport)",
            config.viewport_width,
            config.viewport_height
        );

        let viewport = Vec2::new(config.viewport_width as f32, config.viewport_height as f32);
        let scene = Scene::new(config.default_scene_name.clone());
        let timer = match config.fixed_time_step {
            Some(step) => Timer::fixed(step),
            None => Timer::variable(),
        };

        Ok(Self {
            scenes: vec![scene],
            active_scene: 0,
            uniforms: FrameUniforms::new(viewport),
            timer,
            config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Add a scene and return its index; it stays inactive until selected
    pub fn create_scene(&mut self, name: impl Into<String>) -> usize {
        let mut scene = Scene::new(name);
        scene.set_live(false);
        log::info!("Created scene '{}'", scene.name());
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    /// Number of scenes
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Scene by index
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Mutable scene by index
    pub fn scene_mut(&mut self, index: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(index)
    }

    /// Index of the active scene
    pub fn active_scene_index(&self) -> usize {
        self.active_scene
    }

    /// The scene being updated and rendered
    pub fn active_scene(&self) -> &Scene {
        &self.scenes[self.active_scene]
    }

    /// Mutable access to the active scene
    pub fn active_scene_mut(&mut self) -> &mut Scene {
        &mut self.scenes[self.active_scene]
    }

    /// Switch the active scene, deactivating the previous one
    pub fn set_active_scene(&mut self, index: usize) -> Result<(), EngineError> {
        if index >= self.scenes.len() {
            return Err(EngineError::SceneIndexOutOfRange {
                index,
                count: self.scenes.len(),
            });
        }
        if index == self.active_scene {
            return Ok(());
        }

        self.scenes[self.active_scene].set_live(false);
        self.active_scene = index;
        self.scenes[index].set_live(true);
        log::info!("Active scene is now '{}'", self.scenes[index].name());
        Ok(())
    }

    /// Resize the render target
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        log::debug!("Viewport resized to {}x{}", width, height);
        self.uniforms.viewport_dimension = Vec2::new(width as f32, height as f32);
    }

    /// Add a perspective camera to the active scene using the configured
    /// defaults
    pub fn create_default_camera(
        &mut self,
        name: impl Into<String>,
    ) -> Result<(GameObjectId, ComponentHandle<Camera>), EngineError> {
        let defaults = self.config.camera.clone();
        let scene = self.active_scene_mut();
        let (go, handle) = scene.create_perspective_camera(
            name,
            utils::deg_to_rad(defaults.fov_y_degrees),
            defaults.near,
            defaults.far,
        )?;
        if let Some(camera) = scene.component_mut(handle) {
            camera.set_clear_color(Vec4::from(defaults.clear_color));
        }
        Ok((go, handle))
    }

    /// Advance time and update the active scene
    pub fn update(&mut self) {
        self.timer.tick();
        self.scenes[self.active_scene].update();
    }

    /// Render the active scene into fresh frame uniforms
    pub fn render(&mut self) {
        let time = self.timer.current();
        self.uniforms.begin_frame(time.frame, time.delta);
        self.scenes[self.active_scene].render(&mut self.uniforms);
    }

    /// One full frame: update then render
    pub fn frame(&mut self) {
        self.update();
        self.render();
    }

    /// Uniforms and render queue of the last rendered frame
    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// Frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scene operation was rejected
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// No scene exists at the index
    #[error("Scene index {index} out of range ({count} scenes)")]
    SceneIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of scenes
        count: usize,
    },
}
