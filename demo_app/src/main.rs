//! Headless scene demo
//!
//! Builds a small scene (a camera orbiting a spinning set of axes and a
//! short-lived trail of line segments) and drives it for a fixed number of
//! frames, logging what each camera pass submitted.
//!
//! Usage: `scene_demo [config.toml|config.ron] [frames]`

use scene_engine::config::Config;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_engine::render::LineTopology;
use thiserror::Error;

const DEFAULT_FRAMES: u64 = 120;

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Invalid frame count '{0}'")]
    FrameCount(String),
}

/// Spins its GameObject about Y at a fixed rate per frame
struct Spinner {
    radians_per_frame: f32,
}

impl Component for Spinner {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let id = ctx.transform();
        let Some(rotation) = ctx.transform_ref().map(|t| t.local_rotation()) else {
            return;
        };
        let step = Quat::from_axis_angle(&Vec3::y_axis(), self.radians_per_frame);
        if let Err(err) = ctx.scene_mut().transforms_mut().set_local_rotation(id, step * rotation) {
            log::warn!("Spinner lost its transform: {}", err);
        }
    }
}

/// Circles its GameObject around the origin while facing it
struct Orbit {
    radius: f32,
    height: f32,
    angle: f32,
    speed: f32,
}

impl Component for Orbit {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        self.angle += self.speed;
        let id = ctx.transform();
        let position = Vec3::new(self.radius * self.angle.cos(), self.height, self.radius * self.angle.sin());

        let transforms = ctx.scene_mut().transforms_mut();
        let result = transforms
            .set_position(id, position)
            .and_then(|()| transforms.look_at_point(id, Vec3::zeros(), Vec3::y()));
        if let Err(err) = result {
            log::warn!("Orbit update failed: {}", err);
        }
    }
}

/// Drops a line segment behind its GameObject every few frames; each
/// segment destroys itself after a while
struct TrailEmitter {
    every: u32,
    lifetime: u32,
    frame: u32,
}

impl Component for TrailEmitter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        self.frame += 1;
        if self.frame % self.every != 0 {
            return;
        }
        let Some(position) = ctx.transform_ref().map(|t| t.position()) else {
            return;
        };

        let lifetime = self.lifetime;
        let scene = ctx.scene_mut();
        let spawned = scene
            .create_line(format!("trail {}", self.frame), vec![position, position + Vec3::y() * 0.25])
            .and_then(|(go, _)| scene.add_component(go, Expire { frames_left: lifetime }));
        if let Err(err) = spawned {
            log::warn!("Failed to spawn trail segment: {}", err);
        }
    }
}

/// Destroys its GameObject after a number of frames
struct Expire {
    frames_left: u32,
}

impl Component for Expire {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            let go = ctx.game_object();
            if let Err(err) = ctx.scene_mut().destroy_game_object(go) {
                log::warn!("Trail segment cleanup failed: {}", err);
            }
        }
    }
}

fn build_scene(engine: &mut Engine) -> Result<(), DemoError> {
    let (camera_go, _) = engine.create_default_camera("Main Camera")?;
    let scene = engine.active_scene_mut();
    scene.add_component(
        camera_go,
        Orbit {
            radius: 8.0,
            height: 3.0,
            angle: 0.0,
            speed: 0.02,
        },
    )?;

    let (axes, lines) = scene.create_line(
        "Axes",
        vec![
            Vec3::zeros(),
            Vec3::x(),
            Vec3::zeros(),
            Vec3::y(),
            Vec3::zeros(),
            Vec3::z(),
        ],
    )?;
    if let Some(line) = scene.component_mut(lines) {
        line.set_color(Vec4::new(1.0, 0.8, 0.2, 1.0));
    }
    scene.add_component(axes, Spinner { radians_per_frame: 0.05 })?;

    let (ring, ring_lines) = scene.create_line("Ring", Vec::new())?;
    scene.set_parent(ring, Some(axes))?;
    if let Some(line) = scene.component_mut(ring_lines) {
        let points = (0..32)
            .map(|i| {
                let a = i as f32 / 32.0 * std::f32::consts::TAU;
                Vec3::new(2.0 * a.cos(), 0.0, 2.0 * a.sin())
            })
            .collect();
        line.set_points(points, LineTopology::LineStrip, Vec::new());
        line.set_render_order(1);
    }

    let emitter = scene.create_game_object("Emitter");
    scene.set_parent(emitter, Some(ring))?;
    let emitter_t = scene.transform_of(emitter).ok_or(SceneError::StaleGameObject(emitter))?;
    scene.transforms_mut().set_local_position(emitter_t, Vec3::new(2.0, 0.0, 0.0))?;
    scene.add_component(
        emitter,
        TrailEmitter {
            every: 10,
            lifetime: 30,
            frame: 0,
        },
    )?;

    log::info!("Built scene with {} GameObjects", scene.game_object_count());
    Ok(())
}

fn run() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load_from_file(&path).map_err(EngineError::from)?,
        None => EngineConfig::default(),
    };
    let frames = match args.next() {
        Some(arg) => arg.parse::<u64>().map_err(|_| DemoError::FrameCount(arg))?,
        None => DEFAULT_FRAMES,
    };

    logging::init_with_filter(&config.log_level);
    log::info!("Starting scene demo for {} frames", frames);

    let mut engine = Engine::new(config)?;
    build_scene(&mut engine)?;

    for _ in 0..frames {
        engine.frame();
        let uniforms = engine.uniforms();
        if uniforms.frame % 30 == 0 {
            for pass in uniforms.render_queue.passes() {
                log::info!(
                    "frame {}: camera {:?} drew {} commands into {}x{}",
                    uniforms.frame,
                    pass.camera,
                    pass.command_count(),
                    pass.viewport.width,
                    pass.viewport.height
                );
            }
        }
    }

    let scene = engine.active_scene();
    log::info!(
        "Finished: {} GameObjects, {} components, {} renderables",
        scene.game_object_count(),
        scene.component_count(),
        scene.renderable_components().len()
    );
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        log::error!("Scene demo failed: {}", err);
        eprintln!("Scene demo failed: {err}");
        std::process::exit(1);
    }
}
