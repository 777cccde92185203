//! Orbit demo application
//!
//! Runs a small solar system headless on a stepped clock and prints the
//! session statistics.
//!
//! ```text
//! orbit_demo [config.toml|config.ron] [seconds]
//! ```

use std::f32::consts::TAU;

use tempo_engine::core::ConfigError;
use tempo_engine::foundation::logging;
use tempo_engine::prelude::*;
use thiserror::Error;

/// Simulated run time when none is given on the command line
const DEFAULT_SECONDS: f64 = 5.0;

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid duration '{0}'")]
    Duration(String),
}

/// Body circling its parent
struct Orbiter {
    name: &'static str,
    radius: f32,
    speed: f32,
    angle: f32,
    size: f32,
    depth: i32,
    moons: u32,
}

impl Orbiter {
    fn new(name: &'static str, radius: f32, speed: f32, depth: i32) -> Self {
        Self {
            name,
            radius,
            speed,
            angle: 0.0,
            size: 0.1,
            depth,
            moons: 0,
        }
    }

    fn with_moons(mut self, moons: u32) -> Self {
        self.moons = moons;
        self
    }
}

impl Node for Orbiter {
    fn init(&mut self, ctx: &mut NodeContext<'_>) -> Result<(), SceneError> {
        for index in 0..self.moons {
            let mut moon = Orbiter::new("moon", 0.3 + 0.15 * index as f32, 4.0, 0);
            moon.size = 0.03;
            moon.angle = TAU * index as f32 / self.moons as f32;
            ctx.spawn(moon)?;
        }
        log::debug!("{} joined with {} moons", self.name, self.moons);
        Ok(())
    }

    fn update(&mut self, ctx: &mut NodeContext<'_>, delta: f32) -> Result<(), SceneError> {
        self.angle = (self.angle + self.speed * delta) % TAU;
        if let Some(transform) = ctx.transform_mut() {
            transform.position = Vec3::new(
                self.radius * self.angle.cos(),
                self.radius * self.angle.sin(),
                0.0,
            );
        }
        Ok(())
    }

    fn render(
        &mut self,
        ctx: &mut NodeContext<'_>,
        _delta: f32,
        frame: &mut Frame<'_>,
    ) -> Result<(), SceneError> {
        let Some(world) = ctx.world_transform() else {
            return Ok(());
        };
        let center = Vec2::new(world.position.x, world.position.y);
        shapes::fill_polygon(frame.batcher, &disc(self.size, 12), center, Color::WHITE);
        Ok(())
    }

    fn depth(&self) -> Option<i32> {
        Some(self.depth)
    }
}

/// Node that burns up after a fixed number of updates
struct Comet {
    lifetime: u32,
}

impl Node for Comet {
    fn update(&mut self, ctx: &mut NodeContext<'_>, delta: f32) -> Result<(), SceneError> {
        if let Some(transform) = ctx.transform_mut() {
            transform.translate(Vec3::new(-delta, delta * 0.5, 0.0));
        }
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            ctx.destroy();
        }
        Ok(())
    }

    fn render(
        &mut self,
        ctx: &mut NodeContext<'_>,
        _delta: f32,
        frame: &mut Frame<'_>,
    ) -> Result<(), SceneError> {
        if let Some(world) = ctx.world_transform() {
            let tail = [Vec2::new(0.0, 0.0), Vec2::new(0.2, -0.05), Vec2::new(0.2, 0.05)];
            let head = Vec2::new(world.position.x, world.position.y);
            shapes::trace_polygon(frame.batcher, &tail, head, Color::rgba(0.6, 0.8, 1.0, 1.0));
        }
        Ok(())
    }

    fn on_destroy(&mut self) {
        log::info!("Comet burned up");
    }
}

/// Light contributing one additive pass over the solar system
struct Sunlight {
    color: Color,
    passes: u64,
}

impl Component for Sunlight {
    fn enter(&mut self, _device: &mut dyn RenderDevice) -> Result<(), SceneError> {
        self.passes += 1;
        log::trace!("Sunlight pass {} ({:?})", self.passes, self.color);
        Ok(())
    }

    fn dispose(&mut self) {
        log::debug!("Sunlight rendered {} passes", self.passes);
    }
}

fn disc(radius: f32, segments: u32) -> Vec<Vec2> {
    (0..segments)
        .map(|segment| {
            let angle = TAU * segment as f32 / segments as f32;
            Vec2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

struct OrbitApp {
    scene: Scene,
    updates_left: u64,
}

impl OrbitApp {
    fn new(seconds: f64, target_ups: u32) -> Self {
        Self {
            scene: Scene::new(),
            updates_left: (seconds * f64::from(target_ups)).round() as u64,
        }
    }
}

impl Application for OrbitApp {
    fn init(&mut self, session: &mut Session) -> Result<(), AppError> {
        log::info!("Building solar system for a {}x{} view", session.width(), session.height());
        self.scene.init()?;

        let sun = self.scene.spawn(Group)?;
        let tree = self.scene.tree_mut();
        tree.add_component(
            sun,
            Sunlight {
                color: Color::rgba(1.0, 0.9, 0.6, 1.0),
                passes: 0,
            },
        )?;
        tree.add_component(
            sun,
            Sunlight {
                color: Color::rgba(0.2, 0.2, 0.5, 1.0),
                passes: 0,
            },
        )?;

        tree.spawn(sun, Orbiter::new("inner", 1.0, 1.5, 1))?;
        tree.spawn(sun, Orbiter::new("giant", 3.0, 0.4, 3).with_moons(2))?;
        tree.spawn(sun, Orbiter::new("outer", 5.0, 0.2, 2).with_moons(1))?;

        let comet = self.scene.spawn(Comet { lifetime: 90 })?;
        if let Some(transform) = self.scene.tree_mut().transform_mut(comet) {
            transform.position = Vec3::new(6.0, -2.0, 0.0);
        }
        Ok(())
    }

    fn update(&mut self, session: &mut Session, delta: f32) -> Result<(), AppError> {
        self.scene.update(delta)?;
        self.updates_left = self.updates_left.saturating_sub(1);
        if self.updates_left == 0 {
            session.end();
        }
        Ok(())
    }

    fn render(
        &mut self,
        _session: &mut Session,
        delta: f32,
        frame: &mut Frame<'_>,
    ) -> Result<(), AppError> {
        self.scene.render(delta, frame)?;
        frame.batcher.flush();
        Ok(())
    }

    fn dispose(&mut self, _session: &mut Session) {
        log::info!("Scene held {} nodes at shutdown", self.scene.tree().len());
        self.scene.dispose();
    }
}

fn main() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => ApplicationConfig::load_from_file(&path)?,
        None => ApplicationConfig::new("Orbit"),
    };
    let seconds = match args.next() {
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|value| *value > 0.0)
            .ok_or(DemoError::Duration(raw))?,
        None => DEFAULT_SECONDS,
    };

    logging::init_with_level(&config.engine.log_level);
    log::info!("Starting orbit demo for {} simulated seconds", seconds);

    let target_ups = config.timing.target_ups;
    let platform = Platform::headless(
        config.window.width,
        config.window.height,
        SteppedClock::new(1.0 / f64::from(target_ups)),
    );
    let mut app = OrbitApp::new(seconds, target_ups);

    let stats = Engine::run_app(config, platform, &mut app)?;

    println!("updates:  {}", stats.total_updates);
    println!("frames:   {}", stats.total_frames);
    println!("ups/fps:  {}/{}", stats.ups, stats.fps);
    println!("simulated {:.2}s", stats.elapsed_seconds);
    Ok(())
}
