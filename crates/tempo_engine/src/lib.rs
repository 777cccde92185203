//! # Tempo Engine
//!
//! Runtime core for real-time simulations: a fixed-timestep loop driver and a
//! hierarchical scene graph.
//!
//! ## Features
//!
//! - **Fixed-Timestep Loop**: Catch-up updates bounded by a max-skip limit, one render per iteration
//! - **Scene Graph**: Single-parent node tree that tolerates changes during its own traversal
//! - **Component Passes**: Per-component additive render passes over a subtree
//! - **Depth Ordering**: Stable sibling ordering for depth-bearing nodes
//! - **Headless Collaborators**: Run sessions without a window for tools and tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tempo_engine::prelude::*;
//!
//! struct Countdown {
//!     remaining: u32,
//! }
//!
//! impl Application for Countdown {
//!     fn update(&mut self, session: &mut Session, _delta: f32) -> Result<(), AppError> {
//!         self.remaining = self.remaining.saturating_sub(1);
//!         if self.remaining == 0 {
//!             session.end();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::new("Countdown");
//!     let platform = Platform::headless(800, 600, SystemClock::new());
//!     let stats = Engine::run_app(config, platform, &mut Countdown { remaining: 120 })?;
//!     println!("{} updates", stats.total_updates);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;
pub mod platform;
pub mod render;
pub mod scene;

mod application;
mod engine;
mod session;


pub use application::{AppError, Application};
pub use engine::{Engine, EngineError, LoopState, Stage};
pub use session::{Session, SessionStats};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, Application, Engine, EngineError, LoopState, Session, SessionStats,
        core::{ApplicationConfig, Config, EngineConfig, ErrorMode, TimingConfig, WindowConfig},
        foundation::{
            math::{Quat, Transform, Vec2, Vec3},
            time::{ManualClock, SteppedClock, SystemClock, TimeSource},
        },
        platform::{Batcher, Color, CollaboratorError, Platform, Primitive, RenderDevice, RenderState},
        render::{shapes, Frame},
        scene::{
            Component, ComponentId, Group, Node, NodeContext, NodeId, NodeKey, Scene, SceneError,
            SceneTree, StructureError,
        },
    };
}
