//! Fixed-timestep loop driver
//!
//! The [`Engine`] owns the host collaborators and runs one session of an
//! [`Application`]: setup, `init`, then repeated catch-up updates followed by
//! a single render per loop iteration, and finally teardown.

use std::fmt;

use thiserror::Error;

use crate::application::{AppError, Application};
use crate::core::{ApplicationConfig, Config, ConfigError, ErrorMode};
use crate::foundation::time::{FixedTimestep, RateCounter};
use crate::platform::{ClearFlags, CollaboratorError, Platform};
use crate::render::Frame;
use crate::session::{Session, SessionStats};

/// Lifecycle of the loop driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, not yet run
    Idle,
    /// Inside [`Engine::run`]
    Running,
    /// The run finished; the driver cannot be started again
    Stopped,
}

/// Point in the loop where a fatal error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The `init` hook
    Init,
    /// An update step
    Update,
    /// Rendering a frame, including the device error check
    Render,
    /// Resize notification
    Resize,
    /// Presenting the frame
    Present,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Update => "update",
            Self::Render => "render",
            Self::Resize => "resize",
            Self::Present => "present",
        };
        f.write_str(name)
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// [`Engine::run`] was called on a driver that is not idle
    #[error("The loop driver has already been started")]
    AlreadyStarted,

    /// Configuration rejected before the session started
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// The display could not be set up
    #[error("Engine initialization failed: {0}")]
    Initialization(#[source] CollaboratorError),

    /// A failure ended the session
    #[error("Fatal {stage} error: {source}")]
    Fatal {
        /// Where the error surfaced
        stage: Stage,
        /// The error itself
        #[source]
        source: AppError,
    },
}

/// Main loop driver
///
/// Runs exactly one session. To run again, build a new engine, for example
/// from [`Engine::into_platform`] and the target rate reported in the
/// returned [`SessionStats`].
pub struct Engine {
    config: ApplicationConfig,
    platform: Platform,
    state: LoopState,
}

impl Engine {
    /// Create an idle driver
    pub fn new(config: ApplicationConfig, platform: Platform) -> Self {
        Self {
            config,
            platform,
            state: LoopState::Idle,
        }
    }

    /// Create a driver and run `app` to completion
    pub fn run_app<A: Application>(
        config: ApplicationConfig,
        platform: Platform,
        app: &mut A,
    ) -> Result<SessionStats, EngineError> {
        Self::new(config, platform).run(app)
    }

    /// Current lifecycle state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Configuration of this driver
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Host collaborators
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Host collaborators, mutably
    pub fn platform_mut(&mut self) -> &mut Platform {
        &mut self.platform
    }

    /// Release the collaborators for reuse by another driver
    pub fn into_platform(self) -> Platform {
        self.platform
    }

    /// Run `app` until it ends the session, the display asks to close or a
    /// fatal error occurs.
    ///
    /// Teardown (batcher dispose, the `dispose` hook, display destroy) runs
    /// whenever the display was created, also when the session failed.
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<SessionStats, EngineError> {
        if self.state != LoopState::Idle {
            return Err(EngineError::AlreadyStarted);
        }
        self.config.validate()?;

        let timing = self.config.timing.clone();
        let mut session = Session::new(
            timing.target_ups,
            self.config.engine.error_mode,
            self.config.window.width,
            self.config.window.height,
        );

        self.state = LoopState::Running;
        log::info!(
            "Starting session '{}': {} UPS, at most {} catch-up steps per frame",
            self.config.window.title,
            timing.target_ups,
            timing.max_frame_skips
        );

        if let Err(error) = self.create_display() {
            log::error!("Display setup failed: {}", error);
            self.state = LoopState::Stopped;
            return Err(EngineError::Initialization(error));
        }
        session.set_size(self.platform.display.width(), self.platform.display.height());
        session.begin();

        let result = self.run_loop(app, &mut session);
        self.teardown(app, &mut session);
        self.state = LoopState::Stopped;

        result.map(|elapsed| session.stats(elapsed))
    }

    fn create_display(&mut self) -> Result<(), CollaboratorError> {
        self.platform.display.create()?;
        self.platform.display.show()
    }

    fn run_loop<A: Application>(&mut self, app: &mut A, session: &mut Session) -> Result<f64, EngineError> {
        let mode = session.error_mode();
        settle(Stage::Init, app.init(session), mode)?;

        let Platform {
            display,
            input,
            device,
            batcher,
            clock,
        } = &mut self.platform;

        let timing = &self.config.timing;
        let mut timestep = FixedTimestep::new(timing.target_ups, timing.max_frame_skips);
        let delta = timestep.seconds_per_step() as f32;
        let start = clock.now();
        let mut previous = start;
        let mut ups = RateCounter::new(previous);
        let mut fps = RateCounter::new(previous);

        loop {
            let current = clock.now();
            let elapsed = current - previous;
            timestep.accumulate(elapsed);

            while timestep.next_step() {
                input.start_event_frame();
                let updated = app.update(session, delta);
                input.clear_event_frame();
                ups.tick();
                session.record_update();
                settle(Stage::Update, updated, mode)?;
            }
            let discarded = timestep.finish_iteration();
            if discarded > 0.0 {
                log::debug!("Discarded {:.4}s of lag past the catch-up bound", discarded);
            }

            if !session.is_running() {
                log::info!("Leaving loop: end requested");
                return Ok(current - start);
            }
            if display.is_close_requested() {
                log::info!("Leaving loop: display close requested");
                return Ok(current - start);
            }

            if display.was_resized() {
                let (width, height) = (display.width(), display.height());
                log::info!("Display resized to {}x{}", width, height);
                session.set_size(width, height);
                let resized = app.resize(session, width, height);
                device.set_viewport(0, 0, width, height);
                settle(Stage::Resize, resized, mode)?;
            }

            device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
            device.set_active_texture_unit(0);
            let rendered = {
                let mut frame = Frame::new(&mut **batcher, &mut **device);
                app.render(session, elapsed as f32, &mut frame)
            };
            settle(Stage::Render, rendered, mode)?;
            settle(Stage::Render, device.check_error().map_err(AppError::from), mode)?;
            fps.tick();
            session.record_frame();

            if let Some(sampled_ups) = ups.sample(current) {
                let sampled_fps = fps.sample(current).unwrap_or_else(|| fps.rate());
                session.set_rates(sampled_ups, sampled_fps);
                log::trace!("UPS {} FPS {}", sampled_ups, sampled_fps);
            }

            previous = current;
            settle(Stage::Present, display.update().map_err(AppError::from), mode)?;
        }
    }

    fn teardown<A: Application>(&mut self, app: &mut A, session: &mut Session) {
        session.finish();
        self.platform.batcher.dispose();
        app.dispose(session);
        self.platform.display.destroy();
        log::info!(
            "Session stopped after {} updates and {} frames",
            session.total_updates(),
            session.total_frames()
        );
    }
}

/// Apply the error policy to the outcome of one hook or collaborator call
fn settle(stage: Stage, result: Result<(), AppError>, mode: ErrorMode) -> Result<(), EngineError> {
    match result {
        Ok(()) => Ok(()),
        Err(error) if error.is_collaborator() && !mode.escalates_collaborator_errors() => {
            log::warn!("Ignoring {} error: {}", stage, error);
            Ok(())
        }
        Err(error) => {
            log::error!("Fatal {} error: {}", stage, error);
            Err(EngineError::Fatal { stage, source: error })
        }
    }
}
