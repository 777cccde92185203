//! Per-run loop context
//!
//! A [`Session`] is created when the loop driver starts and handed to every
//! application hook. It carries the running flag, the sampled UPS/FPS figures
//! and the target update rate for one run.

use crate::core::ErrorMode;

/// State shared between the loop driver and the application during one run
#[derive(Debug, Clone)]
pub struct Session {
    running: bool,
    ups: u32,
    fps: u32,
    target_ups: u32,
    seconds_per_step: f64,
    error_mode: ErrorMode,
    total_updates: u64,
    total_frames: u64,
    width: u32,
    height: u32,
}

impl Session {
    pub(crate) fn new(target_ups: u32, error_mode: ErrorMode, width: u32, height: u32) -> Self {
        Self {
            running: false,
            ups: 0,
            fps: 0,
            target_ups,
            seconds_per_step: 1.0 / f64::from(target_ups.max(1)),
            error_mode,
            total_updates: 0,
            total_frames: 0,
            width,
            height,
        }
    }

    /// Updates performed during the last full second
    pub fn ups(&self) -> u32 {
        self.ups
    }

    /// Frames rendered during the last full second
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Target update rate for the next run.
    ///
    /// The running loop keeps the step size it latched at start, see
    /// [`seconds_per_step`](Self::seconds_per_step).
    pub fn target_ups(&self) -> u32 {
        self.target_ups
    }

    /// Change the target update rate. Takes effect on the next run.
    pub fn set_target_ups(&mut self, ups: u32) {
        if ups == 0 {
            log::warn!("Ignoring target UPS of 0");
            return;
        }
        self.target_ups = ups;
    }

    /// Duration of one update step, fixed for the whole run
    pub fn seconds_per_step(&self) -> f64 {
        self.seconds_per_step
    }

    /// Whether the loop is running and no end was requested
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ask the loop to stop.
    ///
    /// The loop exits at its next check; the update or render in progress
    /// always completes.
    pub fn end(&mut self) {
        if self.running {
            log::info!("Session end requested");
        }
        self.running = false;
    }

    /// Collaborator error policy of this run
    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Update steps performed since the run started
    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }

    /// Frames rendered since the run started
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Current display width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current display height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn begin(&mut self) {
        self.running = true;
    }

    pub(crate) fn finish(&mut self) {
        self.running = false;
    }

    pub(crate) fn record_update(&mut self) {
        self.total_updates += 1;
    }

    pub(crate) fn record_frame(&mut self) {
        self.total_frames += 1;
    }

    pub(crate) fn set_rates(&mut self, ups: u32, fps: u32) {
        self.ups = ups;
        self.fps = fps;
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn stats(&self, elapsed_seconds: f64) -> SessionStats {
        SessionStats {
            ups: self.ups,
            fps: self.fps,
            target_ups: self.target_ups,
            total_updates: self.total_updates,
            total_frames: self.total_frames,
            elapsed_seconds,
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStats {
    /// Last sampled updates per second
    pub ups: u32,
    /// Last sampled frames per second
    pub fps: u32,
    /// Target update rate requested for the next run
    pub target_ups: u32,
    /// Update steps performed
    pub total_updates: u64,
    /// Frames rendered
    pub total_frames: u64,
    /// Clock time between loop start and loop exit, in seconds
    pub elapsed_seconds: f64,
}
