//! Headless collaborators
//!
//! Windowless stand-ins so a session can run in tools, servers and tests.

use super::{
    Batcher, BlendMode, ClearFlags, CollaboratorError, Color, DepthFunc, Display, InputDevices,
    Primitive, RenderDevice, RenderState,
};
use crate::foundation::math::{Vec2, Vec3};

/// Display without a surface.
///
/// Optionally reports a close request after a fixed number of presented frames.
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    width: u32,
    height: u32,
    created: bool,
    frames_presented: u64,
    close_after: Option<u64>,
}

impl HeadlessDisplay {
    /// Create a display of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            created: false,
            frames_presented: 0,
            close_after: None,
        }
    }

    /// Request a close once `frames` frames have been presented
    pub fn close_after_frames(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    /// Frames presented so far
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Display for HeadlessDisplay {
    fn create(&mut self) -> Result<(), CollaboratorError> {
        if self.width == 0 || self.height == 0 {
            return Err(CollaboratorError::Display(format!(
                "cannot create a {}x{} surface",
                self.width, self.height
            )));
        }
        self.created = true;
        Ok(())
    }

    fn show(&mut self) -> Result<(), CollaboratorError> {
        if !self.created {
            return Err(CollaboratorError::Display("show before create".to_string()));
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.created = false;
    }

    fn is_close_requested(&self) -> bool {
        self.close_after
            .is_some_and(|frames| self.frames_presented >= frames)
    }

    fn was_resized(&self) -> bool {
        false
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn update(&mut self) -> Result<(), CollaboratorError> {
        self.frames_presented += 1;
        Ok(())
    }
}

/// Input devices with no events
#[derive(Debug, Clone, Default)]
pub struct NullInput {
    open: bool,
}

impl NullInput {
    /// Whether an input frame is currently open
    pub fn is_frame_open(&self) -> bool {
        self.open
    }
}

impl InputDevices for NullInput {
    fn start_event_frame(&mut self) {
        self.open = true;
    }

    fn clear_event_frame(&mut self) {
        self.open = false;
    }
}

/// Render device that only tracks its state
#[derive(Debug, Clone, Default)]
pub struct NullDevice {
    state: RenderState,
    clears: u64,
    viewport: (i32, i32, u32, u32),
    texture_unit: u32,
}

impl NullDevice {
    /// Current blend/depth state
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Number of clears issued
    pub fn clears(&self) -> u64 {
        self.clears
    }

    /// Last viewport set
    pub fn viewport(&self) -> (i32, i32, u32, u32) {
        self.viewport
    }

    /// Active texture unit
    pub fn texture_unit(&self) -> u32 {
        self.texture_unit
    }
}

impl RenderDevice for NullDevice {
    fn clear(&mut self, _flags: ClearFlags) {
        self.clears += 1;
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = (x, y, width, height);
    }

    fn set_active_texture_unit(&mut self, unit: u32) {
        self.texture_unit = unit;
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.state.depth_write = enabled;
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.state.depth_func = func;
    }

    fn check_error(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Batcher that counts what it is given
#[derive(Debug, Clone, Default)]
pub struct CountingBatcher {
    current: Option<Primitive>,
    primitives: u64,
    vertices: u64,
    flushes: u64,
    disposed: bool,
}

impl CountingBatcher {
    /// Completed primitive batches
    pub fn primitives(&self) -> u64 {
        self.primitives
    }

    /// Vertices emitted
    pub fn vertices(&self) -> u64 {
        self.vertices
    }

    /// Number of flushes requested
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Whether [`Batcher::dispose`] ran
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Batcher for CountingBatcher {
    fn begin(&mut self, primitive: Primitive) {
        if let Some(open) = self.current.replace(primitive) {
            log::warn!("Batch {:?} started while {:?} was still open", primitive, open);
        }
    }

    fn vertex(&mut self, _position: Vec3) {
        self.vertices += 1;
    }

    fn color(&mut self, _color: Color) {}

    fn tex_coord(&mut self, _uv: Vec2) {}

    fn end(&mut self) {
        if self.current.take().is_some() {
            self.primitives += 1;
        }
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
