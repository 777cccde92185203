//! Host collaborator contracts
//!
//! The loop driver never talks to a windowing system, graphics API or input
//! device directly. The host integration supplies implementations of the
//! traits in this module, bundled into a [`Platform`]. Headless
//! implementations live in [`headless`].

pub mod headless;

use bitflags::bitflags;
use thiserror::Error;

use crate::foundation::math::{Vec2, Vec3};
use crate::foundation::time::TimeSource;

/// Failure reported by a host collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Graphics API error
    #[error("Graphics error: {0}")]
    Graphics(String),

    /// Window or surface error
    #[error("Display error: {0}")]
    Display(String),

    /// Audio backend error
    #[error("Audio error: {0}")]
    Audio(String),

    /// Native library error
    #[error("Native error: {0}")]
    Native(String),
}

/// Window/surface the session presents into
pub trait Display {
    /// Create the surface
    fn create(&mut self) -> Result<(), CollaboratorError>;

    /// Make the surface visible
    fn show(&mut self) -> Result<(), CollaboratorError>;

    /// Release the surface
    fn destroy(&mut self);

    /// Whether the user asked to close the surface
    fn is_close_requested(&self) -> bool;

    /// Whether the surface changed size since the last [`update`](Self::update)
    fn was_resized(&self) -> bool;

    /// Surface width in pixels
    fn width(&self) -> u32;

    /// Surface height in pixels
    fn height(&self) -> u32;

    /// Present the frame and poll window events
    fn update(&mut self) -> Result<(), CollaboratorError>;
}

/// Keyboard/mouse state delimited into one atomic snapshot per update step
pub trait InputDevices {
    /// Open the input frame for the coming update step
    fn start_event_frame(&mut self);

    /// Close the input frame after the update step
    fn clear_event_frame(&mut self);
}

bitflags! {
    /// Buffers cleared at the start of a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Color buffer
        const COLOR = 0b0001;
        /// Depth buffer
        const DEPTH = 0b0010;
        /// Stencil buffer
        const STENCIL = 0b0100;
    }
}

/// Blend equation applied to fragment output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * alpha + dst * (1 - alpha)`
    Alpha,
    /// `src + dst`
    Additive,
}

/// Depth comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    /// Pass when closer than the stored depth
    Less,
    /// Pass when equal to the stored depth
    Equal,
    /// Pass when closer or equal
    LessEqual,
    /// Always pass
    Always,
}

/// Blend and depth state of the render device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    /// Blend equation
    pub blend: BlendMode,
    /// Whether fragments write depth
    pub depth_write: bool,
    /// Depth comparison
    pub depth_func: DepthFunc,
}

impl RenderState {
    /// Regular alpha-blended rendering with depth writes
    pub const STANDARD: Self = Self {
        blend: BlendMode::Alpha,
        depth_write: true,
        depth_func: DepthFunc::Less,
    };

    /// Accumulate contributions over an existing depth pre-pass
    pub const FORWARD_ADDITIVE: Self = Self {
        blend: BlendMode::Additive,
        depth_write: false,
        depth_func: DepthFunc::Equal,
    };
}

impl Default for RenderState {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Low-level graphics binding used by the loop and by render passes
pub trait RenderDevice {
    /// Clear the selected buffers
    fn clear(&mut self, flags: ClearFlags);

    /// Set the viewport rectangle
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Select the active texture unit
    fn set_active_texture_unit(&mut self, unit: u32);

    /// Set the blend equation
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Enable or disable depth writes
    fn set_depth_write(&mut self, enabled: bool);

    /// Set the depth comparison
    fn set_depth_func(&mut self, func: DepthFunc);

    /// Report the first error raised since the previous check
    fn check_error(&mut self) -> Result<(), CollaboratorError>;

    /// Apply a full blend/depth state
    fn apply_state(&mut self, state: RenderState) {
        self.set_blend_mode(state.blend);
        self.set_depth_write(state.depth_write);
        self.set_depth_func(state.depth_func);
    }
}

/// Primitive assembled from a batch of vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Independent points
    Points,
    /// Independent line segments
    Lines,
    /// Connected line segments
    LineStrip,
    /// Connected line segments closed back to the first vertex
    LineLoop,
    /// Independent triangles
    Triangles,
    /// Triangles sharing edges with their predecessor
    TriangleStrip,
    /// Triangles sharing the first vertex
    TriangleFan,
}

/// RGBA color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    /// Create a color from components
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Immediate-mode primitive batcher shared by every render call of a session
pub trait Batcher {
    /// Start a primitive batch
    fn begin(&mut self, primitive: Primitive);

    /// Emit a vertex position
    fn vertex(&mut self, position: Vec3);

    /// Set the color of the last vertex
    fn color(&mut self, color: Color);

    /// Set the texture coordinate of the last vertex
    fn tex_coord(&mut self, uv: Vec2);

    /// Finish the current batch
    fn end(&mut self);

    /// Submit everything batched so far
    fn flush(&mut self);

    /// Release GPU resources held by the batcher
    fn dispose(&mut self);
}

/// Everything a session needs from its host
pub struct Platform {
    /// Window/surface
    pub display: Box<dyn Display>,
    /// Input snapshotting
    pub input: Box<dyn InputDevices>,
    /// Graphics binding
    pub device: Box<dyn RenderDevice>,
    /// Shared primitive batcher
    pub batcher: Box<dyn Batcher>,
    /// Monotonic time
    pub clock: Box<dyn TimeSource>,
}

impl Platform {
    /// Bundle collaborators into a platform
    pub fn new(
        display: impl Display + 'static,
        input: impl InputDevices + 'static,
        device: impl RenderDevice + 'static,
        batcher: impl Batcher + 'static,
        clock: impl TimeSource + 'static,
    ) -> Self {
        Self {
            display: Box::new(display),
            input: Box::new(input),
            device: Box::new(device),
            batcher: Box::new(batcher),
            clock: Box::new(clock),
        }
    }

    /// Headless collaborators sized `width` x `height`, driven by `clock`
    pub fn headless(width: u32, height: u32, clock: impl TimeSource + 'static) -> Self {
        Self::new(
            headless::HeadlessDisplay::new(width, height),
            headless::NullInput::default(),
            headless::NullDevice::default(),
            headless::CountingBatcher::default(),
            clock,
        )
    }

    /// Replace the display collaborator
    pub fn with_display(mut self, display: impl Display + 'static) -> Self {
        self.display = Box::new(display);
        self
    }

    /// Replace the input collaborator
    pub fn with_input(mut self, input: impl InputDevices + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Replace the render device
    pub fn with_device(mut self, device: impl RenderDevice + 'static) -> Self {
        self.device = Box::new(device);
        self
    }

    /// Replace the batcher
    pub fn with_batcher(mut self, batcher: impl Batcher + 'static) -> Self {
        self.batcher = Box::new(batcher);
        self
    }
}
