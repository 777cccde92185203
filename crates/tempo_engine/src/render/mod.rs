//! Per-frame render access
//!
//! A [`Frame`] lends the session's shared batcher and render device to one
//! render pass. [`shapes`] holds immediate-mode drawing helpers built on the
//! batcher.

pub mod shapes;

use crate::platform::{Batcher, RenderDevice};

/// Collaborators available while a frame is being rendered
pub struct Frame<'a> {
    /// Shared primitive batcher
    pub batcher: &'a mut dyn Batcher,
    /// Graphics binding
    pub device: &'a mut dyn RenderDevice,
}

impl<'a> Frame<'a> {
    /// Borrow the collaborators for one frame
    pub fn new(batcher: &'a mut dyn Batcher, device: &'a mut dyn RenderDevice) -> Self {
        Self { batcher, device }
    }
}
