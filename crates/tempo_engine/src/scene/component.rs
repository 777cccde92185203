//! Per-node behaviour attachments

use std::fmt;

use super::error::SceneError;
use crate::platform::RenderDevice;

/// Handle of a component attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Behaviour attached to exactly one node.
///
/// Components tick after their node's own update. When a node has components,
/// its child subtree is rendered once per component, bracketed by
/// [`enter`](Self::enter) and [`restore`](Self::restore), with the device in
/// additive forward state so each pass accumulates onto the previous ones (one
/// pass per light, for example).
pub trait Component {
    /// Per-step update tick
    fn update(&mut self, _delta: f32) -> Result<(), SceneError> {
        Ok(())
    }

    /// Bind this component's render state before its pass over the children
    fn enter(&mut self, _device: &mut dyn RenderDevice) -> Result<(), SceneError> {
        Ok(())
    }

    /// Unbind after the pass
    fn restore(&mut self, _device: &mut dyn RenderDevice) -> Result<(), SceneError> {
        Ok(())
    }

    /// Release resources. Runs once, on removal or owner destruction.
    fn dispose(&mut self) {}
}
