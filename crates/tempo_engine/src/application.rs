//! Application trait and lifecycle hooks

use thiserror::Error;

use crate::platform::CollaboratorError;
use crate::render::Frame;
use crate::scene::{Scene, SceneError, StructureError};
use crate::session::Session;

/// Application lifecycle trait
///
/// Implement this trait to run code under the loop driver. Every hook is
/// optional. `update` runs at the fixed target rate with the step duration as
/// `delta`; `render` runs once per loop iteration with the measured wall time
/// since the previous iteration.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the display is created, before the first update.
    fn init(&mut self, _session: &mut Session) -> Result<(), AppError> {
        Ok(())
    }

    /// Advance the simulation by one fixed step of `delta` seconds
    ///
    /// `delta` is always `1 / target_ups` for the run, never the measured
    /// wall time. Catch-up steps get the same value, so it differs from the
    /// `delta` passed to [`Application::render`].
    fn update(&mut self, _session: &mut Session, _delta: f32) -> Result<(), AppError> {
        Ok(())
    }

    /// Render one frame
    ///
    /// `delta` is the time since the previous loop iteration in seconds. The
    /// buffers have already been cleared.
    fn render(
        &mut self,
        _session: &mut Session,
        _delta: f32,
        _frame: &mut Frame<'_>,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// The display changed size. The viewport follows after this returns.
    fn resize(&mut self, _session: &mut Session, _width: u32, _height: u32) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the loop has exited, after the batcher is disposed
    /// and before the display is destroyed. Also runs after a fatal error.
    fn dispose(&mut self, _session: &mut Session) {}
}

/// Application-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Scene graph error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Host collaborator failure
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

impl AppError {
    /// Whether the failure came from a host collaborator.
    ///
    /// Only these are subject to the session's error mode; everything else
    /// always ends the session.
    pub fn is_collaborator(&self) -> bool {
        matches!(
            self,
            Self::Collaborator(_) | Self::Scene(SceneError::Collaborator(_))
        )
    }
}

impl From<StructureError> for AppError {
    fn from(error: StructureError) -> Self {
        Self::Scene(SceneError::Structure(error))
    }
}

/// A bare scene can be run directly: updates and renders drive its root.
impl Application for Scene {
    fn init(&mut self, _session: &mut Session) -> Result<(), AppError> {
        Ok(Scene::init(self)?)
    }

    fn update(&mut self, _session: &mut Session, delta: f32) -> Result<(), AppError> {
        Ok(Scene::update(self, delta)?)
    }

    fn render(
        &mut self,
        _session: &mut Session,
        delta: f32,
        frame: &mut Frame<'_>,
    ) -> Result<(), AppError> {
        Ok(Scene::render(self, delta, frame)?)
    }

    fn dispose(&mut self, _session: &mut Session) {
        Scene::dispose(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeId;

    #[test]
    fn test_collaborator_errors_are_classified() {
        let direct = AppError::from(CollaboratorError::Graphics("lost device".to_string()));
        let via_scene = AppError::from(SceneError::from(CollaboratorError::Audio("no device".to_string())));
        assert!(direct.is_collaborator());
        assert!(via_scene.is_collaborator());
    }

    #[test]
    fn test_structure_and_custom_errors_are_not_collaborator_errors() {
        let structure = AppError::from(StructureError::UnknownNode);
        let custom = AppError::Custom("bad level".to_string());
        let node = AppError::from(SceneError::Node("broken".to_string()));
        assert!(!structure.is_collaborator());
        assert!(!custom.is_collaborator());
        assert!(!node.is_collaborator());
    }

    #[test]
    fn test_structure_error_message_names_nodes() {
        let error = AppError::from(StructureError::Destroyed(NodeId::next()));
        assert!(error.to_string().contains("destroyed"));
    }
}
