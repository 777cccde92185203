//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the [`Transform`] value used by scene nodes.

pub use nalgebra::{Quaternion, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Local position, rotation and scale relative to a parent frame
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Move by `offset` in the parent frame
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.position += offset;
        self
    }

    /// Apply an additional rotation after the current one
    pub fn rotate(&mut self, rotation: Quat) -> &mut Self {
        self.rotation = rotation * self.rotation;
        self
    }

    /// Multiply the scale component-wise
    pub fn scale_by(&mut self, factors: Vec3) -> &mut Self {
        self.scale = self.scale.component_mul(&factors);
        self
    }

    /// Compose `other`, expressed in this transform's frame, into this frame.
    ///
    /// `parent.combine(&local)` yields the local transform seen from the
    /// parent's parent frame.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    /// Where `point` in `frame` lands in the frame's parent
    fn map(frame: &Transform, point: Vec3) -> Vec3 {
        frame.combine(&Transform::from_position(point)).position
    }

    #[test]
    fn test_combine_rotates_child_offset() {
        let parent = Transform::from_position_rotation(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0),
        );
        let child = Transform::from_position(Vec3::new(0.0, 0.0, 1.0));

        let combined = parent.combine(&child);

        // (0,0,1) rotated 90 degrees about Y then moved by (1,0,0)
        assert_relative_eq!(combined.position, Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_combine_maps_points_like_nested_frames() {
        let parent = Transform {
            position: Vec3::new(3.0, -1.0, 2.0),
            rotation: Quat::from_axis_angle(&Vec3::z_axis(), 0.3),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let child = Transform {
            position: Vec3::new(1.0, 1.0, 0.0),
            rotation: Quat::from_axis_angle(&Vec3::x_axis(), 0.7),
            scale: Vec3::new(1.0, 3.0, 0.5),
        };
        let point = Vec3::new(0.5, -1.0, 2.0);

        let combined = parent.combine(&child);

        assert_relative_eq!(map(&combined, point), map(&parent, map(&child, point)), epsilon = 1e-5);
    }

    #[test]
    fn test_combine_scales_before_rotating() {
        let transform = Transform {
            position: Vec3::new(2.0, 3.0, 1.0),
            rotation: Quat::from_axis_angle(&Vec3::z_axis(), PI / 2.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };

        // (1,1,0) scaled to (2,1,0), rotated to (-1,2,0), then moved
        assert_relative_eq!(
            map(&transform, Vec3::new(1.0, 1.0, 0.0)),
            Vec3::new(1.0, 5.0, 1.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_combine_keeps_child_origin_under_non_uniform_scale() {
        let parent = Transform {
            position: Vec3::new(2.0, 3.0, 1.0),
            rotation: Quat::from_axis_angle(&Vec3::z_axis(), PI / 2.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        let child = Transform::from_position(Vec3::new(1.0, 1.0, 0.0));

        let combined = parent.combine(&child);

        assert_relative_eq!(combined.position, Vec3::new(1.0, 5.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(combined.scale, Vec3::new(2.0, 1.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_translate_and_scale_chain() {
        let mut transform = Transform::identity();
        transform
            .translate(Vec3::new(1.0, 2.0, 3.0))
            .scale_by(Vec3::new(2.0, 1.0, 0.5));

        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.scale, Vec3::new(2.0, 1.0, 0.5));
    }
}
