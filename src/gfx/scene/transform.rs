use cgmath::{Matrix4, Rad, Vector3};

/// Translation, per-axis rotation (radians) and scale of a primitive.
///
/// Rotation is applied X, then Y, then Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vector3<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// `T * Rx * Ry * Rz * S`
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// `view * model`
    pub fn model_view(&self, view: &Matrix4<f32>) -> Matrix4<f32> {
        view * self.model_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_default_is_identity() {
        assert_eq!(Transform::default().model_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let transform = Transform::from_translation(Vector3::new(10.0, 0.0, 0.0))
            .with_rotation(Vector3::new(0.0, 0.0, FRAC_PI_2))
            .with_scale(Vector3::new(2.0, 2.0, 2.0));
        let p = transform.model_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // (1,0,0) -> scale (2,0,0) -> rotate about z (0,2,0) -> translate (10,2,0)
        assert!((p.x - 10.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
        assert!(p.z.abs() < 1e-5);
    }

    #[test]
    fn test_model_view_applies_view_last() {
        let transform = Transform::from_translation(Vector3::new(0.0, 0.0, -5.0));
        let view = Matrix4::from_translation(Vector3::new(0.0, 0.0, -1.0));
        let p = transform.model_view(&view) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vector4::new(0.0, 0.0, -6.0, 1.0));
    }
}
