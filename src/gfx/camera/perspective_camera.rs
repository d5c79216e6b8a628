use cgmath::{perspective, Matrix4, Rad, Vector3};

/// Perspective camera with OpenGL clip-space conventions.
///
/// The view matrix undoes the camera placement: it translates by the negated
/// camera translation, then rotates by the negated angles (X, then Y, then Z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    fov: Rad<f32>,
    aspect: f32,
    near: f32,
    far: f32,
    rotation: Vector3<f32>,
    translation: Vector3<f32>,

    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    view_rotation: Matrix4<f32>,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(
            Rad(std::f32::consts::FRAC_PI_4),
            1.0,
            0.1,
            100.0,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
        )
    }
}

impl PerspectiveCamera {
    pub fn new(
        fov: impl Into<Rad<f32>>,
        aspect: f32,
        near: f32,
        far: f32,
        rotation: Vector3<f32>,
        translation: Vector3<f32>,
    ) -> Self {
        let mut camera = Self {
            fov: fov.into(),
            aspect,
            near,
            far,
            rotation,
            translation,
            projection: Matrix4::from_scale(1.0),
            view: Matrix4::from_scale(1.0),
            view_rotation: Matrix4::from_scale(1.0),
        };
        camera.update();
        camera
    }

    /// Rebuilds every derived matrix from the current parameters.
    fn update(&mut self) {
        self.projection = perspective(self.fov, self.aspect, self.near, self.far);

        let r = -self.rotation;
        self.view_rotation = Matrix4::from_angle_x(Rad(r.x))
            * Matrix4::from_angle_y(Rad(r.y))
            * Matrix4::from_angle_z(Rad(r.z));
        self.view = self.view_rotation * Matrix4::from_translation(-self.translation);
    }

    pub fn fov(&self) -> Rad<f32> {
        self.fov
    }

    pub fn set_fov(&mut self, fov: impl Into<Rad<f32>>) {
        self.fov = fov.into();
        self.update();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update();
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
        self.update();
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
        self.update();
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.rotation = rotation;
        self.update();
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
        self.update();
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    /// The view matrix without its translation part.
    pub fn view_rotation(&self) -> &Matrix4<f32> {
        &self.view_rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, SquareMatrix, Vector4};

    #[test]
    fn test_default_view_is_identity() {
        let camera = PerspectiveCamera::default();
        assert_eq!(*camera.view(), Matrix4::identity());
        assert_eq!(*camera.view_rotation(), Matrix4::identity());
    }

    #[test]
    fn test_setters_refresh_matrices() {
        let mut camera = PerspectiveCamera::default();
        camera.set_translation(Vector3::new(0.0, 0.0, 5.0));
        let p = camera.view() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vector4::new(0.0, 0.0, -5.0, 1.0));
        // translation never leaks into the rotation-only matrix
        assert_eq!(*camera.view_rotation(), Matrix4::identity());

        let before = *camera.projection();
        camera.set_fov(Deg(90.0f32));
        assert_ne!(before, *camera.projection());
        assert_eq!(
            *camera.projection(),
            perspective(Rad::from(Deg(90.0f32)), 1.0, 0.1, 100.0)
        );
    }

    #[test]
    fn test_rotation_is_undone_by_view() {
        let mut camera = PerspectiveCamera::default();
        camera.set_rotation(Vector3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        // camera turned left by 90 degrees: a point on its left ends up in front
        let p = camera.view() * Vector4::new(-1.0, 0.0, 0.0, 1.0);
        assert!(p.x.abs() < 1e-5);
        assert!((p.z + 1.0).abs() < 1e-5);
    }
}
