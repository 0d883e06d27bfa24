//! Camera abstraction for scenes.
//!
//! The hosting runtime owns head tracking and projection setup; a scene only
//! needs the three matrices it hands to the shader. [`FixedCamera`] is the
//! desktop stand-in used by the runner and the tests.

use cgmath::{Deg, EuclideanSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};

use crate::data_structures::bounding_box::BoundingBox;

/// wgpu's clip space has z in [0, 1] where cgmath produces OpenGL's [-1, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait Camera {
    /// Transform from object space into world space.
    fn object_to_world(&self) -> Matrix4<f32>;

    fn view(&self) -> Matrix4<f32>;

    fn projection(&self) -> Matrix4<f32>;
}

#[derive(Clone, Debug)]
pub struct FixedCamera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
    pub object_to_world: Matrix4<f32>,
}

impl FixedCamera {
    pub fn new<F: Into<Rad<f32>>>(eye: Point3<f32>, target: Point3<f32>, fovy: F, width: u32, height: u32) -> Self {
        Self {
            eye,
            target,
            up: Vector3::unit_y(),
            fovy: fovy.into(),
            aspect: width as f32 / height.max(1) as f32,
            znear: 0.1,
            zfar: 500.0,
            object_to_world: Matrix4::identity(),
        }
    }

    /// Looks at the centre of `bounds` from `distance` along +z. Without a
    /// distance the camera backs off far enough to fit the box's largest extent
    /// into the vertical field of view.
    pub fn framing(bounds: &BoundingBox, fovy: Deg<f32>, distance: Option<f32>, width: u32, height: u32) -> Self {
        let center = bounds.center();
        let radius = bounds.extent().x.max(bounds.extent().y).max(bounds.extent().z) * 0.5;
        let fit = radius.max(0.5) / (Rad::from(fovy).0 * 0.5).tan() + radius;
        let distance = distance.unwrap_or(fit);
        let mut camera = Self::new(center + Vector3::new(0.0, 0.0, distance), center, fovy, width, height);
        camera.zfar = camera.zfar.max(distance + radius * 2.0);
        camera
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 3.0), Point3::origin(), Deg(45.0), 1280, 720)
    }
}

impl Camera for FixedCamera {
    fn object_to_world(&self) -> Matrix4<f32> {
        self.object_to_world
    }

    fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    fn projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Transform, Vector4};

    use super::*;

    #[test]
    fn target_lands_in_front_of_the_camera() {
        let camera = FixedCamera::default();
        let in_view = camera.view().transform_point(camera.target);
        assert!(in_view.z < 0.0);
        let clip = camera.projection() * Vector4::new(in_view.x, in_view.y, in_view.z, 1.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn framing_centres_on_the_box() {
        let bounds = BoundingBox::new(Point3::new(10.0, 0.0, 0.0), Point3::new(12.0, 2.0, 2.0));
        let camera = FixedCamera::framing(&bounds, Deg(45.0), None, 800, 600);
        assert_eq!(camera.target, Point3::new(11.0, 1.0, 1.0));
        assert!(camera.eye.z > 2.0);
        assert!((camera.aspect - 800.0 / 600.0).abs() < f32::EPSILON);

        let fixed = FixedCamera::framing(&bounds, Deg(45.0), Some(7.0), 800, 600);
        assert_eq!(fixed.eye, Point3::new(11.0, 1.0, 8.0));
    }
}
