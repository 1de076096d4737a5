//! Pinhole camera and the camera-space basis it builds for the renderer.

use crate::core::matrix::Matrix4;
use crate::core::numeric::Float;
use crate::core::vector::Vec3;

#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub fov_x: Float,
}

impl Camera {
    pub fn new(name: impl Into<String>, position: Vec3, direction: Vec3, up: Vec3, fov_x: Float) -> Camera {
        Camera {
            name: name.into(),
            position,
            direction: direction.normalized(),
            up: up.normalized(),
            fov_x,
        }
    }

    /// Builds a camera from the SDF format's `<fov_x_deg> <px py pz> <yaw
    /// pitch roll>` tuple (degrees, YXZ Euler, looking down -Z / up +Y
    /// before rotation — matching the original loader).
    pub fn from_euler(
        name: impl Into<String>,
        fov_x_deg: Float,
        position: Vec3,
        yaw_deg: Float,
        pitch_deg: Float,
        roll_deg: Float,
    ) -> Camera {
        let rotation = Matrix4::euler_yxz(yaw_deg.to_radians(), pitch_deg.to_radians(), roll_deg.to_radians());
        let direction = rotation.transform_dir(Vec3::new(0.0, 0.0, -1.0));
        let up = rotation.transform_dir(Vec3::new(0.0, 1.0, 0.0));
        Camera::new(name, position, direction, up, fov_x_deg.to_radians())
    }

    /// The camera-to-world basis matrix used by the pixel scheduler: columns
    /// `(u, 0), (v, 0), (-direction, 0), (position, 1)` where `u = direction
    /// × up` and `v = u × direction` (§4.3).
    pub fn basis(&self) -> Matrix4 {
        let u = self.direction.cross(self.up).normalized();
        let v = u.cross(self.direction).normalized();
        Matrix4::from_cols((u, 0.0), (v, 0.0), (-self.direction, 0.0), (self.position, 1.0))
    }

    /// Distance from the camera to the image plane given the (super-sampled)
    /// image width, so that the plane subtends exactly `fov_x`.
    pub fn image_plane_distance(&self, width: Float) -> Float {
        (width / 2.0) / (self.fov_x / 2.0).tan()
    }
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new(
            "default",
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, 0.0),
            60f32.to_radians(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_axes_are_orthonormal() {
        let cam = Camera::default();
        let basis = cam.basis();
        let u = basis.col3(0);
        let v = basis.col3(1);
        assert!((u.dot(v)).abs() < 1e-5);
        assert!((u.length() - 1.0).abs() < 1e-5);
        assert!((v.length() - 1.0).abs() < 1e-5);
    }
}
