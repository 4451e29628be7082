use glam::Mat4;

use crate::input::CameraPose;

/// Perspective projection that tracks the viewport's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Projection {
    pub fn new(fov_y_degrees: f32, near: f32, far: f32, width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y_degrees,
            near,
            far,
            aspect: 1.0,
        };
        projection.set_viewport(width, height);
        projection
    }

    /// Zero-sized viewports (minimized windows, hidden canvases) keep the last aspect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Right-handed, depth mapped to [0, 1] as wgpu expects.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self, pose: &CameraPose) -> Mat4 {
        self.matrix() * pose.view_matrix()
    }

    /// Inverse of the rotation-only view-projection, for reconstructing
    /// world-space view rays in the sky pass.
    pub fn inverse_sky_view_projection(&self, pose: &CameraPose) -> Mat4 {
        (self.matrix() * pose.rotation_view_matrix()).inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LookState;
    use glam::{Vec3, Vec4};

    const EPSILON: f32 = 1e-4;

    fn pose(position: Vec3, yaw: f32, pitch: f32) -> CameraPose {
        CameraPose {
            position,
            look: LookState { yaw, pitch },
        }
    }

    // ── Projection ──

    #[test]
    fn test_set_viewport_updates_aspect() {
        let mut p = Projection::new(50.0, 0.1, 1000.0, 800, 600);
        assert!((p.aspect - 800.0 / 600.0).abs() < EPSILON);
        p.set_viewport(1920, 1080);
        assert!((p.aspect - 16.0 / 9.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_viewport_keeps_aspect() {
        let mut p = Projection::new(50.0, 0.1, 1000.0, 1600, 900);
        let before = p.aspect;
        p.set_viewport(0, 900);
        p.set_viewport(1600, 0);
        assert_eq!(p.aspect, before);
    }

    #[test]
    fn test_point_ahead_lands_in_clip_volume() {
        let p = Projection::new(50.0, 0.1, 1000.0, 1280, 720);
        let cam = pose(Vec3::new(0.0, 2.0, 10.0), 0.0, 0.0);
        let clip = p.view_projection(&cam) * Vec4::new(0.0, 2.0, -5.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "depth={}", ndc.z);
    }

    #[test]
    fn test_point_behind_is_clipped() {
        let p = Projection::new(50.0, 0.1, 1000.0, 1280, 720);
        let cam = pose(Vec3::new(0.0, 2.0, 10.0), 0.0, 0.0);
        let clip = p.view_projection(&cam) * Vec4::new(0.0, 2.0, 20.0, 1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn test_sky_ray_matches_forward() {
        let p = Projection::new(50.0, 0.1, 1000.0, 1000, 1000);
        let cam = pose(Vec3::new(40.0, -3.0, 7.0), 1.1, 0.4);
        let far = p.inverse_sky_view_projection(&cam) * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let dir = (far.truncate() / far.w).normalize();
        assert!((dir - cam.forward()).length() < 1e-3, "dir={dir:?} forward={:?}", cam.forward());
    }
}
