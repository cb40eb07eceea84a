use glam::{Mat4, Quat, UVec2, Vec3};

/// Camera state the host hands the renderer each frame.
///
/// The view transform is rigid (rotation + translation), so its upper 3x3 can
/// be reused directly as the world-to-view rotation in the covariance
/// projection. Looks down -Z, right-handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view, radians.
    pub fov_y: f32,
}

impl Camera {
    pub fn new(position: Vec3, rotation: Quat, fov_y: f32) -> Self {
        Self {
            position,
            rotation,
            fov_y,
        }
    }

    /// Camera at `position` oriented towards `target`, +Y up.
    pub fn looking_at(position: Vec3, target: Vec3, fov_y: f32) -> Self {
        let view = Mat4::look_at_rh(position, target, Vec3::Y);
        let rotation = Quat::from_mat4(&view).inverse();
        Self {
            position,
            rotation,
            fov_y,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Standard perspective projection (0..1 depth range):
    /// `proj[0][0] = 1 / (aspect * tan(fov/2))`, `proj[1][1] = 1 / tan(fov/2)`.
    pub fn proj_matrix(&self, viewport: UVec2, near: f32, far: f32) -> Mat4 {
        let aspect = viewport.x as f32 / viewport.y as f32;
        Mat4::perspective_rh(self.fov_y, aspect, near, far)
    }
}
