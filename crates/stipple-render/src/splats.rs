use crate::{RenderError, bounding_box::BoundingBox, record::SplatRecord};
use glam::{Mat3, Mat4, Vec3};
use wgpu::util::DeviceExt;

/// Transform setter surface a gizmo drives. Implementors store only the
/// composed transform inputs; no references back into scene graphs.
pub trait TransformProxy {
    fn set_position(&mut self, position: Vec3);
    /// Euler angles in radians, composed `Rz * Ry * Rx`.
    fn set_rotation(&mut self, euler_xyz: Vec3);
    fn set_scale(&mut self, scale: Vec3);
    fn set_pivot(&mut self, pivot: Vec3);
}

fn rotation_scale(euler_xyz: Vec3, scale: Vec3) -> Mat3 {
    let rot = Mat3::from_rotation_z(euler_xyz.z)
        * Mat3::from_rotation_y(euler_xyz.y)
        * Mat3::from_rotation_x(euler_xyz.x);
    rot * Mat3::from_diagonal(scale)
}

/// Compose the model transform so rotation and scale act around the pivot,
/// with the position offset applied afterwards.
fn compose_model_matrix(position: Vec3, euler_xyz: Vec3, scale: Vec3, pivot: Vec3) -> Mat4 {
    let rs = rotation_scale(euler_xyz, scale);
    let translation = position + pivot - rs * pivot;
    Mat4::from_translation(translation) * Mat4::from_mat3(rs)
}

/// The loaded splat cloud: the immutable GPU record buffer, its local-space
/// bounds, and the model transform applied to it each frame.
pub struct Splats {
    buffer: wgpu::Buffer,
    num_splats: u32,
    bounding_box: BoundingBox,

    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    /// Rotation and scale are applied around this point. Defaults to the
    /// bounding-box center.
    pivot: Vec3,
}

impl Splats {
    /// Upload `records` and derive the local bounds. Fails if the record
    /// buffer does not fit in one storage binding on this device.
    pub fn new(device: &wgpu::Device, records: &[SplatRecord]) -> Result<Self, RenderError> {
        let size = std::mem::size_of_val(records) as u64;
        let limit = u64::from(device.limits().max_storage_buffer_binding_size);
        if size > limit {
            return Err(RenderError::BufferLimitExceeded { size, limit });
        }

        let buffer = if records.is_empty() {
            // Keep one record's worth of zeroes so the binding still
            // satisfies the shader-side array stride.
            stipple_kernel::create_storage_buffer(
                device,
                "splat records",
                SplatRecord::SIZE as u64,
                wgpu::BufferUsages::empty(),
            )
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("splat records"),
                contents: bytemuck::cast_slice(records),
                usage: wgpu::BufferUsages::STORAGE,
            })
        };

        let bounding_box = BoundingBox::from_points(records.iter().map(SplatRecord::mean));
        log::info!(
            "Loaded {} splats, bounds {:?}..{:?}",
            records.len(),
            bounding_box.min,
            bounding_box.max
        );

        Ok(Self {
            buffer,
            num_splats: records.len() as u32,
            bounding_box,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            pivot: bounding_box.center(),
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn num_splats(&self) -> u32 {
        self.num_splats
    }

    /// Local-space bounds of the unmodified means. Transform by
    /// [`Self::model_matrix`] for the world-space box.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn model_matrix(&self) -> Mat4 {
        compose_model_matrix(self.position, self.rotation, self.scale, self.pivot)
    }

    /// Largest column norm of the model's linear part. Scales the 3-sigma
    /// world radius in the culling pass so non-uniform model scale never
    /// under-estimates a splat's extent.
    pub fn model_max_scale(&self) -> f32 {
        let rs = rotation_scale(self.rotation, self.scale);
        rs.x_axis
            .length()
            .max(rs.y_axis.length())
            .max(rs.z_axis.length())
    }
}

impl TransformProxy for Splats {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_rotation(&mut self, euler_xyz: Vec3) {
        self.rotation = euler_xyz;
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    fn set_pivot(&mut self, pivot: Vec3) {
        self.pivot = pivot;
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_model_matrix, rotation_scale};
    use assert_approx_eq::assert_approx_eq;
    use glam::{Vec3, vec3};

    #[test]
    fn rotation_about_origin_pivot() {
        let m = compose_model_matrix(
            Vec3::ZERO,
            vec3(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            Vec3::ONE,
            Vec3::ZERO,
        );
        // 90 degrees around +Y carries +X onto -Z.
        let p = m.transform_point3(vec3(1.0, 0.0, 0.0));
        assert_approx_eq!(p.x, 0.0, 1e-6);
        assert_approx_eq!(p.y, 0.0, 1e-6);
        assert_approx_eq!(p.z, -1.0, 1e-6);
    }

    #[test]
    fn pivot_is_fixed_point() {
        let pivot = vec3(2.0, -1.0, 3.0);
        let m = compose_model_matrix(
            Vec3::ZERO,
            vec3(0.3, 1.1, -0.4),
            vec3(2.0, 0.5, 1.5),
            pivot,
        );
        let p = m.transform_point3(pivot);
        assert_approx_eq!(p.x, pivot.x, 1e-5);
        assert_approx_eq!(p.y, pivot.y, 1e-5);
        assert_approx_eq!(p.z, pivot.z, 1e-5);
    }

    #[test]
    fn position_translates_after_pivot() {
        let m = compose_model_matrix(
            vec3(5.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
            vec3(1.0, 1.0, 1.0),
        );
        let p = m.transform_point3(Vec3::ZERO);
        assert_approx_eq!(p.x, 5.0, 1e-6);
        assert_approx_eq!(p.y, 0.0, 1e-6);
        assert_approx_eq!(p.z, 0.0, 1e-6);
    }

    #[test]
    fn max_scale_tracks_largest_axis() {
        let rs = rotation_scale(vec3(0.4, 0.9, -1.3), vec3(0.5, 3.0, 1.0));
        let max_norm = rs
            .x_axis
            .length()
            .max(rs.y_axis.length())
            .max(rs.z_axis.length());
        // Rotation preserves column norms, so the max norm is the max scale.
        assert_approx_eq!(max_norm, 3.0, 1e-5);
    }
}
