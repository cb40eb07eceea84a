use glam::{Quat, Vec3};

/// One Gaussian, in the layout the GPU passes consume.
///
/// 256 bytes, immutable after load. The asset pipeline has already undone the
/// storage encodings: scales are exponentiated, the quaternion is normalized
/// with the real part first, opacity has the sigmoid applied and the base
/// color is `0.5 + SH_C0 * f_dc`, clamped to [0, 1]. The SH bands are laid
/// out channel-major: all red coefficients of a band, then green, then blue.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplatRecord {
    mean: [f32; 3],
    pad0: f32,
    scale: [f32; 3],
    pad1: f32,
    /// (w, x, y, z).
    rotation: [f32; 4],
    color_dc: [f32; 3],
    opacity: f32,
    sh1: [f32; 9],
    sh2: [f32; 15],
    sh3: [f32; 21],
    pad2: [f32; 3],
}

impl SplatRecord {
    pub const SIZE: usize = 256;

    pub fn new(mean: Vec3, scale: Vec3, rotation: Quat, color_dc: Vec3, opacity: f32) -> Self {
        Self {
            mean: mean.to_array(),
            pad0: 0.0,
            scale: scale.to_array(),
            pad1: 0.0,
            rotation: [rotation.w, rotation.x, rotation.y, rotation.z],
            color_dc: color_dc.to_array(),
            opacity,
            sh1: [0.0; 9],
            sh2: [0.0; 15],
            sh3: [0.0; 21],
            pad2: [0.0; 3],
        }
    }

    /// Attach the view-dependent bands, channel-major per band.
    pub fn with_sh(mut self, sh1: [f32; 9], sh2: [f32; 15], sh3: [f32; 21]) -> Self {
        self.sh1 = sh1;
        self.sh2 = sh2;
        self.sh3 = sh3;
        self
    }

    pub fn mean(&self) -> Vec3 {
        Vec3::from_array(self.mean)
    }

    pub fn scale(&self) -> Vec3 {
        Vec3::from_array(self.scale)
    }

    pub fn rotation(&self) -> Quat {
        let [w, x, y, z] = self.rotation;
        Quat::from_xyzw(x, y, z, w)
    }

    pub fn color_dc(&self) -> Vec3 {
        Vec3::from_array(self.color_dc)
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}
