use glam::Vec3;

/// Degree-0 spherical harmonics basis constant.
pub const SH_C0: f32 = 0.2820947917738781;

pub const fn sh_coeffs_for_degree(degree: u32) -> u32 {
    (degree + 1).pow(2)
}

pub fn sh_degree_from_coeffs(coeffs_per_channel: u32) -> Option<u32> {
    match coeffs_per_channel {
        1 => Some(0),
        4 => Some(1),
        9 => Some(2),
        16 => Some(3),
        _ => None,
    }
}

/// Base color from a raw degree-0 coefficient, as asset pipelines feed it to
/// the record stream.
pub fn dc_to_rgb(f_dc: Vec3) -> Vec3 {
    (f_dc * SH_C0 + 0.5).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Inverse of [`dc_to_rgb`] for exporters.
pub fn rgb_to_dc(rgb: Vec3) -> Vec3 {
    (rgb - 0.5) / SH_C0
}
