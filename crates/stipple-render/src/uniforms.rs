use crate::{camera::Camera, config::RenderConfig, splats::Splats};
use glam::UVec2;

/// The single uniform block every GPU stage reads. Written once per frame,
/// before the first compute pass.
///
/// Matrices are column-major, matching the WGSL mirror in
/// `shaders/cull_bin.wgsl` and `shaders/splat_draw.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub screen_size: [f32; 2],
    pub near_plane: f32,
    pub far_plane: f32,
    pub pixel_threshold: f32,
    pub model_max_scale: f32,
    pub sh_degree: u32,
    pub splat_count: u32,
    pub low_pass_filter: f32,
    pub alpha_cull_threshold: f32,
    pad: [u32; 2],
}

impl RenderUniforms {
    pub fn new(
        camera: &Camera,
        splats: &Splats,
        config: &RenderConfig,
        viewport: UVec2,
    ) -> Self {
        let proj = camera.proj_matrix(viewport, config.near_plane, config.far_plane);
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            model: splats.model_matrix().to_cols_array_2d(),
            camera_pos: [camera.position.x, camera.position.y, camera.position.z, 0.0],
            screen_size: [viewport.x as f32, viewport.y as f32],
            near_plane: config.near_plane,
            far_plane: config.far_plane,
            pixel_threshold: config.pixel_threshold,
            model_max_scale: splats.model_max_scale(),
            sh_degree: config.sh_mode.degree(),
            splat_count: splats.num_splats(),
            low_pass_filter: config.low_pass_filter,
            alpha_cull_threshold: config.alpha_cull_threshold,
            pad: [0; 2],
        }
    }
}
