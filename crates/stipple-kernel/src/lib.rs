//! Shared GPU plumbing for the stipple compute and raster passes.
//!
//! This crate owns the little pieces every pass needs: workgroup-count
//! calculation (with the 2D tiling fallback for dispatches above the per
//! dimension limit), bind-group layout entry builders, and buffer helpers.

/// WebGPU limit on workgroups per dispatch dimension.
pub const MAX_WORKGROUPS_PER_DIM: u32 = 65535;

/// Calculate the workgroup count for a 1D dispatch, tiling into 2D if needed.
///
/// Use this for kernels processing a 1D array of elements that may exceed
/// 65535 workgroups. Shaders consuming a tiled dispatch must flatten the
/// workgroup id as `(wg.y * num_wg.x + wg.x) * wg_size + local_idx`.
pub fn calc_workgroup_count_1d(num_elements: u32, workgroup_size: u32) -> [u32; 3] {
    let total_wgs = num_elements.div_ceil(workgroup_size);

    if total_wgs > MAX_WORKGROUPS_PER_DIM {
        let wg_y = (f64::from(total_wgs)).sqrt().ceil() as u32;
        let wg_x = total_wgs.div_ceil(wg_y);
        [wg_x, wg_y, 1]
    } else {
        [total_wgs.max(1), 1, 1]
    }
}

/// Round `size` up to the device's dynamic uniform offset alignment.
pub fn uniform_stride(device: &wgpu::Device, size: u64) -> u64 {
    let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
    size.div_ceil(align) * align
}

/// Bind group layout entry for a uniform buffer.
pub fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Bind group layout entry for a uniform buffer bound with a dynamic offset.
pub fn dynamic_uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Bind group layout entry for a storage buffer.
pub fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    read_only: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Create a labeled shader module from WGSL source.
pub fn create_shader(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

/// Create a labeled storage buffer of `size` bytes.
pub fn create_storage_buffer(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    extra_usages: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size.max(4),
        usage: wgpu::BufferUsages::STORAGE | extra_usages,
        mapped_at_creation: false,
    })
}
