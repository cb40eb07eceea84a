use crate::WORKGROUP_SIZE;
use stipple_kernel::{calc_workgroup_count_1d, create_shader, storage_entry, uniform_entry};
use stipple_prefix_sum::NUM_BUCKETS;

/// The per-frame cull: frustum, screen-size and opacity tests, depth
/// quantization and bucket binning, all in one dispatch over every splat.
///
/// The same shader carries the tiny frame-setup entry points: clearing the
/// visible counter and the bucket histogram, and deriving the indirect
/// dispatch size the downstream passes use to cover exactly the visible
/// prefix.
pub struct CullBinPass {
    clear_count_pipeline: wgpu::ComputePipeline,
    clear_buckets_pipeline: wgpu::ComputePipeline,
    cull_pipeline: wgpu::ComputePipeline,
    dispatch_args_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl CullBinPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("cull bind group layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                    storage_entry(1, wgpu::ShaderStages::COMPUTE, true),
                    storage_entry(2, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(3, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(4, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(5, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(6, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(7, wgpu::ShaderStages::COMPUTE, false),
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cull pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = create_shader(device, "cull shader", include_str!("shaders/cull_bin.wgsl"));

        let pipeline_for = |label, entry_point| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            })
        };

        log::debug!("Creating cull pipelines");
        Self {
            clear_count_pipeline: pipeline_for("clear visible count pipeline", "clear_visible_count"),
            clear_buckets_pipeline: pipeline_for("clear bucket counts pipeline", "clear_bucket_counts"),
            cull_pipeline: pipeline_for("cull pipeline", "cull_bin"),
            dispatch_args_pipeline: pipeline_for("dispatch args pipeline", "write_dispatch_args"),
            bind_group_layout,
        }
    }

    pub fn bind(
        &self,
        device: &wgpu::Device,
        uniforms: &wgpu::Buffer,
        splat_records: &wgpu::Buffer,
        visible_indices: &wgpu::Buffer,
        visible_depths: &wgpu::Buffer,
        visible_buckets: &wgpu::Buffer,
        bucket_counts: &wgpu::Buffer,
        visible_count: &wgpu::Buffer,
        dispatch_args: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let buffers = [
            uniforms,
            splat_records,
            visible_indices,
            visible_depths,
            visible_buckets,
            bucket_counts,
            visible_count,
            dispatch_args,
        ];
        let entries: Vec<_> = buffers
            .iter()
            .enumerate()
            .map(|(i, buffer)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cull bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    /// Record the counter clears. Always runs, even on an empty scene, so a
    /// frame starts from zeroed state.
    pub fn record_clear(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("clear counters pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.clear_count_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(1, 1, 1);

        pass.set_pipeline(&self.clear_buckets_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        let [x, y, z] = calc_workgroup_count_1d(NUM_BUCKETS, WORKGROUP_SIZE);
        pass.dispatch_workgroups(x, y, z);
    }

    /// Record the cull dispatch over all `num_splats`, then the dispatch-args
    /// write derived from the surviving count.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_group: &wgpu::BindGroup,
        num_splats: u32,
    ) {
        let _span = tracing::trace_span!("Cull and bin").entered();

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("cull pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.cull_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        let [x, y, z] = calc_workgroup_count_1d(num_splats, WORKGROUP_SIZE);
        pass.dispatch_workgroups(x, y, z);

        pass.set_pipeline(&self.dispatch_args_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(1, 1, 1);
    }
}

/// CPU mirror of the shader's depth key packing, for tests and debugging:
/// 24 bits of quantized depth over an 8-bit reversed index tail.
pub(crate) fn packed_depth_key(z: f32, near: f32, far: f32, index: u32) -> u32 {
    let normalized = ((z - near) / (far - near)).clamp(0.0, 1.0);
    let quantized = (normalized * ((1u32 << 24) - 1) as f32) as u32;
    (quantized << 8) | (255 - (index & 0xff))
}

/// CPU mirror of the shader's bucket assignment: nearer splats get larger
/// bucket ids.
pub(crate) fn bucket_id(z: f32, near: f32, far: f32) -> u32 {
    let normalized = ((z - near) / (far - near)).clamp(0.0, 1.0);
    (((1.0 - normalized) * (NUM_BUCKETS - 1) as f32) as u32).min(NUM_BUCKETS - 1)
}
