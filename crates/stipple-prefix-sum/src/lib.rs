use stipple_kernel::{create_shader, storage_entry};

/// Number of depth buckets the binning pass distributes visible splats over.
///
/// Must match `NUM_BUCKETS` in `shaders/prefix_sum.wgsl`.
pub const NUM_BUCKETS: u32 = 128;

/// Exclusive scan over the per-bucket visible counts.
///
/// Turns the bucket histogram written by the cull pass into bucket start
/// offsets: `offsets[0] = 0`, `offsets[i] = counts[0] + .. + counts[i - 1]`,
/// so `offsets[B - 1] + counts[B - 1]` equals the total visible count.
pub struct PrefixSumPass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl PrefixSumPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prefix sum bind group layout"),
                entries: &[
                    storage_entry(0, wgpu::ShaderStages::COMPUTE, true),
                    storage_entry(1, wgpu::ShaderStages::COMPUTE, false),
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prefix sum pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = create_shader(
            device,
            "prefix sum shader",
            include_str!("shaders/prefix_sum.wgsl"),
        );

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("prefix sum pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("scan"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Bind the histogram and its output offsets. Both buffers must hold
    /// [`NUM_BUCKETS`] u32 values.
    pub fn bind(
        &self,
        device: &wgpu::Device,
        bucket_counts: &wgpu::Buffer,
        bucket_offsets: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prefix sum bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: bucket_counts.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: bucket_offsets.as_entire_binding(),
                },
            ],
        })
    }

    /// Record the scan: a single workgroup covering all buckets.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup) {
        let _span = tracing::trace_span!("Prefix sum").entered();

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("prefix sum pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(1, 1, 1);
    }
}
