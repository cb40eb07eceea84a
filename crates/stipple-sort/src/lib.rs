use stipple_kernel::{
    calc_workgroup_count_1d, create_shader, dynamic_uniform_entry, storage_entry, uniform_stride,
};

/// Comparator steps recorded into one compute pass, to amortize pass setup
/// over the many tiny bitonic dispatches.
pub const STEPS_PER_PASS: usize = 16;

const WORKGROUP_SIZE: u32 = 256;

/// One `(k, j)` step of the bitonic network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStep {
    pub k: u32,
    pub j: u32,
}

/// Enumerate the full bitonic network over `padded_len` (a power of two):
/// `k = 2, 4, .., padded_len`, and for each `k`, `j = k/2, k/4, .., 1`.
pub fn sort_steps(padded_len: u32) -> Vec<SortStep> {
    assert!(
        padded_len.is_power_of_two(),
        "bitonic network needs a power-of-two span"
    );

    let mut steps = vec![];
    let mut k = 2;
    while k <= padded_len {
        let mut j = k / 2;
        while j >= 1 {
            steps.push(SortStep { k, j });
            j /= 2;
        }
        k *= 2;
    }
    steps
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SortParams {
    k: u32,
    j: u32,
    _pad0: u32,
    _pad1: u32,
}

/// Moves each visible entry into its depth bucket's contiguous range.
///
/// Buckets were sized by the histogram and positioned by the prefix sum;
/// a per-bucket atomic cursor hands out slots within the range. The result
/// is a permutation of the visible entries, partitioned by bucket.
pub struct ScatterPass {
    reset_pipeline: wgpu::ComputePipeline,
    scatter_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl ScatterPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scatter bind group layout"),
                entries: &[
                    storage_entry(0, wgpu::ShaderStages::COMPUTE, true),
                    storage_entry(1, wgpu::ShaderStages::COMPUTE, true),
                    storage_entry(2, wgpu::ShaderStages::COMPUTE, true),
                    storage_entry(3, wgpu::ShaderStages::COMPUTE, true),
                    storage_entry(4, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(5, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(6, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(7, wgpu::ShaderStages::COMPUTE, true),
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scatter pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = create_shader(device, "scatter shader", include_str!("shaders/scatter.wgsl"));

        let reset_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("reset bucket positions pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("reset_positions"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let scatter_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("scatter pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("scatter"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            reset_pipeline,
            scatter_pipeline,
            bind_group_layout,
        }
    }

    pub fn bind(
        &self,
        device: &wgpu::Device,
        visible_indices: &wgpu::Buffer,
        visible_depths: &wgpu::Buffer,
        visible_buckets: &wgpu::Buffer,
        bucket_offsets: &wgpu::Buffer,
        bucket_positions: &wgpu::Buffer,
        sorted_indices: &wgpu::Buffer,
        sorted_depths: &wgpu::Buffer,
        visible_count: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let buffers = [
            visible_indices,
            visible_depths,
            visible_buckets,
            bucket_offsets,
            bucket_positions,
            sorted_indices,
            sorted_depths,
            visible_count,
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
            label: Some("scatter bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    /// Record the cursor reset followed by the scatter itself. The scatter is
    /// dispatched indirectly so it covers exactly the visible prefix.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_group: &wgpu::BindGroup,
        num_buckets: u32,
        dispatch_args: &wgpu::Buffer,
    ) {
        let _span = tracing::trace_span!("Scatter").entered();

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("scatter pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.reset_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        let [x, y, z] = calc_workgroup_count_1d(num_buckets, WORKGROUP_SIZE);
        pass.dispatch_workgroups(x, y, z);

        pass.set_pipeline(&self.scatter_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups_indirect(dispatch_args, 0);
    }
}

/// Step parameters for the whole bitonic network, packed at the device's
/// dynamic-offset stride so each step binds its own slice.
pub struct SortStepUniforms {
    buffer: wgpu::Buffer,
    offsets: Vec<u32>,
}

impl SortStepUniforms {
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}

/// In-place bitonic sort of the packed depth keys over the visible prefix,
/// with the splat indices moved in lockstep.
///
/// The step count depends only on the padded capacity, so all step uniforms
/// are precomputed at load time; per frame the steps are recorded back to
/// back as indirect dispatches sized by the GPU-side visible count.
pub struct BitonicSortPass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl BitonicSortPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("bitonic sort bind group layout"),
                entries: &[
                    dynamic_uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                    storage_entry(1, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(2, wgpu::ShaderStages::COMPUTE, false),
                    storage_entry(3, wgpu::ShaderStages::COMPUTE, true),
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bitonic sort pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = create_shader(
            device,
            "bitonic sort shader",
            include_str!("shaders/bitonic_sort.wgsl"),
        );

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("bitonic sort pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("sort_step"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Precompute the step uniforms for a buffer of `capacity` entries. The
    /// network spans the next power of two at or above the capacity.
    pub fn create_step_uniforms(&self, device: &wgpu::Device, capacity: u32) -> SortStepUniforms {
        let padded = capacity.max(2).next_power_of_two();
        let steps = sort_steps(padded);
        let stride = uniform_stride(device, std::mem::size_of::<SortParams>() as u64);

        let mut data = vec![0u8; stride as usize * steps.len()];
        let mut offsets = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let at = i * stride as usize;
            let params = SortParams {
                k: step.k,
                j: step.j,
                _pad0: 0,
                _pad1: 0,
            };
            data[at..at + std::mem::size_of::<SortParams>()]
                .copy_from_slice(bytemuck::bytes_of(&params));
            offsets.push(at as u32);
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("bitonic sort step uniforms"),
            size: data.len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(&data);
        buffer.unmap();

        SortStepUniforms { buffer, offsets }
    }

    pub fn bind(
        &self,
        device: &wgpu::Device,
        step_uniforms: &SortStepUniforms,
        sorted_depths: &wgpu::Buffer,
        sorted_indices: &wgpu::Buffer,
        visible_count: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bitonic sort bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &step_uniforms.buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<SortParams>() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sorted_depths.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: sorted_indices.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: visible_count.as_entire_binding(),
                },
            ],
        })
    }

    /// Record every step of the network, batched into compute passes of
    /// [`STEPS_PER_PASS`] dispatches.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_group: &wgpu::BindGroup,
        step_uniforms: &SortStepUniforms,
        dispatch_args: &wgpu::Buffer,
    ) {
        let _span = tracing::trace_span!("Bitonic sort").entered();

        for chunk in step_uniforms.offsets.chunks(STEPS_PER_PASS) {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("bitonic sort pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            for &offset in chunk {
                pass.set_bind_group(0, bind_group, &[offset]);
                pass.dispatch_workgroups_indirect(dispatch_args, 0);
            }
        }
    }
}
