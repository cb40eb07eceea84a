use crate::{
    RenderError,
    bounding_box::BoundingBox,
    camera::Camera,
    config::{BackendVariant, RenderConfig},
    culling::CullBinPass,
    indirect::IndirectArgsPass,
    rasterize::SplatRasterizer,
    splats::Splats,
    uniforms::RenderUniforms,
};
use glam::UVec2;
use stipple_kernel::create_storage_buffer;
use stipple_prefix_sum::{NUM_BUCKETS, PrefixSumPass};
use stipple_sort::{BitonicSortPass, ScatterPass, SortStepUniforms};

/// The per-frame arrays, allocated once at the splat-count capacity and
/// overwritten every frame.
pub(crate) struct FrameBuffers {
    pub visible_indices: wgpu::Buffer,
    pub visible_depths: wgpu::Buffer,
    pub visible_buckets: wgpu::Buffer,
    pub bucket_counts: wgpu::Buffer,
    pub bucket_offsets: wgpu::Buffer,
    pub bucket_positions: wgpu::Buffer,
    pub sorted_indices: wgpu::Buffer,
    pub sorted_depths: wgpu::Buffer,
    pub visible_count: wgpu::Buffer,
    pub draw_args: wgpu::Buffer,
    pub dispatch_args: wgpu::Buffer,
}

impl FrameBuffers {
    fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let per_splat = u64::from(capacity) * 4;
        let per_bucket = u64::from(NUM_BUCKETS) * 4;
        // COPY_SRC so tests and debug tooling can read intermediate state.
        let readable = wgpu::BufferUsages::COPY_SRC;

        Self {
            visible_indices: create_storage_buffer(device, "visible indices", per_splat, readable),
            visible_depths: create_storage_buffer(device, "visible depths", per_splat, readable),
            visible_buckets: create_storage_buffer(device, "visible buckets", per_splat, readable),
            bucket_counts: create_storage_buffer(device, "bucket counts", per_bucket, readable),
            bucket_offsets: create_storage_buffer(device, "bucket offsets", per_bucket, readable),
            bucket_positions: create_storage_buffer(device, "bucket positions", per_bucket, readable),
            sorted_indices: create_storage_buffer(device, "sorted indices", per_splat, readable),
            sorted_depths: create_storage_buffer(device, "sorted depths", per_splat, readable),
            visible_count: create_storage_buffer(device, "visible count", 4, readable),
            draw_args: create_storage_buffer(
                device,
                "draw indirect args",
                16,
                wgpu::BufferUsages::INDIRECT | readable,
            ),
            dispatch_args: create_storage_buffer(
                device,
                "dispatch indirect args",
                12,
                wgpu::BufferUsages::INDIRECT | readable,
            ),
        }
    }
}

/// The full-quality splat renderer: owns the pipelines, the per-frame
/// arrays and the loaded cloud, and appends one frame's worth of passes to a
/// caller-owned encoder.
///
/// Frame sequence: write uniforms ([`Self::prepare`]), then
/// ([`Self::encode`]) clear counters, cull & bin, prefix-sum the histogram,
/// scatter into bucket ranges, write the draw args, run the bitonic steps,
/// and finally ([`Self::render`]) one indirect draw in sorted order. A frame
/// always runs to completion once begun; there is no cancellation.
pub struct SplatRenderer {
    cull: CullBinPass,
    prefix_sum: PrefixSumPass,
    scatter: ScatterPass,
    sort: BitonicSortPass,
    indirect: IndirectArgsPass,
    rasterizer: SplatRasterizer,

    splats: Splats,
    config: RenderConfig,
    uniforms: wgpu::Buffer,
    buffers: FrameBuffers,
    step_uniforms: SortStepUniforms,

    cull_bind: wgpu::BindGroup,
    prefix_bind: wgpu::BindGroup,
    scatter_bind: wgpu::BindGroup,
    sort_bind: wgpu::BindGroup,
    indirect_bind: wgpu::BindGroup,
    raster_bind: wgpu::BindGroup,
}

impl SplatRenderer {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        splats: Splats,
        config: RenderConfig,
    ) -> Result<Self, RenderError> {
        if config.variant != BackendVariant::Full {
            return Err(RenderError::UnsupportedBackend);
        }

        let cull = CullBinPass::new(device);
        let prefix_sum = PrefixSumPass::new(device);
        let scatter = ScatterPass::new(device);
        let sort = BitonicSortPass::new(device);
        let indirect = IndirectArgsPass::new(device);
        let rasterizer = SplatRasterizer::new(device, target_format);

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("render uniforms"),
            size: std::mem::size_of::<RenderUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let buffers = FrameBuffers::new(device, splats.num_splats());
        let step_uniforms = sort.create_step_uniforms(device, splats.num_splats());

        let cull_bind = cull.bind(
            device,
            &uniforms,
            splats.buffer(),
            &buffers.visible_indices,
            &buffers.visible_depths,
            &buffers.visible_buckets,
            &buffers.bucket_counts,
            &buffers.visible_count,
            &buffers.dispatch_args,
        );
        let prefix_bind = prefix_sum.bind(device, &buffers.bucket_counts, &buffers.bucket_offsets);
        let scatter_bind = scatter.bind(
            device,
            &buffers.visible_indices,
            &buffers.visible_depths,
            &buffers.visible_buckets,
            &buffers.bucket_offsets,
            &buffers.bucket_positions,
            &buffers.sorted_indices,
            &buffers.sorted_depths,
            &buffers.visible_count,
        );
        let sort_bind = sort.bind(
            device,
            &step_uniforms,
            &buffers.sorted_depths,
            &buffers.sorted_indices,
            &buffers.visible_count,
        );
        let indirect_bind = indirect.bind(device, &buffers.visible_count, &buffers.draw_args);
        let raster_bind = rasterizer.bind(
            device,
            &uniforms,
            splats.buffer(),
            &buffers.sorted_indices,
        );

        Ok(Self {
            cull,
            prefix_sum,
            scatter,
            sort,
            indirect,
            rasterizer,
            splats,
            config,
            uniforms,
            buffers,
            step_uniforms,
            cull_bind,
            prefix_bind,
            scatter_bind,
            sort_bind,
            indirect_bind,
            raster_bind,
        })
    }

    /// Write the frame's uniform block. Must happen before [`Self::encode`]
    /// for the passes to observe the current camera and transform.
    pub fn prepare(&self, queue: &wgpu::Queue, camera: &Camera, viewport: UVec2) {
        let uniforms = RenderUniforms::new(camera, &self.splats, &self.config, viewport);
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Append the frame's compute passes to `encoder`. With an empty cloud
    /// only the clears and the draw-args write run.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let _span = tracing::trace_span!("Encode splat frame").entered();

        self.cull.record_clear(encoder, &self.cull_bind);

        if self.splats.num_splats() > 0 {
            self.cull
                .record(encoder, &self.cull_bind, self.splats.num_splats());
            self.prefix_sum.record(encoder, &self.prefix_bind);
            self.scatter.record(
                encoder,
                &self.scatter_bind,
                NUM_BUCKETS,
                &self.buffers.dispatch_args,
            );
            self.indirect.record(encoder, &self.indirect_bind);
            self.sort.record(
                encoder,
                &self.sort_bind,
                &self.step_uniforms,
                &self.buffers.dispatch_args,
            );
        } else {
            self.indirect.record(encoder, &self.indirect_bind);
        }
    }

    /// Begin a render pass over `target` (loading its contents) and draw the
    /// sorted splats into it.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("splat render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.draw(&mut pass);
    }

    /// Draw into a render pass the caller already opened, for compositing
    /// with other passes on the same target.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.rasterizer
            .draw(pass, &self.raster_bind, &self.buffers.draw_args);
    }

    pub fn splats(&self) -> &Splats {
        &self.splats
    }

    /// Mutable access for the transform proxies; takes effect at the next
    /// [`Self::prepare`].
    pub fn splats_mut(&mut self) -> &mut Splats {
        &mut self.splats
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    pub fn num_splats(&self) -> u32 {
        self.splats.num_splats()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.splats.bounding_box()
    }

    #[cfg(test)]
    pub(crate) fn frame_buffers(&self) -> &FrameBuffers {
        &self.buffers
    }
}
