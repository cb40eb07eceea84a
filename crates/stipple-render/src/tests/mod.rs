
pub(crate) struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Acquire a device, or `None` so tests skip on machines without a GPU.
pub(crate) fn create_context() -> Option<GpuContext> {
    let _ = env_logger::builder().is_test(true).try_init();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;
    let (device, queue) =
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None)).ok()?;
    Some(GpuContext { device, queue })
}

pub(crate) fn read_buffer_u32(ctx: &GpuContext, buffer: &wgpu::Buffer, count: usize) -> Vec<u32> {
    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: (count * 4) as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, (count * 4) as u64);
    ctx.queue.submit([encoder.finish()]);

    let (tx, rx) = std::sync::mpsc::channel();
    staging
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |res| {
            tx.send(res).expect("readback channel closed");
        });
    let _ = ctx.device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .expect("readback channel closed")
        .expect("failed to map readback buffer");

    bytemuck::cast_slice(&staging.slice(..).get_mapped_range()).to_vec()
}

/// Read back an rgba8 render target as raw bytes, row-major.
pub(crate) fn read_texture_rgba8(
    ctx: &GpuContext,
    texture: &wgpu::Texture,
    size: u32,
) -> Vec<u8> {
    let bytes_per_row = size * 4;
    assert_eq!(bytes_per_row % 256, 0, "test texture rows must be copy-aligned");

    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("texture readback"),
        size: u64::from(bytes_per_row * size),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: None,
            },
        },
        wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit([encoder.finish()]);

    let (tx, rx) = std::sync::mpsc::channel();
    staging
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |res| {
            tx.send(res).expect("readback channel closed");
        });
    let _ = ctx.device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .expect("readback channel closed")
        .expect("failed to map readback buffer");

    staging.slice(..).get_mapped_range().to_vec()
}
