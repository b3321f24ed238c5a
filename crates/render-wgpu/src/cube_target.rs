use crate::gpu::DEPTH_FORMAT;

/// Colour format of captured cube maps.
pub const CUBE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Six-layer colour texture plus the views needed to render into each face
/// and to sample the whole cube.
pub struct CubeRenderTarget {
    resolution: u32,
    _texture: wgpu::Texture,
    face_views: [wgpu::TextureView; 6],
    depth_view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl CubeRenderTarget {
    pub fn new(
        device: &wgpu::Device,
        resolution: u32,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let resolution = resolution.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cube_target"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CUBE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("cube_target_cube_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });

        let face_views = std::array::from_fn(|layer| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("cube_target_face_view"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: layer as u32,
                array_layer_count: Some(1),
                ..Default::default()
            })
        });

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cube_target_depth"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&Default::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cube_target_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        tracing::debug!(resolution, "cube target created");

        Self {
            resolution,
            _texture: texture,
            face_views,
            depth_view,
            bind_group,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn face_view(&self, layer: usize) -> &wgpu::TextureView {
        &self.face_views[layer]
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Bind group exposing the cube view and sampler to mirror materials.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
