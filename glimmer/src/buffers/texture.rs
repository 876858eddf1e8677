use glam::UVec2;

use super::Bindable;

/// Storage-capable 2D texture plus a sampler; the building block for every
/// internal pipeline resource.
#[derive(Debug)]
pub struct Texture {
    tex: wgpu::Texture,
    tex_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    size: UVec2,
    format: wgpu::TextureFormat,
}

impl Texture {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
        format: wgpu::TextureFormat,
    ) -> Self {
        let label = label.as_ref();

        log::debug!("Allocating texture `{label}`; size={size:?}");

        assert!(size.x > 0);
        assert!(size.y > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label}_tex")),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let tex_view = tex.create_view(&Default::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label}_sampler")),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            tex,
            tex_view,
            sampler,
            size,
            format,
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.tex_view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.tex
    }

    /// Clears the texture to zero through a no-op render pass; keeps us off
    /// the optional `CLEAR_TEXTURE` feature.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glimmer_clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.tex_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    /// Binds as texture + filtering sampler.
    pub fn bind_sampled(&self) -> SampledTexture {
        SampledTexture { parent: self }
    }

    /// Binds as a non-filterable texture, no sampler.
    pub fn bind_readable(&self) -> ReadableTexture {
        ReadableTexture { parent: self }
    }

    /// Binds as a write-only storage texture.
    pub fn bind_writable(&self) -> WritableTexture {
        WritableTexture { parent: self }
    }
}

pub struct SampledTexture<'a> {
    parent: &'a Texture,
}

impl Bindable for SampledTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let tex_layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: true,
                },
            },
            count: None,
        };

        let sampler_layout = wgpu::BindGroupLayoutEntry {
            binding: binding + 1,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Sampler(
                wgpu::SamplerBindingType::Filtering,
            ),
            count: None,
        };

        let tex_resource =
            wgpu::BindingResource::TextureView(&self.parent.tex_view);

        let sampler_resource =
            wgpu::BindingResource::Sampler(&self.parent.sampler);

        vec![
            (tex_layout, tex_resource),
            (sampler_layout, sampler_resource),
        ]
    }
}

pub struct ReadableTexture<'a> {
    parent: &'a Texture,
}

impl Bindable for ReadableTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let tex_layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: false,
                },
            },
            count: None,
        };

        let tex_resource =
            wgpu::BindingResource::TextureView(&self.parent.tex_view);

        vec![(tex_layout, tex_resource)]
    }
}

pub struct WritableTexture<'a> {
    parent: &'a Texture,
}

impl Bindable for WritableTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let tex_layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: self.parent.format,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };

        let tex_resource =
            wgpu::BindingResource::TextureView(&self.parent.tex_view);

        vec![(tex_layout, tex_resource)]
    }
}
