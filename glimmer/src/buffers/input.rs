use super::Bindable;

/// Binds an externally-owned texture view as a filterable texture plus
/// sampler; used for the previous-frame color pyramid.
pub struct SampledInput<'a> {
    pub view: &'a wgpu::TextureView,
    pub sampler: &'a wgpu::Sampler,
}

impl Bindable for SampledInput<'_> {
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

        vec![
            (tex_layout, wgpu::BindingResource::TextureView(self.view)),
            (sampler_layout, wgpu::BindingResource::Sampler(self.sampler)),
        ]
    }
}

/// Binds an externally-owned texture view as a non-filterable texture; used
/// for the depth pyramid, normals and motion vectors.
pub struct ReadableInput<'a> {
    pub view: &'a wgpu::TextureView,
}

impl Bindable for ReadableInput<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
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

        vec![(layout, wgpu::BindingResource::TextureView(self.view))]
    }
}
