use glam::UVec2;
use glimmer_gpu::PassParams;

use crate::renderer::buffers::FrameBuffers;
use crate::renderer::pass::ComputePass;
use crate::renderer::{FrameInputs, Shaders};
use crate::{MappedUniformBuffer, ReadableInput, Texture};

/// Depth-aware 2x2 upsample; one instance gathers the half-resolution
/// filter output back to the working resolution, another resolves the
/// working resolution up to the screen.
#[derive(Debug)]
pub struct UpsamplePass {
    pass: ComputePass,
}

impl UpsamplePass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        buffers: &FrameBuffers,
        inputs: &FrameInputs,
        label: &str,
        params: &MappedUniformBuffer<PassParams>,
        source: &Texture,
        target: &Texture,
    ) -> Self {
        let pass = ComputePass::builder(label)
            .bind([
                &buffers.camera,
                &buffers.frame,
                params,
                &source.bind_readable(),
                &ReadableInput {
                    view: &inputs.depth,
                },
                &target.bind_writable(),
            ])
            .build(device, &shaders.upsample, "main");

        Self { pass }
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        size: UVec2,
        alternate: bool,
    ) {
        self.pass.run(encoder, size, alternate);
    }
}
