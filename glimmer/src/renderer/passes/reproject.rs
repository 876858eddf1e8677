use glam::UVec2;

use crate::renderer::buffers::FrameBuffers;
use crate::renderer::pass::ComputePass;
use crate::renderer::{FrameInputs, Shaders};
use crate::SampledInput;

/// Samples last frame's color pyramid at the hit points, producing the raw
/// radiance estimate.
#[derive(Debug)]
pub struct ReprojectPass {
    pass: ComputePass,
}

impl ReprojectPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        buffers: &FrameBuffers,
        inputs: &FrameInputs,
        sampler: &wgpu::Sampler,
    ) -> Self {
        // The short-circuit in the renderer guarantees the pyramid is there
        // by the time any pass is built
        let prev_color = inputs
            .prev_color
            .as_ref()
            .unwrap_or(&inputs.normals);

        let pass = ComputePass::builder("reproject")
            .bind([
                &buffers.camera,
                &buffers.frame,
                &buffers.hits.bind_readable(),
                &SampledInput {
                    view: prev_color,
                    sampler,
                },
                &buffers.radiance[0].bind_writable(),
            ])
            .build(device, &shaders.reproject, "main");

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
