use glam::UVec2;
use glimmer_gpu::PassParams;

use crate::renderer::buffers::FrameBuffers;
use crate::renderer::pass::ComputePass;
use crate::renderer::{FrameInputs, Shaders};
use crate::{MappedUniformBuffer, ReadableInput, Texture};

/// Bilateral edge-stopping blur; instantiated per denoiser slot, and a
/// second time per slot for the half-resolution-filter mode (same shader,
/// different payload and target).
#[derive(Debug)]
pub struct SpatialPass {
    pass: ComputePass,
}

impl SpatialPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        buffers: &FrameBuffers,
        inputs: &FrameInputs,
        label: &str,
        params: &MappedUniformBuffer<PassParams>,
        target: &Texture,
    ) -> Self {
        let pass = ComputePass::builder(label)
            .bind([
                &buffers.camera,
                &buffers.frame,
                params,
                &buffers.radiance[1].bind_sampled(),
                &ReadableInput {
                    view: &inputs.depth,
                },
                &ReadableInput {
                    view: &inputs.normals,
                },
                &buffers.points,
                &target.bind_writable(),
            ])
            .build(device, &shaders.spatial, "main");

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
