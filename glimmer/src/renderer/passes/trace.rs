use glam::UVec2;

use crate::renderer::buffers::FrameBuffers;
use crate::renderer::pass::ComputePass;
use crate::renderer::{FrameInputs, Shaders};
use crate::ReadableInput;

/// Ray-marches the depth pyramid into the hit-point texture.
#[derive(Debug)]
pub struct TracePass {
    pass: ComputePass,
}

impl TracePass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        buffers: &FrameBuffers,
        inputs: &FrameInputs,
    ) -> Self {
        let pass = ComputePass::builder("trace")
            .bind([
                &buffers.camera,
                &buffers.frame,
                &ReadableInput {
                    view: &inputs.depth,
                },
                &ReadableInput {
                    view: &inputs.normals,
                },
                &buffers.hits.bind_writable(),
            ])
            .build(device, &shaders.trace, "main");

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
