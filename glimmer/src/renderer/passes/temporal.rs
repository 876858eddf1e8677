use glam::UVec2;

use crate::renderer::buffers::FrameBuffers;
use crate::renderer::pass::ComputePass;
use crate::renderer::{FrameInputs, Shaders};
use crate::ReadableInput;

/// Blends the raw estimate with validated history and commits the result
/// into this frame's history half; one instance per history slot.
#[derive(Debug)]
pub struct TemporalPass {
    pass: ComputePass,
}

impl TemporalPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        buffers: &FrameBuffers,
        inputs: &FrameInputs,
        slot: usize,
    ) -> Self {
        let history = &buffers.history[slot];

        let pass = ComputePass::builder(format!("temporal_{slot}"))
            .bind([
                &buffers.camera,
                &buffers.frame,
                &buffers.radiance[0].bind_readable(),
                &history.past().bind_sampled(),
                &buffers.validation.bind_readable(),
                &ReadableInput {
                    view: &inputs.motion,
                },
                &history.curr().bind_writable(),
                &buffers.radiance[1].bind_writable(),
            ])
            .build(device, &shaders.temporal, "main");

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
