use glam::UVec2;

use crate::renderer::buffers::FrameBuffers;
use crate::renderer::pass::ComputePass;
use crate::renderer::{FrameInputs, Shaders};
use crate::ReadableInput;

/// Writes the per-pixel history confidence mask.
///
/// When the host supplies no depth/normal history the pass still runs; the
/// renderer forces `history_validity` to zero then, so the stand-in bindings
/// are never actually compared.
#[derive(Debug)]
pub struct ValidatePass {
    pass: ComputePass,
}

impl ValidatePass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        buffers: &FrameBuffers,
        inputs: &FrameInputs,
    ) -> Self {
        let history_depth =
            inputs.history_depth.as_ref().unwrap_or(&inputs.depth);

        let history_normals =
            inputs.history_normals.as_ref().unwrap_or(&inputs.normals);

        let pass = ComputePass::builder("validate")
            .bind([
                &buffers.camera,
                &buffers.frame,
                &ReadableInput {
                    view: &inputs.depth,
                },
                &ReadableInput {
                    view: &inputs.normals,
                },
                &ReadableInput {
                    view: &inputs.motion,
                },
                &ReadableInput {
                    view: history_depth,
                },
                &ReadableInput {
                    view: history_normals,
                },
                &buffers.validation.bind_writable(),
            ])
            .build(device, &shaders.validate, "main");

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
