mod reproject;
mod spatial;
mod temporal;
mod trace;
mod upsample;
mod validate;

pub(crate) use self::reproject::*;
pub(crate) use self::spatial::*;
pub(crate) use self::temporal::*;
pub(crate) use self::trace::*;
pub(crate) use self::upsample::*;
pub(crate) use self::validate::*;

use super::buffers::FrameBuffers;
use super::{FrameInputs, Shaders};
use crate::Texture;

/// All compute passes of one renderer, wired to one [`FrameBuffers`] set and
/// one [`FrameInputs`] set; rebuilt together with the buffers.
#[derive(Debug)]
pub struct Passes {
    pub trace: TracePass,
    pub reproject: ReprojectPass,
    pub validate: ValidatePass,
    pub temporal: [TemporalPass; 2],
    pub spatial: [SpatialPass; 2],
    pub spatial_half: [SpatialPass; 2],
    pub gather: UpsamplePass,
    pub upsample: UpsamplePass,
}

impl Passes {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        buffers: &FrameBuffers,
        inputs: &FrameInputs,
        output: &Texture,
        sampler: &wgpu::Sampler,
    ) -> Self {
        Self {
            trace: TracePass::new(device, shaders, buffers, inputs),
            reproject: ReprojectPass::new(
                device, shaders, buffers, inputs, sampler,
            ),
            validate: ValidatePass::new(device, shaders, buffers, inputs),
            temporal: [
                TemporalPass::new(device, shaders, buffers, inputs, 0),
                TemporalPass::new(device, shaders, buffers, inputs, 1),
            ],
            spatial: [
                SpatialPass::new(
                    device,
                    shaders,
                    buffers,
                    inputs,
                    "spatial_0",
                    &buffers.spatial_params[0],
                    &buffers.radiance[0],
                ),
                SpatialPass::new(
                    device,
                    shaders,
                    buffers,
                    inputs,
                    "spatial_1",
                    &buffers.spatial_params[1],
                    &buffers.radiance[0],
                ),
            ],
            spatial_half: [
                SpatialPass::new(
                    device,
                    shaders,
                    buffers,
                    inputs,
                    "spatial_half_0",
                    &buffers.spatial_half_params[0],
                    &buffers.half_radiance,
                ),
                SpatialPass::new(
                    device,
                    shaders,
                    buffers,
                    inputs,
                    "spatial_half_1",
                    &buffers.spatial_half_params[1],
                    &buffers.half_radiance,
                ),
            ],
            gather: UpsamplePass::new(
                device,
                shaders,
                buffers,
                inputs,
                "gather",
                &buffers.gather_params,
                &buffers.half_radiance,
                &buffers.radiance[0],
            ),
            upsample: UpsamplePass::new(
                device,
                shaders,
                buffers,
                inputs,
                "upsample",
                &buffers.upsample_params,
                &buffers.radiance[0],
                output,
            ),
        }
    }
}
