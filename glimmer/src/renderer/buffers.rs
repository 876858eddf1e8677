use glam::{UVec2, Vec2};
use glimmer_gpu::{
    CameraParams, FrameParams, PassParams, PointDistribution,
    POINT_DISTRIBUTION_SIZE,
};

use crate::{DoubleBuffered, MappedUniformBuffer, StorageBuffer, Texture};

/// GPU resources at one working resolution; rebuilt whenever the working
/// resolution or scale changes (which also discards history, by design).
#[derive(Debug)]
pub struct FrameBuffers {
    pub camera: MappedUniformBuffer<CameraParams>,
    pub frame: MappedUniformBuffer<FrameParams>,

    /// Full-rate spatial-filter payloads, one per denoiser instance.
    pub spatial_params: [MappedUniformBuffer<PassParams>; 2],

    /// Half-rate spatial-filter payloads, one per denoiser instance.
    pub spatial_half_params: [MappedUniformBuffer<PassParams>; 2],

    pub gather_params: MappedUniformBuffer<PassParams>,
    pub upsample_params: MappedUniformBuffer<PassParams>,

    pub points: StorageBuffer<Vec2>,

    /// Packed hit points; rgba32float so the bit-packed validity flag
    /// survives the round trip.
    pub hits: Texture,

    /// Radiance ping-pong pair: even stages write `[0]`, the temporal stage
    /// reads `[0]` and writes `[1]`.
    pub radiance: [Texture; 2],

    /// Intermediate target of the half-resolution spatial filter.
    pub half_radiance: Texture,

    pub validation: Texture,

    /// Persistent per-slot history, parity double-buffered.
    pub history: [DoubleBuffered<Texture>; 2],
}

impl FrameBuffers {
    pub fn new(device: &wgpu::Device, working_size: UVec2) -> Self {
        log::debug!("Allocating frame buffers; working-size={working_size:?}");

        let half_size = (working_size / 2).max(UVec2::ONE);

        let color = wgpu::TextureFormat::Rgba16Float;

        Self {
            camera: MappedUniformBuffer::new(
                device,
                "glimmer_camera",
                Default::default(),
            ),
            frame: MappedUniformBuffer::new(
                device,
                "glimmer_frame",
                Default::default(),
            ),
            spatial_params: [
                MappedUniformBuffer::new(
                    device,
                    "glimmer_spatial_params_0",
                    Default::default(),
                ),
                MappedUniformBuffer::new(
                    device,
                    "glimmer_spatial_params_1",
                    Default::default(),
                ),
            ],
            spatial_half_params: [
                MappedUniformBuffer::new(
                    device,
                    "glimmer_spatial_half_params_0",
                    Default::default(),
                ),
                MappedUniformBuffer::new(
                    device,
                    "glimmer_spatial_half_params_1",
                    Default::default(),
                ),
            ],
            gather_params: MappedUniformBuffer::new(
                device,
                "glimmer_gather_params",
                Default::default(),
            ),
            upsample_params: MappedUniformBuffer::new(
                device,
                "glimmer_upsample_params",
                Default::default(),
            ),
            points: StorageBuffer::new(
                device,
                "glimmer_points",
                PointDistribution::generate(POINT_DISTRIBUTION_SIZE)
                    .raw()
                    .to_vec(),
            ),
            hits: Texture::new(
                device,
                "glimmer_hits",
                working_size,
                wgpu::TextureFormat::Rgba32Float,
            ),
            radiance: [
                Texture::new(device, "glimmer_radiance_0", working_size, color),
                Texture::new(device, "glimmer_radiance_1", working_size, color),
            ],
            half_radiance: Texture::new(
                device,
                "glimmer_half_radiance",
                half_size,
                color,
            ),
            validation: Texture::new(
                device,
                "glimmer_validation",
                working_size,
                wgpu::TextureFormat::R32Float,
            ),
            history: [
                DoubleBuffered::new(
                    device,
                    "glimmer_history_primary",
                    working_size,
                    color,
                ),
                DoubleBuffered::new(
                    device,
                    "glimmer_history_second",
                    working_size,
                    color,
                ),
            ],
        }
    }

    pub fn working_size(&self) -> UVec2 {
        self.hits.size()
    }
}
