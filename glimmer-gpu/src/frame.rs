use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::{lerp, CameraParams};

/// Number of frames over which the spatial filter's jitter phases cycle.
pub const JITTER_PERIOD: u32 = 4;

/// Number of startup frames that blend with `accumulation_amount = 1.0`,
/// i.e. take the current estimate verbatim; otherwise the first frames would
/// smear whatever the freshly-allocated history buffer happens to contain.
pub const WARMUP_FRAMES: u32 = 3;

/// What a ray that leaves the screen (or exhausts its step budget) without
/// finding an occluder contributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RayMissFallback {
    /// Treat the miss as sky: no contribution.
    #[default]
    Nothing,

    /// Fall back to a flat ambient estimate.
    AmbientColor,
}

impl RayMissFallback {
    pub fn serialize(self) -> u32 {
        match self {
            Self::Nothing => 0,
            Self::AmbientColor => 1,
        }
    }

    pub fn deserialize(value: u32) -> Self {
        match value {
            1 => Self::AmbientColor,
            _ => Self::Nothing,
        }
    }
}

/// Per-frame scalar payload; recomputed every frame from the camera and the
/// volume configuration, immutable afterwards.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FrameParams {
    pub frame: u32,
    pub jitter_phase: u32,
    pub ray_steps: u32,
    pub miss_fallback: u32,
    pub thickness_scale: f32,
    pub thickness_bias: f32,
    pub exposure: f32,
    pub prev_exposure: f32,
    pub accumulation_amount: f32,
    pub history_validity: f32,
    pub resolution_scale: f32,
    pub filter_radius: f32,
    pub ambient: Vec4,
}

impl FrameParams {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        camera: &CameraParams,
        frame: u32,
        thickness: f32,
        accumulation_factor: f32,
        exposure: f32,
        prev_exposure: f32,
        history_validity: f32,
        resolution_scale: f32,
        ray_steps: u32,
        miss_fallback: RayMissFallback,
        filter_radius: f32,
        ambient: Vec3,
    ) -> Self {
        let near = camera.near();
        let far = camera.far();

        let thickness_scale = 1.0 / (1.0 + thickness);
        let thickness_bias =
            -near / (far - near) * (thickness * thickness_scale);

        Self {
            frame,
            jitter_phase: frame % JITTER_PERIOD,
            ray_steps,
            miss_fallback: miss_fallback.serialize(),
            thickness_scale,
            thickness_bias,
            exposure,
            prev_exposure,
            accumulation_amount: accumulation_amount(
                frame,
                accumulation_factor,
            ),
            history_validity,
            resolution_scale,
            filter_radius,
            ambient: ambient.extend(0.0),
        }
    }

    /// Compensation factor bringing last frame's radiance to this frame's
    /// exposure; applied once per last-frame source (the previous color
    /// during reprojection, the committed history during accumulation).
    pub fn exposure_ratio(&self) -> f32 {
        if self.exposure > 0.0 {
            self.prev_exposure / self.exposure
        } else {
            1.0
        }
    }

    pub fn miss_fallback(&self) -> RayMissFallback {
        RayMissFallback::deserialize(self.miss_fallback)
    }
}

/// Blend weight of the *current* frame during temporal accumulation;
/// `accumulation_factor = 0.0` disables history, `1.0` gives the longest
/// history (`2^-7`).
pub fn accumulation_amount(frame: u32, accumulation_factor: f32) -> f32 {
    if frame < WARMUP_FRAMES {
        1.0
    } else {
        2.0f32.powf(lerp(0.0, -7.0, accumulation_factor))
    }
}
