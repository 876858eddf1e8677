use glam::Vec3;
use glimmer_gpu::RayMissFallback;

/// User-facing knobs of the indirect-diffuse pipeline.
///
/// A config is never rejected; [`GiConfig::sanitized()`] clamps out-of-range
/// values and drops option combinations that make no sense.
#[derive(Clone, Debug, PartialEq)]
pub struct GiConfig {
    /// Master switch; when off the renderer emits black and dispatches
    /// nothing.
    pub enabled: bool,

    /// Runs the whole pipeline at half the screen resolution per axis and
    /// upsamples at the end.
    pub half_resolution: bool,

    /// Enables the temporal + spatial denoisers; when off, the raw
    /// reprojected estimate is the output.
    pub denoise: bool,

    /// Runs a second temporal + spatial pass on the output of the first,
    /// with half the filter radius and jitter off.
    pub second_denoiser_pass: bool,

    /// Radius of the spatial bilateral filter, in texels.
    pub filter_radius: f32,

    /// Temporal accumulation strength, `0.0 ..= 1.0`; higher values weigh
    /// history more.
    pub accumulation_factor: f32,

    /// Depth tolerance of the ray-march hit test, in linear-depth units.
    pub thickness: f32,

    /// Upper bound on ray-march iterations per pixel.
    pub ray_steps: u32,

    /// What a ray that escapes the screen contributes.
    pub ray_miss_fallback: RayMissFallback,

    /// Ambient estimate used by [`RayMissFallback::AmbientColor`].
    pub ambient: Vec3,

    /// Rotates the spatial filter kernel across frames.
    pub jitter_filter: bool,

    /// Runs the bilateral filter at half the working resolution with a
    /// depth-aware gather back.
    pub half_resolution_filter: bool,

    /// Allows tracing + reprojection to be scheduled on an async compute
    /// queue; only honored while denoising is active.
    pub async_compute: bool,
}

impl GiConfig {
    pub fn low() -> Self {
        Self {
            half_resolution: true,
            half_resolution_filter: true,
            ray_steps: 24,
            filter_radius: 8.0,
            ..Self::default()
        }
    }

    pub fn medium() -> Self {
        Self {
            half_resolution: true,
            ray_steps: 48,
            ..Self::default()
        }
    }

    pub fn high() -> Self {
        Self {
            second_denoiser_pass: true,
            ray_steps: 96,
            ..Self::default()
        }
    }

    /// Returns a copy with every field forced into its legal range.
    pub fn sanitized(&self) -> Self {
        let mut this = self.clone();

        this.filter_radius = this.filter_radius.clamp(1.0, 32.0);
        this.accumulation_factor = this.accumulation_factor.clamp(0.0, 1.0);
        this.thickness = this.thickness.max(0.0);
        this.ray_steps = this.ray_steps.clamp(1, 256);
        this.ambient = this.ambient.max(Vec3::ZERO);

        if !this.denoise {
            this.second_denoiser_pass = false;
        }

        this
    }

    pub fn resolution_scale(&self) -> f32 {
        if self.half_resolution {
            0.5
        } else {
            1.0
        }
    }
}

impl Default for GiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            half_resolution: false,
            denoise: true,
            second_denoiser_pass: false,
            filter_radius: 16.0,
            accumulation_factor: 0.5,
            thickness: 0.25,
            ray_steps: 64,
            ray_miss_fallback: RayMissFallback::Nothing,
            ambient: Vec3::ZERO,
            jitter_filter: true,
            half_resolution_filter: false,
            async_compute: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizing_clamps_ranges() {
        let config = GiConfig {
            filter_radius: 1000.0,
            accumulation_factor: -3.0,
            thickness: -1.0,
            ray_steps: 0,
            ambient: Vec3::splat(-1.0),
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.filter_radius, 32.0);
        assert_eq!(config.accumulation_factor, 0.0);
        assert_eq!(config.thickness, 0.0);
        assert_eq!(config.ray_steps, 1);
        assert_eq!(config.ambient, Vec3::ZERO);
    }

    #[test]
    fn second_pass_requires_denoising() {
        let config = GiConfig {
            denoise: false,
            second_denoiser_pass: true,
            ..Default::default()
        }
        .sanitized();

        assert!(!config.second_denoiser_pass);
    }

    #[test]
    fn presets_are_already_sane() {
        for config in [GiConfig::low(), GiConfig::medium(), GiConfig::high()] {
            assert_eq!(config, config.sanitized());
        }
    }
}
