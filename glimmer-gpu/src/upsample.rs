use glam::{IVec2, UVec2, Vec2, Vec4};

use crate::{CameraParams, TexelGrid};

/// Relative depth difference above which a low-resolution tap stops
/// representing the full-resolution pixel.
const DEPTH_REJECTION: f32 = 0.1;

/// Depth-aware bilateral upsampler from the half working resolution back to
/// full resolution; a fixed 2x2 tap pattern with distance-based weights.
pub struct Upsampler<'a> {
    pub camera: &'a CameraParams,

    /// Low-resolution radiance.
    pub source: &'a TexelGrid,

    /// Depth at the low resolution.
    pub source_depth: &'a TexelGrid,

    /// Depth at the full resolution.
    pub target_depth: &'a TexelGrid,
}

impl Upsampler<'_> {
    pub fn upsample(&self, screen_pos: UVec2) -> Vec4 {
        let scale =
            self.source.size().as_vec2() / self.target_depth.size().as_vec2();

        let src = (screen_pos.as_vec2() + 0.5) * scale - 0.5;
        let base = src.floor();
        let frac = src - base;
        let base = base.as_ivec2();

        let bilinear = [
            (1.0 - frac.x) * (1.0 - frac.y),
            frac.x * (1.0 - frac.y),
            (1.0 - frac.x) * frac.y,
            frac.x * frac.y,
        ];

        let taps = [
            IVec2::new(0, 0),
            IVec2::new(1, 0),
            IVec2::new(0, 1),
            IVec2::new(1, 1),
        ];

        let target_linear = self
            .camera
            .linearize_depth(self.target_depth.read(screen_pos).x);

        let mut sum = Vec4::ZERO;
        let mut weight_sum = 0.0;
        let mut nearest = Vec4::ZERO;
        let mut nearest_delta = f32::MAX;

        for (tap, bilinear) in taps.into_iter().zip(bilinear) {
            let pos = base + tap;
            let sample = self.source.read_clamped(pos);

            let source_linear = self
                .camera
                .linearize_depth(self.source_depth.read_clamped(pos).x);

            let delta = (source_linear - target_linear).abs()
                / target_linear.max(1e-3);

            if delta < nearest_delta {
                nearest_delta = delta;
                nearest = sample;
            }

            let depth_weight = (-delta / DEPTH_REJECTION).exp();
            let weight = bilinear * depth_weight;

            sum += sample * weight;
            weight_sum += weight;
        }

        if weight_sum > 1e-6 {
            sum / weight_sum
        } else {
            // Every tap straddles a depth discontinuity; fall back to the
            // geometrically closest one
            nearest
        }
    }

    pub fn upsample_into(&self, out: &mut TexelGrid) {
        let size = out.size();

        for y in 0..size.y {
            for x in 0..size.x {
                let pos = UVec2::new(x, y);

                out.write(pos, self.upsample(pos));
            }
        }
    }
}

/// Downsamples a full-resolution grid 2x2 (used to derive half-resolution
/// depth/normal inputs when the pipeline runs at half rate). Depth keeps the
/// min of its footprint; everything else averages.
pub fn downsample_min(grid: &TexelGrid) -> TexelGrid {
    let size = (grid.size() / 2).max(UVec2::ONE);
    let mut out = TexelGrid::new(size);

    for y in 0..size.y {
        for x in 0..size.x {
            let base = UVec2::new(x, y) * 2;

            let d = grid
                .read(base)
                .x
                .min(grid.read(base + UVec2::new(1, 0)).x)
                .min(grid.read(base + UVec2::new(0, 1)).x)
                .min(grid.read(base + UVec2::new(1, 1)).x);

            out.write(UVec2::new(x, y), Vec4::new(d, 0.0, 0.0, 0.0));
        }
    }

    out
}

pub fn downsample_average(grid: &TexelGrid) -> TexelGrid {
    let size = (grid.size() / 2).max(UVec2::ONE);
    let mut out = TexelGrid::new(size);

    for y in 0..size.y {
        for x in 0..size.x {
            let base = UVec2::new(x, y) * 2;

            let sum = grid.read(base)
                + grid.read(base + UVec2::new(1, 0))
                + grid.read(base + UVec2::new(0, 1))
                + grid.read(base + UVec2::new(1, 1));

            out.write(UVec2::new(x, y), sum * 0.25);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec4, Mat4, UVec2, Vec3};

    use super::*;

    fn camera(size: UVec2) -> CameraParams {
        let fov_y = std::f32::consts::FRAC_PI_2;

        CameraParams::new(
            Mat4::perspective_rh(fov_y, 1.0, 0.1, 100.0),
            size,
            0.1,
            100.0,
            fov_y,
        )
    }

    #[test]
    fn flat_input_is_the_identity() {
        let full = uvec2(16, 16);
        let half = uvec2(8, 8);
        let camera = camera(full);

        let (_, depth) = camera.view_to_uv(Vec3::new(0.0, 0.0, -10.0));

        let source = TexelGrid::splat(half, vec4(0.4, 0.5, 0.6, 1.0));
        let source_depth =
            TexelGrid::splat(half, vec4(depth, 0.0, 0.0, 0.0));
        let target_depth =
            TexelGrid::splat(full, vec4(depth, 0.0, 0.0, 0.0));

        let upsampler = Upsampler {
            camera: &camera,
            source: &source,
            source_depth: &source_depth,
            target_depth: &target_depth,
        };

        let mut out = TexelGrid::new(full);

        upsampler.upsample_into(&mut out);

        for y in 0..full.y {
            for x in 0..full.x {
                let v = out.read(uvec2(x, y));

                // Weights sum to one: no energy gain or loss
                assert_relative_eq!(0.4, v.x, epsilon = 1e-5);
                assert_relative_eq!(0.5, v.y, epsilon = 1e-5);
                assert_relative_eq!(0.6, v.z, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn respects_depth_discontinuities() {
        let full = uvec2(16, 16);
        let half = uvec2(8, 8);
        let camera = camera(full);

        let (_, near) = camera.view_to_uv(Vec3::new(0.0, 0.0, -2.0));
        let (_, far) = camera.view_to_uv(Vec3::new(0.0, 0.0, -50.0));

        // Low res: left half near+bright, right half far+dark
        let mut source = TexelGrid::new(half);
        let mut source_depth = TexelGrid::new(half);

        for y in 0..half.y {
            for x in 0..half.x {
                let (d, r) = if x < half.x / 2 {
                    (near, vec4(1.0, 1.0, 1.0, 1.0))
                } else {
                    (far, vec4(0.0, 0.0, 0.0, 1.0))
                };

                source_depth.write(uvec2(x, y), vec4(d, 0.0, 0.0, 0.0));
                source.write(uvec2(x, y), r);
            }
        }

        // Full-res pixel right at the seam, belonging to the far surface
        let target_depth =
            TexelGrid::splat(full, vec4(far, 0.0, 0.0, 0.0));

        let upsampler = Upsampler {
            camera: &camera,
            source: &source,
            source_depth: &source_depth,
            target_depth: &target_depth,
        };

        let out = upsampler.upsample(uvec2(8, 8));

        assert!(out.x < 0.05, "bright near-surface taps leaked: {}", out.x);
    }

    #[test]
    fn min_downsample_keeps_closest_depth() {
        let mut grid = TexelGrid::splat(uvec2(4, 4), vec4(0.9, 0.0, 0.0, 0.0));

        grid.write(uvec2(1, 1), vec4(0.3, 0.0, 0.0, 0.0));

        let half = downsample_min(&grid);

        assert_eq!(0.3, half.read(uvec2(0, 0)).x);
        assert_eq!(0.9, half.read(uvec2(1, 1)).x);
    }
}
