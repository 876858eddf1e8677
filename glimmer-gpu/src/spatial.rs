use core::f32::consts::FRAC_PI_2;

use glam::{UVec2, Vec2, Vec4, Vec4Swizzles};

use crate::{rotate, CameraParams, TexelGrid, GOLDEN_ANGLE};

/// Number of offsets in the precomputed filter kernel.
pub const POINT_DISTRIBUTION_SIZE: usize = 16;

/// Sharpness of the normal similarity weight.
const NORMAL_WEIGHT_POWER: f32 = 8.0;

/// Precomputed low-discrepancy 2D offsets on the unit disk (Fibonacci
/// spiral); generated once per pipeline instance, on the first denoised
/// frame.
#[derive(Clone, Debug)]
pub struct PointDistribution {
    points: Vec<Vec2>,
}

impl PointDistribution {
    pub fn generate(count: usize) -> Self {
        let points = (0..count)
            .map(|i| {
                let radius = ((i as f32 + 0.5) / count as f32).sqrt();
                let angle = i as f32 * GOLDEN_ANGLE;

                rotate(Vec2::new(radius, 0.0), angle)
            })
            .collect();

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the i-th offset, rotated into one of [`crate::JITTER_PERIOD`]
    /// fixed phases.
    ///
    /// Rotating the kernel across frames turns residual banding into
    /// temporally-stable noise that next frame's temporal pass removes.
    pub fn point(&self, i: usize, jitter_phase: Option<u32>) -> Vec2 {
        let point = self.points[i];

        match jitter_phase {
            Some(phase) => rotate(point, phase as f32 * FRAC_PI_2),
            None => point,
        }
    }

    pub fn raw(&self) -> &[Vec2] {
        &self.points
    }
}

/// Edge-stopping bilateral blur driven by the point distribution.
pub struct BilateralFilter<'a> {
    pub camera: &'a CameraParams,
    pub radiance: &'a TexelGrid,
    pub depth: &'a TexelGrid,
    pub normals: &'a TexelGrid,
    pub points: &'a PointDistribution,

    /// Filter radius in pixels at the filtered resolution.
    pub radius: f32,

    /// `Some(frame % 4)` when kernel jitter is enabled.
    pub jitter_phase: Option<u32>,
}

impl BilateralFilter<'_> {
    pub fn filter(&self, screen_pos: UVec2) -> Vec4 {
        let center = self.radiance.read(screen_pos);
        let center_depth = self.depth.read(screen_pos).x;
        let center_normal = self.normals.read(screen_pos).xyz();

        if center_depth >= 1.0 || center_normal.length_squared() < 1e-6 {
            return center;
        }

        let center_normal = center_normal.normalize();
        let center_linear = self.camera.linearize_depth(center_depth);
        let spread = self.camera.pixel_spread_angle_tangent();

        let sigma = (self.radius * 0.5).max(1e-3);

        let mut sum = center;
        let mut weight_sum = 1.0;

        for i in 0..self.points.len() {
            let offset = self.points.point(i, self.jitter_phase) * self.radius;
            let pos = screen_pos.as_vec2() + offset;
            let pos = pos.round().as_ivec2();

            if !self.radiance.contains(pos) {
                continue;
            }

            let pos = pos.as_uvec2();

            if pos == screen_pos {
                continue;
            }

            let sample_depth = self.depth.read(pos).x;
            let sample_normal = self.normals.read(pos).xyz();

            if sample_depth >= 1.0 || sample_normal.length_squared() < 1e-6 {
                continue;
            }

            let distance = offset.length().max(1.0);

            // Spatial falloff
            let spatial =
                (-offset.length_squared() / (2.0 * sigma * sigma)).exp();

            // Depth similarity, loosened with distance and pixel spread so
            // slanted surfaces do not reject their own neighbourhood
            let sample_linear = self.camera.linearize_depth(sample_depth);
            let tolerance = center_linear * spread * distance
                * crate::DEPTH_TOLERANCE_SCALE
                + 1e-3;
            let depth_weight =
                (-(sample_linear - center_linear).abs() / tolerance).exp();

            // Normal similarity
            let normal_weight = sample_normal
                .normalize()
                .dot(center_normal)
                .max(0.0)
                .powf(NORMAL_WEIGHT_POWER);

            let weight = spatial * depth_weight * normal_weight;

            sum += self.radiance.read(pos) * weight;
            weight_sum += weight;
        }

        sum / weight_sum
    }

    pub fn filter_into(&self, out: &mut TexelGrid) {
        let size = out.size();

        for y in 0..size.y {
            for x in 0..size.x {
                let pos = UVec2::new(x, y);

                out.write(pos, self.filter(pos));
            }
        }
    }
}
