use glam::{UVec2, Vec4, Vec4Swizzles};

use crate::{FrameParams, TexelGrid};

/// Exponentially blends the raw radiance estimate with validated history.
///
/// The kernel only ever *reads* the history buffer; committing the blended
/// result into next frame's history is a separate copy performed by the
/// orchestrator, so the read and write targets stay distinct within a
/// dispatch.
pub struct TemporalAccumulator<'a> {
    pub params: &'a FrameParams,
    pub radiance: &'a TexelGrid,
    pub history: &'a TexelGrid,
    pub validation: &'a TexelGrid,
    pub motion: &'a TexelGrid,
}

impl TemporalAccumulator<'_> {
    pub fn accumulate(&self, screen_pos: UVec2) -> Vec4 {
        let current = self.radiance.read(screen_pos);

        if self.validation.read(screen_pos).x < 0.5 {
            // Untrustworthy history: take this frame's estimate as-is
            return current;
        }

        let size = self.radiance.size().as_vec2();
        let uv = (screen_pos.as_vec2() + 0.5) / size;
        let prev_uv = uv - self.motion.read(screen_pos).xy();

        // History was committed in last frame's exposure domain; bring it
        // into this frame's before blending
        let history = self.history.sample_bilinear(prev_uv);
        let history = (history.xyz() * self.params.exposure_ratio())
            .extend(history.w);

        history.lerp(current, self.params.accumulation_amount)
    }

    pub fn accumulate_into(&self, out: &mut TexelGrid) {
        let size = out.size();

        for y in 0..size.y {
            for x in 0..size.x {
                let pos = UVec2::new(x, y);

                out.write(pos, self.accumulate(pos));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec4, UVec2};

    use crate::zero_motion;

    use super::*;

    const SIZE: UVec2 = UVec2::new(8, 8);

    fn params(accumulation_amount: f32) -> FrameParams {
        FrameParams {
            accumulation_amount,
            ..Default::default()
        }
    }

    #[test]
    fn blends_towards_history() {
        let params = params(0.25);
        let radiance = TexelGrid::splat(SIZE, vec4(1.0, 0.0, 0.0, 1.0));
        let history = TexelGrid::splat(SIZE, vec4(0.0, 1.0, 0.0, 1.0));
        let validation =
            TexelGrid::splat(SIZE, vec4(1.0, 0.0, 0.0, 0.0));
        let motion = zero_motion(SIZE);

        let accumulator = TemporalAccumulator {
            params: &params,
            radiance: &radiance,
            history: &history,
            validation: &validation,
            motion: &motion,
        };

        let out = accumulator.accumulate(uvec2(4, 4));

        assert_relative_eq!(0.25, out.x);
        assert_relative_eq!(0.75, out.y);
    }

    #[test]
    fn invalid_history_passes_current_through() {
        let params = params(0.25);
        let radiance = TexelGrid::splat(SIZE, vec4(1.0, 0.5, 0.25, 1.0));
        let history = TexelGrid::splat(SIZE, vec4(9.0, 9.0, 9.0, 1.0));
        let validation = TexelGrid::new(SIZE);
        let motion = zero_motion(SIZE);

        let accumulator = TemporalAccumulator {
            params: &params,
            radiance: &radiance,
            history: &history,
            validation: &validation,
            motion: &motion,
        };

        assert_eq!(vec4(1.0, 0.5, 0.25, 1.0), accumulator.accumulate(uvec2(2, 3)));
    }

    #[test]
    fn warmup_amount_ignores_history_entirely() {
        let params = params(1.0);
        let radiance = TexelGrid::splat(SIZE, vec4(0.5, 0.5, 0.5, 1.0));
        let history = TexelGrid::splat(SIZE, vec4(7.0, 7.0, 7.0, 1.0));
        let validation =
            TexelGrid::splat(SIZE, vec4(1.0, 0.0, 0.0, 0.0));
        let motion = zero_motion(SIZE);

        let accumulator = TemporalAccumulator {
            params: &params,
            radiance: &radiance,
            history: &history,
            validation: &validation,
            motion: &motion,
        };

        assert_eq!(vec4(0.5, 0.5, 0.5, 1.0), accumulator.accumulate(uvec2(0, 0)));
    }

    #[test]
    fn rescales_history_into_the_current_exposure_domain() {
        // Exposure doubled since the history was committed; once both
        // operands sit in the same domain, blending two matching estimates
        // must be a no-op
        let params = FrameParams {
            accumulation_amount: 2.0f32.powf(-7.0),
            exposure: 2.0,
            prev_exposure: 1.0,
            ..Default::default()
        };

        let radiance = TexelGrid::splat(SIZE, vec4(0.5, 0.5, 0.5, 1.0));
        let history = TexelGrid::splat(SIZE, vec4(1.0, 1.0, 1.0, 1.0));
        let validation =
            TexelGrid::splat(SIZE, vec4(1.0, 0.0, 0.0, 0.0));
        let motion = zero_motion(SIZE);

        let accumulator = TemporalAccumulator {
            params: &params,
            radiance: &radiance,
            history: &history,
            validation: &validation,
            motion: &motion,
        };

        let out = accumulator.accumulate(uvec2(4, 4));

        assert_relative_eq!(0.5, out.x);
        assert_relative_eq!(0.5, out.y);
        assert_relative_eq!(0.5, out.z);
    }

    #[test]
    fn follows_motion_vectors() {
        let params = params(0.0);
        let radiance = TexelGrid::new(SIZE);
        let validation =
            TexelGrid::splat(SIZE, vec4(1.0, 0.0, 0.0, 0.0));

        let mut history = TexelGrid::new(SIZE);

        history.write(uvec2(2, 4), vec4(1.0, 2.0, 3.0, 1.0));

        // The pixel moved two texels right since last frame
        let motion =
            TexelGrid::splat(SIZE, vec4(2.0 / SIZE.x as f32, 0.0, 0.0, 0.0));

        let accumulator = TemporalAccumulator {
            params: &params,
            radiance: &radiance,
            history: &history,
            validation: &validation,
            motion: &motion,
        };

        let out = accumulator.accumulate(uvec2(4, 4));

        assert_relative_eq!(1.0, out.x);
        assert_relative_eq!(2.0, out.y);
        assert_relative_eq!(3.0, out.z);
    }
}
