use glam::{UVec2, Vec2, Vec4, Vec4Swizzles};

use crate::{CameraParams, FrameParams, HitPoint, TexelGrid};

/// Previous-frame color mip chain (2x2 box filter).
#[derive(Clone, Debug)]
pub struct ColorPyramid {
    mips: Vec<TexelGrid>,
}

impl ColorPyramid {
    pub fn build(color: &TexelGrid) -> Self {
        let mut mips = vec![color.clone()];

        loop {
            let prev = mips.last().unwrap();
            let size = prev.size();

            if size.x <= 1 && size.y <= 1 {
                break;
            }

            let next_size = (size / 2).max(UVec2::ONE);
            let mut next = TexelGrid::new(next_size);

            for y in 0..next_size.y {
                for x in 0..next_size.x {
                    let base = UVec2::new(x, y) * 2;

                    let sum = prev.read(base)
                        + prev.read(base + UVec2::new(1, 0))
                        + prev.read(base + UVec2::new(0, 1))
                        + prev.read(base + UVec2::new(1, 1));

                    next.write(UVec2::new(x, y), sum * 0.25);
                }
            }

            mips.push(next);
        }

        Self { mips }
    }

    pub fn max_mip(&self) -> u32 {
        self.mips.len() as u32 - 1
    }

    pub fn size(&self) -> UVec2 {
        self.mips[0].size()
    }

    pub fn sample(&self, mip: u32, uv: Vec2) -> Vec4 {
        self.mips[mip.min(self.max_mip()) as usize].sample_bilinear(uv)
    }

    pub fn mip0(&self) -> &TexelGrid {
        &self.mips[0]
    }
}

/// Turns hit points into a raw radiance estimate by sampling last frame's
/// color pyramid.
pub struct Reprojector<'a> {
    pub camera: &'a CameraParams,
    pub params: &'a FrameParams,
    pub prev_color: &'a ColorPyramid,
    pub hits: &'a TexelGrid,
}

impl Reprojector<'_> {
    pub fn reproject(&self, screen_pos: UVec2) -> Vec4 {
        let hit = HitPoint::deserialize(self.hits.read(screen_pos));

        if hit.is_none() {
            if hit.wants_ambient() {
                // The ambient fallback approximates un-occluded sky; it does
                // not come from last frame's image, so no exposure rescale
                return self.params.ambient.xyz().extend(1.0);
            }

            return Vec4::ZERO;
        }

        // Wider ray footprint -> coarser mip, exactly like the history
        // sampling elsewhere in the frame pipeline
        let footprint =
            hit.distance * self.camera.pixel_spread_angle_tangent();

        let mip = footprint.max(1.0).log2().clamp(0.0, self.max_mip()) as u32;

        let color = self.prev_color.sample(mip, hit.uv);

        // Exposure compensation happens here, *before* temporal blending;
        // blending afterwards would mix mismatched exposure levels
        (color.xyz() * self.params.exposure_ratio()).extend(1.0)
    }

    fn max_mip(&self) -> f32 {
        self.prev_color.max_mip() as f32
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec2, vec4, Mat4, Vec3};

    use crate::RayMissFallback;

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

    fn params(
        camera: &CameraParams,
        exposure: f32,
        prev_exposure: f32,
    ) -> FrameParams {
        FrameParams::build(
            camera,
            0,
            0.5,
            1.0,
            exposure,
            prev_exposure,
            1.0,
            1.0,
            32,
            RayMissFallback::Nothing,
            2.0,
            Vec3::new(0.1, 0.2, 0.3),
        )
    }

    fn hits_with(size: UVec2, pos: UVec2, hit: HitPoint) -> TexelGrid {
        let mut hits = TexelGrid::new(size);

        hits.write(pos, hit.serialize());
        hits
    }

    #[test]
    fn invalid_hits_contribute_nothing() {
        let size = uvec2(8, 8);
        let camera = camera(size);
        let params = params(&camera, 1.0, 1.0);
        let prev_color =
            ColorPyramid::build(&TexelGrid::splat(size, Vec4::ONE));
        let hits = TexelGrid::new(size);

        let reprojector = Reprojector {
            camera: &camera,
            params: &params,
            prev_color: &prev_color,
            hits: &hits,
        };

        assert_eq!(Vec4::ZERO, reprojector.reproject(uvec2(2, 2)));
    }

    #[test]
    fn compensates_exposure_drift() {
        let size = uvec2(8, 8);
        let camera = camera(size);

        // Last frame was exposed twice as bright
        let params = params(&camera, 1.0, 2.0);

        let prev_color = ColorPyramid::build(&TexelGrid::splat(
            size,
            vec4(0.25, 0.5, 0.75, 1.0),
        ));

        let pos = uvec2(4, 4);
        let hits = hits_with(size, pos, HitPoint::hit(vec2(0.5, 0.5), 1.0));

        let reprojector = Reprojector {
            camera: &camera,
            params: &params,
            prev_color: &prev_color,
            hits: &hits,
        };

        let radiance = reprojector.reproject(pos);

        assert_relative_eq!(0.5, radiance.x);
        assert_relative_eq!(1.0, radiance.y);
        assert_relative_eq!(1.5, radiance.z);
    }

    #[test]
    fn long_rays_read_coarser_mips() {
        let size = uvec2(64, 64);
        let camera = camera(size);
        let params = params(&camera, 1.0, 1.0);

        // A checkerboard: mip 0 alternates, coarser mips settle at 0.5
        let mut color = TexelGrid::new(size);

        for y in 0..size.y {
            for x in 0..size.x {
                let v = ((x + y) % 2) as f32;

                color.write(uvec2(x, y), Vec4::splat(v));
            }
        }

        let prev_color = ColorPyramid::build(&color);
        let pos = uvec2(8, 8);

        // Far enough that footprint * spread pushes past mip 0
        let hits =
            hits_with(size, pos, HitPoint::hit(vec2(0.25, 0.25), 1000.0));

        let reprojector = Reprojector {
            camera: &camera,
            params: &params,
            prev_color: &prev_color,
            hits: &hits,
        };

        let radiance = reprojector.reproject(pos);

        assert_relative_eq!(0.5, radiance.x, epsilon = 1e-5);
    }

    #[test]
    fn ambient_fallback_skips_exposure_rescale() {
        let size = uvec2(8, 8);
        let camera = camera(size);
        let params = params(&camera, 1.0, 4.0);
        let prev_color =
            ColorPyramid::build(&TexelGrid::splat(size, Vec4::ONE));

        let pos = uvec2(1, 1);
        let hits = hits_with(size, pos, HitPoint::ambient_miss());

        let reprojector = Reprojector {
            camera: &camera,
            params: &params,
            prev_color: &prev_color,
            hits: &hits,
        };

        let radiance = reprojector.reproject(pos);

        assert_relative_eq!(0.1, radiance.x);
        assert_relative_eq!(0.2, radiance.y);
        assert_relative_eq!(0.3, radiance.z);
    }
}
