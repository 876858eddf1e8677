use glam::{UVec2, Vec3, Vec4Swizzles};

use crate::{
    CameraParams, DepthPyramid, FrameParams, HitPoint, Noise, RayMissFallback,
    TexelGrid,
};

/// Mip the march starts at; coarse enough to skip empty space quickly,
/// clamped to the pyramid's top.
pub const START_MIP: u32 = 2;

/// Ray-marches the depth pyramid to find one candidate occluder per pixel.
pub struct Tracer<'a> {
    pub camera: &'a CameraParams,
    pub params: &'a FrameParams,
    pub pyramid: &'a DepthPyramid,
    pub normals: &'a TexelGrid,
}

impl Tracer<'_> {
    /// Traces the pixel's indirect-diffuse ray: a hemisphere direction around
    /// the pixel's normal, chosen by frame-seeded noise.
    pub fn trace(&self, screen_pos: UVec2) -> HitPoint {
        let depth = self.pyramid.read(0, screen_pos);

        // Sky / far-plane pixels carry no surface to bounce from
        if depth >= 1.0 {
            return HitPoint::miss();
        }

        let normal = self.normals.read(screen_pos).xyz();

        if normal.length_squared() < 1e-6 {
            return HitPoint::miss();
        }

        let mut noise = Noise::new(self.params.frame, screen_pos);
        let dir = noise.sample_hemisphere(normal.normalize());

        self.trace_ray(screen_pos, dir)
    }

    /// Marches an explicit view-space direction; `trace()` delegates here.
    pub fn trace_ray(&self, screen_pos: UVec2, dir: Vec3) -> HitPoint {
        let size = self.pyramid.size().as_vec2();
        let uv0 = (screen_pos.as_vec2() + 0.5) / size;
        let depth0 = self.pyramid.read(0, screen_pos);

        if depth0 >= 1.0 {
            return HitPoint::miss();
        }

        let origin = self.camera.uv_to_view(uv0, depth0);

        // A short probe along the ray gives the marching direction in
        // (uv, device-depth) space
        let probe = origin + dir * (0.1 * origin.z.abs().max(self.camera.near()));
        let (probe_uv, probe_depth) = self.camera.view_to_uv(probe);

        let delta_uv = probe_uv - uv0;
        let delta_depth = probe_depth - depth0;

        // Texels travelled per unit step along the dominant axis
        let texels = (delta_uv * size).abs().max_element();

        if texels < 1e-6 {
            // Degenerate: the ray leaves the screen plane head-on
            return self.miss();
        }

        let step_uv = delta_uv / texels;
        let step_depth = delta_depth / texels;

        let max_mip = self.pyramid.max_mip();
        let mut mip = START_MIP.min(max_mip);
        let mut t = 1.0f32;

        for _ in 0..self.params.ray_steps {
            let uv = uv0 + step_uv * t;

            if uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 {
                return self.miss();
            }

            let ray_depth = depth0 + step_depth * t;

            if ray_depth <= 0.0 || ray_depth >= 1.0 {
                return self.miss();
            }

            let cell_depth = self.pyramid.read_uv(mip, uv);

            if ray_depth >= cell_depth {
                // The ray is at or behind the closest surface of this cell
                if mip == 0 {
                    let lin_ray = self.camera.linear_01_depth(ray_depth);
                    let lin_surface = self.camera.linear_01_depth(cell_depth);

                    let within_thickness = lin_ray
                        * self.params.thickness_scale
                        + self.params.thickness_bias
                        <= lin_surface;

                    if within_thickness {
                        return HitPoint::hit(uv, t);
                    }

                    // Too far behind the surface; step over it
                    t += 1.0;
                } else {
                    // Refine without advancing
                    mip -= 1;
                }
            } else {
                // Clear at this mip: advance a full cell, then coarsen again
                t += (1u32 << mip) as f32;
                mip = (mip + 1).min(max_mip);
            }
        }

        self.miss()
    }

    fn miss(&self) -> HitPoint {
        match self.params.miss_fallback() {
            RayMissFallback::Nothing => HitPoint::miss(),
            RayMissFallback::AmbientColor => HitPoint::ambient_miss(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec3, vec4, Mat4, Vec4};

    use super::*;

    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    fn camera(size: UVec2) -> CameraParams {
        let fov_y = std::f32::consts::FRAC_PI_2;

        CameraParams::new(
            Mat4::perspective_rh(fov_y, 1.0, NEAR, FAR),
            size,
            NEAR,
            FAR,
            fov_y,
        )
    }

    fn params(camera: &CameraParams, thickness: f32) -> FrameParams {
        FrameParams::build(
            camera,
            0,
            thickness,
            1.0,
            1.0,
            1.0,
            1.0,
            1.0,
            128,
            RayMissFallback::Nothing,
            2.0,
            Vec3::ZERO,
        )
    }

    /// Device depth of a fronto-parallel plane `view_z` in front of the
    /// camera.
    fn plane_depth(camera: &CameraParams, view_z: f32) -> f32 {
        let (_, depth) = camera.view_to_uv(vec3(0.0, 0.0, -view_z));

        depth
    }

    fn facing_normals(size: UVec2) -> TexelGrid {
        TexelGrid::splat(size, vec4(0.0, 0.0, 1.0, 0.0))
    }

    #[test]
    fn rejects_degenerate_normals() {
        let size = uvec2(16, 16);
        let camera = camera(size);
        let params = params(&camera, 0.5);

        let depth = plane_depth(&camera, 10.0);
        let pyramid = DepthPyramid::build(&TexelGrid::splat(
            size,
            Vec4::new(depth, 0.0, 0.0, 0.0),
        ));

        let normals = TexelGrid::new(size);

        let tracer = Tracer {
            camera: &camera,
            params: &params,
            pyramid: &pyramid,
            normals: &normals,
        };

        assert!(tracer.trace(uvec2(8, 8)).is_none());
    }

    #[test]
    fn rejects_far_plane_pixels() {
        let size = uvec2(16, 16);
        let camera = camera(size);
        let params = params(&camera, 0.5);

        let pyramid = DepthPyramid::build(&TexelGrid::splat(
            size,
            Vec4::new(1.0, 0.0, 0.0, 0.0),
        ));

        let normals = facing_normals(size);

        let tracer = Tracer {
            camera: &camera,
            params: &params,
            pyramid: &pyramid,
            normals: &normals,
        };

        assert!(tracer.trace(uvec2(3, 3)).is_none());
    }

    #[test]
    fn tangent_ray_hits_its_surface_nearby() {
        let size = uvec2(64, 64);
        let camera = camera(size);
        let params = params(&camera, 0.5);

        let depth = plane_depth(&camera, 10.0);
        let pyramid = DepthPyramid::build(&TexelGrid::splat(
            size,
            Vec4::new(depth, 0.0, 0.0, 0.0),
        ));

        let normals = facing_normals(size);

        let tracer = Tracer {
            camera: &camera,
            params: &params,
            pyramid: &pyramid,
            normals: &normals,
        };

        let origin = uvec2(8, 32);
        let hit = tracer.trace_ray(origin, vec3(1.0, 0.0, 0.0));

        assert!(hit.is_some());
        assert!(hit.uv.x > (origin.x as f32 + 0.5) / 64.0);
        assert!(hit.distance >= 1.0);
    }

    #[test]
    fn rejects_hits_beyond_thickness_window() {
        let size = uvec2(64, 64);
        let camera = camera(size);
        let params = params(&camera, 0.5);

        // Left half: the surface our ray grazes along; right half: a much
        // nearer wall the ray passes far behind
        let left = plane_depth(&camera, 10.0);
        let right = plane_depth(&camera, 2.0);

        let mut depth = TexelGrid::new(size);

        for y in 0..size.y {
            for x in 0..size.x {
                let d = if x < size.x / 2 { left } else { right };

                depth.write(uvec2(x, y), Vec4::new(d, 0.0, 0.0, 0.0));
            }
        }

        let pyramid = DepthPyramid::build(&depth);
        let normals = facing_normals(size);

        let tracer = Tracer {
            camera: &camera,
            params: &params,
            pyramid: &pyramid,
            normals: &normals,
        };

        // The graze along the left surface would hit it; aim slightly
        // towards the camera so the ray stays in front of its own surface
        // and meets the near wall far outside the thickness window
        let hit = tracer.trace_ray(uvec2(8, 32), vec3(1.0, 0.0, 0.02));

        assert!(hit.is_none());
    }

    #[test]
    fn escaping_ray_applies_fallback_policy() {
        let size = uvec2(32, 32);
        let camera = camera(size);

        let mut params = params(&camera, 0.5);

        let depth = plane_depth(&camera, 10.0);
        let pyramid = DepthPyramid::build(&TexelGrid::splat(
            size,
            Vec4::new(depth, 0.0, 0.0, 0.0),
        ));

        let normals = facing_normals(size);

        // Up and towards the camera: leaves every surface behind
        let dir = vec3(0.0, 1.0, 0.5).normalize();

        let tracer = Tracer {
            camera: &camera,
            params: &params,
            pyramid: &pyramid,
            normals: &normals,
        };

        let hit = tracer.trace_ray(uvec2(16, 16), dir);

        assert!(hit.is_none());
        assert!(!hit.wants_ambient());

        params.miss_fallback = RayMissFallback::AmbientColor.serialize();

        let tracer = Tracer {
            camera: &camera,
            params: &params,
            pyramid: &pyramid,
            normals: &normals,
        };

        let hit = tracer.trace_ray(uvec2(16, 16), dir);

        assert!(hit.is_none());
        assert!(hit.wants_ambient());
    }
}
