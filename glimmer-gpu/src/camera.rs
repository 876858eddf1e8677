use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

/// Per-frame camera payload, shared between CPU kernels and shaders.
///
/// `screen` holds `(width, height, 1/width, 1/height)` at the *working*
/// resolution; `planes` holds `(near, far, vertical fov, pixel spread angle
/// tangent)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CameraParams {
    pub projection: Mat4,
    pub ndc_to_view: Mat4,
    pub screen: Vec4,
    pub planes: Vec4,
}

impl CameraParams {
    pub fn new(
        projection: Mat4,
        screen_size: UVec2,
        near: f32,
        far: f32,
        fov_y: f32,
    ) -> Self {
        assert!(screen_size.x > 0);
        assert!(screen_size.y > 0);
        assert!(far > near);

        // Angle subtended by one pixel at the screen's center; scales all
        // depth tolerances so they stay resolution-independent.
        let pixel_spread_angle_tangent =
            (fov_y * 0.5).tan() / (screen_size.y as f32 * 0.5);

        Self {
            projection,
            ndc_to_view: projection.inverse(),
            screen: Vec4::new(
                screen_size.x as f32,
                screen_size.y as f32,
                1.0 / screen_size.x as f32,
                1.0 / screen_size.y as f32,
            ),
            planes: Vec4::new(near, far, fov_y, pixel_spread_angle_tangent),
        }
    }

    /// Returns this camera rescaled to `screen * scale`; used when the
    /// pipeline runs at half the working resolution.
    pub fn at_scale(&self, scale: f32) -> Self {
        let size = (self.screen_size().as_vec2() * scale)
            .max(Vec2::ONE)
            .as_uvec2();

        Self::new(self.projection, size, self.near(), self.far(), self.fov_y())
    }

    pub fn screen_size(&self) -> UVec2 {
        self.screen.xy().as_uvec2()
    }

    pub fn near(&self) -> f32 {
        self.planes.x
    }

    pub fn far(&self) -> f32 {
        self.planes.y
    }

    pub fn fov_y(&self) -> f32 {
        self.planes.z
    }

    pub fn pixel_spread_angle_tangent(&self) -> f32 {
        self.planes.w
    }

    /// Returns whether given point lays inside the screen.
    pub fn contains(&self, pos: IVec2) -> bool {
        let screen_size = self.screen.xy().as_ivec2();

        pos.x >= 0
            && pos.y >= 0
            && pos.x < screen_size.x
            && pos.y < screen_size.y
    }

    /// Converts device depth (`0.0 ..= 1.0`) into view-space distance.
    pub fn linearize_depth(&self, depth: f32) -> f32 {
        let near = self.near();
        let far = self.far();

        near * far / (far - depth.min(0.999_999) * (far - near))
    }

    /// Converts device depth into `0.0 ..= 1.0` linear depth, where `0.0` is
    /// the near plane and `1.0` the far plane.
    pub fn linear_01_depth(&self, depth: f32) -> f32 {
        let near = self.near();
        let far = self.far();

        ((self.linearize_depth(depth) - near) / (far - near)).clamp(0.0, 1.0)
    }

    /// Reconstructs a view-space position from screen uv + device depth.
    pub fn uv_to_view(&self, uv: Vec2, depth: f32) -> Vec3 {
        let ndc = Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);

        self.ndc_to_view.project_point3(ndc.extend(depth))
    }

    /// Projects a view-space position back onto the screen, returning
    /// `(uv, device depth)`.
    pub fn view_to_uv(&self, pos: Vec3) -> (Vec2, f32) {
        let clip = self.projection * pos.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        let uv = Vec2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);

        (uv, ndc.z)
    }
}
