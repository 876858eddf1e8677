use glam::{UVec2, Vec4, Vec4Swizzles};

use crate::{CameraParams, FrameParams, TexelGrid};

/// Minimum agreement between current and history normals.
pub const NORMAL_THRESHOLD: f32 = 0.65;

/// Slack applied on top of the pixel-spread-driven depth tolerance.
pub const DEPTH_TOLERANCE_SCALE: f32 = 4.0;

/// Decides, per pixel, whether the motion-reprojected history sample can be
/// trusted by the temporal denoiser.
pub struct HistoryValidator<'a> {
    pub camera: &'a CameraParams,
    pub params: &'a FrameParams,
    pub depth: &'a TexelGrid,
    pub normals: &'a TexelGrid,
    pub history_depth: Option<&'a TexelGrid>,
    pub history_normals: Option<&'a TexelGrid>,

    /// Per-pixel motion, as a uv offset from the current to the previous
    /// frame.
    pub motion: &'a TexelGrid,

    /// Allocated size of the history buffer; a mismatch against the working
    /// resolution means the history predates a resolution change.
    pub history_size: UVec2,
}

impl HistoryValidator<'_> {
    /// Returns `1.0` for trustworthy history, `0.0` otherwise.
    pub fn validate(&self, screen_pos: UVec2) -> f32 {
        // First frame / post-resize frames run with no history at all; the
        // stage still executes so downstream always has a defined mask
        let (Some(history_depth), Some(history_normals)) =
            (self.history_depth, self.history_normals)
        else {
            return 0.0;
        };

        if self.params.history_validity < 0.5 {
            return 0.0;
        }

        if self.history_size != self.depth.size() {
            return 0.0;
        }

        let size = self.depth.size().as_vec2();
        let uv = (screen_pos.as_vec2() + 0.5) / size;
        let motion = self.motion.read(screen_pos).xy();
        let prev_uv = uv - motion;

        if prev_uv.x < 0.0
            || prev_uv.x >= 1.0
            || prev_uv.y < 0.0
            || prev_uv.y >= 1.0
        {
            return 0.0;
        }

        let prev_pos = (prev_uv * size).as_uvec2();

        let depth = self.depth.read(screen_pos).x;
        let prev_depth = history_depth.read(prev_pos).x;

        if depth >= 1.0 || prev_depth >= 1.0 {
            return 0.0;
        }

        // Depth agreement, with a tolerance that widens with distance and
        // with the angle one pixel subtends
        let linear = self.camera.linearize_depth(depth);
        let prev_linear = self.camera.linearize_depth(prev_depth);

        let tolerance = linear
            * self.camera.pixel_spread_angle_tangent()
            * DEPTH_TOLERANCE_SCALE
            + 1e-3;

        if (linear - prev_linear).abs() > tolerance {
            return 0.0;
        }

        // Normal agreement
        let normal = self.normals.read(screen_pos).xyz();
        let prev_normal = history_normals.read(prev_pos).xyz();

        if normal.length_squared() < 1e-6
            || prev_normal.length_squared() < 1e-6
        {
            return 0.0;
        }

        if normal.normalize().dot(prev_normal.normalize()) < NORMAL_THRESHOLD
        {
            return 0.0;
        }

        1.0
    }

    pub fn validate_into(&self, mask: &mut TexelGrid) {
        let size = mask.size();

        for y in 0..size.y {
            for x in 0..size.x {
                let pos = UVec2::new(x, y);

                mask.write(
                    pos,
                    Vec4::new(self.validate(pos), 0.0, 0.0, 0.0),
                );
            }
        }
    }
}

/// Motion buffer of a stationary scene: zero offsets everywhere.
pub fn zero_motion(size: UVec2) -> TexelGrid {
    TexelGrid::new(size)
}
