use glam::{Mat4, UVec2};
use glimmer_gpu::CameraParams;

/// Host-side camera description; serialized into [`CameraParams`] each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub projection: Mat4,
    pub screen_size: UVec2,
    pub near: f32,
    pub far: f32,
    pub fov_y: f32,
}

impl Camera {
    pub(crate) fn serialize(&self) -> CameraParams {
        assert!(self.screen_size.x > 0);
        assert!(self.screen_size.y > 0);
        assert!(self.near > 0.0);
        assert!(self.far > self.near);

        CameraParams::new(
            self.projection,
            self.screen_size,
            self.near,
            self.far,
            self.fov_y,
        )
    }

    pub(crate) fn describe(&self) -> String {
        format!(
            "screen-size={}x{}, near={}, far={}, fov-y={}",
            self.screen_size.x, self.screen_size.y, self.near, self.far,
            self.fov_y,
        )
    }
}
