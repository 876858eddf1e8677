use glam::{vec2, vec4, Vec2, Vec4};

/// Result of ray-marching the depth pyramid for one pixel, packed into a
/// single texel of the hit-point texture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitPoint {
    /// Screen uv of the occluder, if any.
    pub uv: Vec2,

    /// Travelled distance in pixels; informs the footprint-driven mip
    /// selection during reprojection.
    pub distance: f32,

    pub validity: u32,
}

impl HitPoint {
    pub const VALID: u32 = 1;
    pub const AMBIENT_FALLBACK: u32 = 1 << 1;

    pub fn hit(uv: Vec2, distance: f32) -> Self {
        Self {
            uv,
            distance,
            validity: Self::VALID,
        }
    }

    pub fn miss() -> Self {
        Self::default()
    }

    pub fn ambient_miss() -> Self {
        Self {
            validity: Self::AMBIENT_FALLBACK,
            ..Self::default()
        }
    }

    pub fn is_some(&self) -> bool {
        self.validity & Self::VALID > 0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub fn wants_ambient(&self) -> bool {
        self.validity & Self::AMBIENT_FALLBACK > 0
    }

    pub fn serialize(&self) -> Vec4 {
        vec4(
            self.uv.x,
            self.uv.y,
            self.distance,
            f32::from_bits(self.validity),
        )
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            uv: vec2(d0.x, d0.y),
            distance: d0.z,
            validity: d0.w.to_bits(),
        }
    }
}
