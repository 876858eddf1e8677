use glam::{IVec2, UVec2, Vec2, Vec4};

/// CPU-addressable texel grid; the software counterpart of a storage texture.
///
/// Single-channel data (depth, validation masks) lives in `.x` with the
/// remaining lanes zeroed.
#[derive(Clone, Debug)]
pub struct TexelGrid {
    size: UVec2,
    data: Vec<Vec4>,
}

impl TexelGrid {
    pub fn new(size: UVec2) -> Self {
        Self::splat(size, Vec4::ZERO)
    }

    pub fn splat(size: UVec2, value: Vec4) -> Self {
        assert!(size.x > 0);
        assert!(size.y > 0);

        Self {
            size,
            data: vec![value; (size.x * size.y) as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    fn idx(&self, pos: UVec2) -> usize {
        (pos.y * self.size.x + pos.x) as usize
    }

    pub fn read(&self, pos: UVec2) -> Vec4 {
        let pos = pos.min(self.size - 1);

        self.data[self.idx(pos)]
    }

    /// Reads with the out-of-bounds coordinates clamped to the edge.
    pub fn read_clamped(&self, pos: IVec2) -> Vec4 {
        let pos = pos
            .clamp(IVec2::ZERO, self.size.as_ivec2() - 1)
            .as_uvec2();

        self.data[self.idx(pos)]
    }

    pub fn write(&mut self, pos: UVec2, value: Vec4) {
        let idx = self.idx(pos.min(self.size - 1));

        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: Vec4) {
        self.data.fill(value);
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.size.x as i32
            && pos.y < self.size.y as i32
    }

    /// Bilinearly samples at `uv` (in `0.0 ..= 1.0`), clamping at the edges.
    pub fn sample_bilinear(&self, uv: Vec2) -> Vec4 {
        let pos = uv * self.size.as_vec2() - 0.5;
        let base = pos.floor();
        let frac = pos - base;

        let p00 = base.as_ivec2();
        let p10 = p00 + IVec2::new(1, 0);
        let p01 = p00 + IVec2::new(0, 1);
        let p11 = p00 + IVec2::new(1, 1);

        let s00 = self.read_clamped(p00);
        let s10 = self.read_clamped(p10);
        let s01 = self.read_clamped(p01);
        let s11 = self.read_clamped(p11);

        let top = s00.lerp(s10, frac.x);
        let bottom = s01.lerp(s11, frac.x);

        top.lerp(bottom, frac.y)
    }

    /// Returns the uv of a texel's center.
    pub fn texel_center(&self, pos: UVec2) -> Vec2 {
        (pos.as_vec2() + 0.5) / self.size.as_vec2()
    }
}
