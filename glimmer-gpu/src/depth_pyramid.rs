use glam::{UVec2, Vec2, Vec4};

use crate::TexelGrid;

/// Min-filtered depth mip chain.
///
/// Mip 0 is the working-resolution depth buffer; every further level halves
/// each axis and keeps the *closest* depth of its 2x2 footprint, so a cell
/// read at any mip is a conservative occluder bound for the whole footprint.
#[derive(Clone, Debug)]
pub struct DepthPyramid {
    mips: Vec<TexelGrid>,
}

impl DepthPyramid {
    /// Builds the chain from a mip-0 depth grid (depth in `.x`).
    pub fn build(depth: &TexelGrid) -> Self {
        let mut mips = vec![depth.clone()];

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

                    let d = prev
                        .read(base)
                        .x
                        .min(prev.read(base + UVec2::new(1, 0)).x)
                        .min(prev.read(base + UVec2::new(0, 1)).x)
                        .min(prev.read(base + UVec2::new(1, 1)).x);

                    next.write(UVec2::new(x, y), Vec4::new(d, 0.0, 0.0, 0.0));
                }
            }

            mips.push(next);
        }

        Self { mips }
    }

    pub fn mip_count(&self) -> u32 {
        self.mips.len() as u32
    }

    pub fn max_mip(&self) -> u32 {
        self.mip_count() - 1
    }

    pub fn mip_size(&self, mip: u32) -> UVec2 {
        self.mips[mip as usize].size()
    }

    pub fn size(&self) -> UVec2 {
        self.mip_size(0)
    }

    pub fn read(&self, mip: u32, pos: UVec2) -> f32 {
        self.mips[mip as usize].read(pos).x
    }

    pub fn read_uv(&self, mip: u32, uv: Vec2) -> f32 {
        let size = self.mip_size(mip).as_vec2();
        let pos = (uv * size).min(size - 1.0).max(Vec2::ZERO).as_uvec2();

        self.read(mip, pos)
    }

    pub fn mip0(&self) -> &TexelGrid {
        &self.mips[0]
    }
}
