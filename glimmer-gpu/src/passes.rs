use bytemuck::{Pod, Zeroable};

/// Per-dispatch payload of the spatial-filter and upsample passes; the rest
/// of the pipeline reads everything it needs from [`crate::FrameParams`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PassParams {
    /// Filter radius in texels at the pass's output resolution.
    pub radius: f32,

    /// Kernel jitter phase; `-1` disables jitter.
    pub jitter_phase: i32,

    /// Depth-pyramid mip matching the pass's output resolution.
    pub mip: u32,

    pub pad: u32,
}

impl PassParams {
    pub fn jitter(&self) -> Option<u32> {
        u32::try_from(self.jitter_phase).ok()
    }
}
