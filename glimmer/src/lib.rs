//! Glimmer implements screen-space indirect diffuse lighting: rays are
//! marched through a hierarchical depth pyramid, shaded by reprojecting last
//! frame's color, and cleaned up by a temporal + spatial denoiser before
//! being resolved to the screen.
//!
//! The crate ships two executors over the same frame logic: [`GiRenderer`]
//! records the pipeline as wgpu compute passes, while [`SoftwareRenderer`]
//! runs the reference kernels from `glimmer-gpu` on the CPU.

mod buffers;
mod camera;
mod config;
mod plan;
mod renderer;
mod shaders;
mod software;
mod state;

pub use self::buffers::*;
pub use self::camera::*;
pub use self::config::*;
pub use self::plan::*;
pub use self::renderer::*;
pub use self::software::*;
pub use self::state::*;
