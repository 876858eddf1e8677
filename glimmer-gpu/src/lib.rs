//! Common structs and per-pixel kernels shared by Glimmer's compute shaders
//! and its software execution path.
//!
//! Every stage of the indirect-diffuse pipeline (tracing, reprojection,
//! history validation, temporal accumulation, spatial filtering, upsampling)
//! has its reference semantics defined here as plain Rust over [`TexelGrid`]s;
//! the WGSL shaders in the host crate mirror these kernels texel for texel.

mod camera;
mod depth_pyramid;
mod frame;
mod hit;
mod noise;
mod passes;
mod reproject;
mod spatial;
mod temporal;
mod texel;
mod tracer;
mod upsample;
mod utils;
mod validation;

pub use self::camera::*;
pub use self::depth_pyramid::*;
pub use self::frame::*;
pub use self::hit::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::reproject::*;
pub use self::spatial::*;
pub use self::temporal::*;
pub use self::texel::*;
pub use self::tracer::*;
pub use self::upsample::*;
pub use self::utils::*;
pub use self::validation::*;

/// Golden angle, used for spatial filters.
pub const GOLDEN_ANGLE: f32 = 2.39996;
