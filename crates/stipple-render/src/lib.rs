//! Real-time 3D Gaussian Splatting renderer core.
//!
//! Every frame the pipeline culls and depth-bins the splat cloud on the GPU,
//! compacts the survivors, sorts them far-to-near on a packed depth key, and
//! rasterizes each one as a screen-space ellipse with premultiplied-alpha
//! compositing. The caller owns the command encoder and the final submit;
//! this crate only appends passes to it.

mod culling;
mod error;
mod indirect;
mod rasterize;
mod uniforms;

pub mod bounding_box;
pub mod camera;
pub mod config;
pub mod record;
pub mod renderer;
pub mod sh;
pub mod splats;

#[cfg(all(test, not(target_family = "wasm")))]
mod tests;

pub use config::{BackendVariant, RenderConfig, ShMode};
pub use error::RenderError;
pub use record::SplatRecord;
pub use renderer::SplatRenderer;
pub use splats::{Splats, TransformProxy};

/// Number of depth buckets used for binning before the global sort.
pub use stipple_prefix_sum::NUM_BUCKETS;

/// Threads per workgroup for every 1D compute dispatch in the pipeline.
pub const WORKGROUP_SIZE: u32 = 256;
