//! Render classification: cameras, cull contexts, and draw bins
//!
//! Rendering here stops at classification. A [`RenderContext`] walks the
//! graph once per frame, culls against its camera, and buckets survivors
//! into integer-keyed [`RenderBin`]s; actual GPU submission happens behind
//! the [`Drawable`] and [`GpuContext`] seams so the engine never links a
//! graphics API.

mod bin;
mod camera;
mod context;
mod drawable;

pub use bin::RenderBin;
pub use camera::Camera;
pub use context::{CullStats, RenderContext};
pub use drawable::{Drawable, GpuContext, NullGpu};
