//! GPU-facing seams

use std::any::Any;

use crate::foundation::math::Mat4;

/// Opaque handle to whatever backend owns GPU resources.
///
/// The engine only threads this through lifecycle and draw hooks; concrete
/// drawables downcast it to their backend type via `as_any_mut`.
pub trait GpuContext {
    /// Downcast access for concrete drawable implementations
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A no-op GPU context for tests and headless runs
pub struct NullGpu;

impl GpuContext for NullGpu {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Something a geometry node can draw.
///
/// `initialize` runs when the owning node is committed into the tree and
/// `dispose` when it is removed; `draw` receives the node's world transform
/// for the current frame. Only `draw` is mandatory.
pub trait Drawable {
    /// Acquire GPU resources. Called once when the owning node attaches.
    fn initialize(&mut self, gpu: &mut dyn GpuContext) {
        let _ = gpu;
    }

    /// Release GPU resources. Called once when the owning node detaches.
    fn dispose(&mut self) {}

    /// Number of vertices submitted per draw, for frame statistics
    fn vertex_count(&self) -> usize {
        0
    }

    /// Bind per-drawable state before `draw`
    fn pre_draw(&mut self, gpu: &mut dyn GpuContext) {
        let _ = gpu;
    }

    /// Submit one draw with the node's world transform
    fn draw(&mut self, gpu: &mut dyn GpuContext, world: &Mat4);

    /// Unbind per-drawable state after `draw`
    fn post_draw(&mut self, gpu: &mut dyn GpuContext) {
        let _ = gpu;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingDrawable {
        draws: usize,
    }

    impl Drawable for CountingDrawable {
        fn draw(&mut self, _gpu: &mut dyn GpuContext, _world: &Mat4) {
            self.draws += 1;
        }
    }

    #[test]
    fn lifecycle_hooks_default_to_noops() {
        let mut gpu = NullGpu;
        let mut drawable = CountingDrawable { draws: 0 };
        drawable.initialize(&mut gpu);
        drawable.draw(&mut gpu, &Mat4::identity());
        drawable.dispose();
        assert_eq!(drawable.draws, 1);
        assert_eq!(drawable.vertex_count(), 0);
    }

    #[test]
    fn null_gpu_downcasts_to_itself() {
        let mut gpu = NullGpu;
        let context: &mut dyn GpuContext = &mut gpu;
        assert!(context.as_any_mut().downcast_mut::<NullGpu>().is_some());
    }
}
