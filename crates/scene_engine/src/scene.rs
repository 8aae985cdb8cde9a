//! Frame driver tying the graph, culling, and collision together

use log::debug;

use crate::collision::CollisionWorld;
use crate::config::SceneConfig;
use crate::graph::SceneGraph;
use crate::render::{Camera, GpuContext, RenderContext};

/// Counters for the most recent frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames processed since the scene was created
    pub frame: u64,
    /// Live nodes in the graph after commit
    pub nodes: usize,
    /// Nodes binned across all render contexts
    pub binned: usize,
    /// Nodes rejected by culling across all render contexts
    pub culled: usize,
    /// Collision pairs recorded this frame
    pub collision_pairs: usize,
    /// Vertices submitted by the last draw
    pub vertices_drawn: usize,
}

/// A scene: one graph, its collision world, and any number of render
/// contexts, advanced frame by frame.
///
/// `update` runs the fixed per-frame sequence — controllers, structural
/// commit, transform propagation, bounds derivation, per-context culling,
/// collision detection — in that order, synchronously. `draw` then submits
/// whatever the contexts binned.
pub struct Scene {
    graph: SceneGraph,
    collision: CollisionWorld,
    contexts: Vec<RenderContext>,
    config: SceneConfig,
    stats: FrameStats,
}

impl Scene {
    /// Create an empty scene
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        Self {
            graph: SceneGraph::new(),
            collision: CollisionWorld::new(),
            contexts: Vec::new(),
            config,
            stats: FrameStats::default(),
        }
    }

    /// The node graph
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable access to the node graph
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// This frame's collision results
    #[must_use]
    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    /// The scene configuration
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Counters from the most recent `update` and `draw`
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Register a render context. Returns its index for later lookup.
    pub fn add_context(&mut self, context: RenderContext) -> usize {
        self.contexts.push(context);
        self.contexts.len() - 1
    }

    /// Register a render context for `camera` using the scene's default
    /// culling settings. Returns its index for later lookup.
    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.add_context(RenderContext::new(camera, self.config.cull.clone()))
    }

    /// A registered render context
    #[must_use]
    pub fn context(&self, index: usize) -> &RenderContext {
        &self.contexts[index]
    }

    /// Mutable access to a registered render context
    pub fn context_mut(&mut self, index: usize) -> &mut RenderContext {
        &mut self.contexts[index]
    }

    /// Advance the scene one frame.
    ///
    /// Runs controllers with `dt`, applies queued structural mutations,
    /// recomputes stale transforms and bounds, re-detects collisions within
    /// each active group, and culls into every context's bins.
    pub fn update(&mut self, dt: f32, gpu: &mut dyn GpuContext) {
        self.graph.run_controllers(dt);
        self.graph.commit_all(gpu);
        self.graph.update_transforms();
        self.graph.update_world_bounds();

        self.collision.clear_frame();
        self.collision.classify(&self.graph);
        let groups: Vec<i32> = self.collision.active_groups().collect();
        for group in groups {
            self.collision.check_group(&self.graph, group);
        }

        let mut binned = 0;
        let mut culled = 0;
        for context in &mut self.contexts {
            context.cull(&self.graph);
            let stats = context.stats();
            binned += stats.binned;
            culled += stats.frustum_culled + stats.distance_culled + stats.screen_size_culled;
        }

        self.stats.frame += 1;
        self.stats.nodes = self.graph.node_count();
        self.stats.binned = binned;
        self.stats.culled = culled;
        self.stats.collision_pairs = self.collision.pair_count();

        if self.config.log_frame_stats {
            debug!(
                "{} frame {}: {} nodes, {} binned, {} culled, {} collision pairs",
                self.config.name,
                self.stats.frame,
                self.stats.nodes,
                self.stats.binned,
                self.stats.culled,
                self.stats.collision_pairs
            );
        }
    }

    /// Submit every binned node's drawable, context by context, bins in
    /// ascending group-id order.
    pub fn draw(&mut self, gpu: &mut dyn GpuContext) {
        let mut vertices = 0;
        for context in &self.contexts {
            for bin in context.bins() {
                for &node in bin.nodes() {
                    vertices += self.graph.draw_node(node, gpu);
                }
            }
        }
        self.stats.vertices_drawn = vertices;
    }

    /// Tear the scene down, disposing every drawable in the tree post-order.
    pub fn dispose(mut self) {
        let root = self.graph.root();
        self.graph.dispose_subtree(root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingVolume;
    use crate::foundation::math::{Mat4, Vec3};
    use crate::graph::{Controller, NodeKey};
    use crate::render::{Camera, Drawable, NullGpu};
    use std::cell::Cell;
    use std::rc::Rc;

    fn test_camera() -> Camera {
        Camera::perspective(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            Vec3::y(),
            std::f32::consts::FRAC_PI_2,
            1.0,
            0.1,
            200.0,
        )
    }

    struct Spin {
        total: Rc<Cell<f32>>,
    }

    impl Controller for Spin {
        fn update(&mut self, _graph: &mut SceneGraph, _node: NodeKey, dt: f32) {
            self.total.set(self.total.get() + dt);
        }
    }

    struct CountingDrawable {
        draws: Rc<Cell<usize>>,
        disposed: Rc<Cell<usize>>,
    }

    impl Drawable for CountingDrawable {
        fn dispose(&mut self) {
            self.disposed.set(self.disposed.get() + 1);
        }

        fn vertex_count(&self) -> usize {
            36
        }

        fn draw(&mut self, _gpu: &mut dyn crate::render::GpuContext, _world: &Mat4) {
            self.draws.set(self.draws.get() + 1);
        }
    }

    fn scene_with_sphere(group: i32) -> (Scene, NodeKey) {
        let mut scene = Scene::new(SceneConfig::default());
        let node = scene
            .graph_mut()
            .create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
        scene.graph_mut().set_render_group(node, group);
        let root = scene.graph().root();
        scene.graph_mut().add_child(root, node);
        scene.add_camera(test_camera());
        (scene, node)
    }

    #[test]
    fn update_runs_the_full_frame_sequence() {
        let (mut scene, node) = scene_with_sphere(0);
        let mut gpu = NullGpu;
        scene.update(1.0 / 60.0, &mut gpu);

        // Committed, transformed, bounded, and binned in one call.
        assert_eq!(scene.graph().node(node).parent(), Some(scene.graph().root()));
        assert!(scene.graph().node(node).world_bounds().is_some());
        assert_eq!(scene.stats().binned, 1);
        assert_eq!(scene.stats().frame, 1);
    }

    #[test]
    fn structural_change_signal_survives_the_frame() {
        use crate::graph::DirtyFlags;

        let (mut scene, _node) = scene_with_sphere(0);
        let mut gpu = NullGpu;
        scene.update(1.0 / 60.0, &mut gpu);

        // The frame that applied the add leaves the changed node flagged for
        // consumers; the next structurally quiet frame retires the flag.
        let root = scene.graph().root();
        assert!(scene
            .graph()
            .node(root)
            .dirty()
            .contains(DirtyFlags::CHILD_STRUCTURE));

        scene.update(1.0 / 60.0, &mut gpu);
        assert!(!scene
            .graph()
            .node(root)
            .dirty()
            .contains(DirtyFlags::CHILD_STRUCTURE));
    }

    #[test]
    fn controllers_see_the_frame_delta() {
        let total = Rc::new(Cell::new(0.0));
        let (mut scene, node) = scene_with_sphere(0);
        scene
            .graph_mut()
            .attach_controller(node, Box::new(Spin { total: Rc::clone(&total) }));

        let mut gpu = NullGpu;
        scene.update(0.25, &mut gpu);
        scene.update(0.25, &mut gpu);
        // The controller only runs once the node is committed into the tree.
        assert!((total.get() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn draw_submits_binned_drawables_only() {
        let draws = Rc::new(Cell::new(0));
        let disposed = Rc::new(Cell::new(0));
        let (mut scene, node) = scene_with_sphere(0);
        scene.graph_mut().set_drawable(
            node,
            Box::new(CountingDrawable {
                draws: Rc::clone(&draws),
                disposed: Rc::clone(&disposed),
            }),
        );

        let mut gpu = NullGpu;
        scene.update(1.0 / 60.0, &mut gpu);
        scene.draw(&mut gpu);
        assert_eq!(draws.get(), 1);
        assert_eq!(scene.stats().vertices_drawn, 36);

        // Move the node out of view; the next frame draws nothing.
        scene
            .graph_mut()
            .set_translation(node, Vec3::new(0.0, 0.0, 1000.0));
        scene.update(1.0 / 60.0, &mut gpu);
        scene.draw(&mut gpu);
        assert_eq!(draws.get(), 1);
        assert_eq!(scene.stats().vertices_drawn, 0);
    }

    #[test]
    fn collisions_are_rebuilt_every_frame() {
        let mut scene = Scene::new(SceneConfig::default());
        let root = scene.graph().root();
        let a = scene
            .graph_mut()
            .create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
        let b = scene
            .graph_mut()
            .create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
        scene.graph_mut().set_collision_group(a, 0);
        scene.graph_mut().set_collision_group(b, 0);
        scene.graph_mut().add_child(root, a);
        scene.graph_mut().add_child(root, b);

        let mut gpu = NullGpu;
        scene.update(1.0 / 60.0, &mut gpu);
        let (ida, idb) = (scene.graph().node(a).id(), scene.graph().node(b).id());
        assert!(scene.collision().is_colliding(ida, idb));
        assert_eq!(scene.stats().collision_pairs, 1);

        scene
            .graph_mut()
            .set_translation(b, Vec3::new(100.0, 0.0, 0.0));
        scene.update(1.0 / 60.0, &mut gpu);
        assert!(!scene.collision().is_colliding(ida, idb));
        assert_eq!(scene.stats().collision_pairs, 0);
    }

    #[test]
    fn dispose_releases_every_drawable() {
        let draws = Rc::new(Cell::new(0));
        let disposed = Rc::new(Cell::new(0));
        let (mut scene, node) = scene_with_sphere(0);
        scene.graph_mut().set_drawable(
            node,
            Box::new(CountingDrawable {
                draws: Rc::clone(&draws),
                disposed: Rc::clone(&disposed),
            }),
        );
        let mut gpu = NullGpu;
        scene.update(1.0 / 60.0, &mut gpu);

        scene.dispose();
        assert_eq!(disposed.get(), 1);
    }
}
