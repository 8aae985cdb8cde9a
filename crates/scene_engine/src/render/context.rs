//! Per-camera culling and binning

use std::collections::BTreeMap;

use log::trace;

use crate::config::CullConfig;
use crate::graph::{NodeKey, SceneGraph};
use crate::render::{Camera, RenderBin};

/// Counters for one culling pass. Rejections are expected outcomes, not
/// errors, so they are tallied rather than reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Geometry nodes that entered the cull tests
    pub tested: usize,
    /// Nodes that survived every test and were binned
    pub binned: usize,
    /// Nodes rejected by the frustum test
    pub frustum_culled: usize,
    /// Nodes rejected by the maximum-distance test
    pub distance_culled: usize,
    /// Nodes rejected by the minimum-screen-size test
    pub screen_size_culled: usize,
}

/// One camera's view of the scene: cull configuration plus the draw bins
/// its culling pass fills.
///
/// Bins are keyed by render-group id in a `BTreeMap`, so draw order is
/// ascending group id by construction.
pub struct RenderContext {
    camera: Camera,
    config: CullConfig,
    bins: BTreeMap<i32, RenderBin>,
    stats: CullStats,
}

impl RenderContext {
    /// Create a context for a camera with the given cull settings
    #[must_use]
    pub fn new(camera: Camera, config: CullConfig) -> Self {
        Self {
            camera,
            config,
            bins: BTreeMap::new(),
            stats: CullStats::default(),
        }
    }

    /// Clear every bin and zero the counters for a new frame
    pub fn reset(&mut self) {
        for bin in self.bins.values_mut() {
            bin.clear();
        }
        self.stats = CullStats::default();
    }

    /// Append a node to the bin for `id`, creating the bin on first use.
    ///
    /// Re-adds across chained contexts are the caller's responsibility, so
    /// within one frame a duplicate is a broken invariant, not a de-dup.
    ///
    /// # Panics
    /// Panics if the node is already in that bin this frame.
    pub fn add_to_bin(&mut self, id: i32, node: NodeKey) {
        let bin = self.bins.entry(id).or_insert_with(|| RenderBin::new(id));
        assert!(
            !bin.nodes().contains(&node),
            "node is already in render bin {id} this frame"
        );
        bin.push(node);
    }

    /// The context's camera
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The cull settings
    #[must_use]
    pub fn config(&self) -> &CullConfig {
        &self.config
    }

    /// Counters from the most recent culling pass
    #[must_use]
    pub fn stats(&self) -> CullStats {
        self.stats
    }

    /// Bins in ascending group-id order
    pub fn bins(&self) -> impl Iterator<Item = &RenderBin> {
        self.bins.values()
    }

    /// The bin for a group id, if registered or filled
    #[must_use]
    pub fn bin(&self, id: i32) -> Option<&RenderBin> {
        self.bins.get(&id)
    }

    /// Walk the enabled tree, cull every visible geometry node against this
    /// context's camera, and bucket the survivors by render group.
    ///
    /// Tests run cheapest-rejection-first: frustum, then maximum distance,
    /// then minimum projected size. Nodes without a world bounding volume or
    /// with a negative render group never enter the tests.
    pub fn cull(&mut self, graph: &SceneGraph) {
        self.reset();
        self.cull_node(graph, graph.root());
        trace!(
            "cull: {} tested, {} binned, {} frustum / {} distance / {} size rejected",
            self.stats.tested,
            self.stats.binned,
            self.stats.frustum_culled,
            self.stats.distance_culled,
            self.stats.screen_size_culled
        );
    }

    fn cull_node(&mut self, graph: &SceneGraph, key: NodeKey) {
        let node = graph.node(key);
        if !node.is_enabled() {
            return;
        }

        // Invisibility gates drawing, never descent.
        if node.is_visible() && node.render_group() >= 0 {
            if let Some(bounds) = node.world_bounds() {
                self.stats.tested += 1;
                if self.test_bounds(bounds) {
                    self.stats.binned += 1;
                    self.add_to_bin(node.render_group(), key);
                }
            }
        }

        for &child in node.children() {
            self.cull_node(graph, child);
        }
    }

    fn test_bounds(&mut self, bounds: &crate::bounds::BoundingVolume) -> bool {
        if self.config.frustum_culling && !self.camera.frustum().intersects_volume(bounds) {
            self.stats.frustum_culled += 1;
            return false;
        }

        if let Some(max_distance) = self.config.max_distance {
            let offset = bounds.center() - self.camera.eye();
            if offset.norm_squared() > max_distance * max_distance {
                self.stats.distance_culled += 1;
                return false;
            }
        }

        if let Some(min_size) = self.config.min_screen_size {
            let projected = self
                .camera
                .projected_size(bounds.center(), bounds.enclosing_radius());
            if projected < min_size {
                self.stats.screen_size_culled += 1;
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingVolume;
    use crate::foundation::math::Vec3;
    use crate::render::NullGpu;

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

    fn graph_with_sphere_at(position: Vec3, group: i32) -> (SceneGraph, NodeKey) {
        let mut graph = SceneGraph::new();
        let node = graph.create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
        graph.set_render_group(node, group);
        graph.set_translation(node, position);
        let root = graph.root();
        graph.add_child(root, node);
        graph.commit_all(&mut NullGpu);
        graph.update_transforms();
        graph.update_world_bounds();
        (graph, node)
    }

    #[test]
    fn in_view_node_lands_in_its_bin() {
        let (graph, node) = graph_with_sphere_at(Vec3::zeros(), 3);
        let mut context = RenderContext::new(test_camera(), CullConfig::default());
        context.cull(&graph);

        assert_eq!(context.stats().binned, 1);
        assert_eq!(context.bin(3).unwrap().nodes(), &[node]);
    }

    #[test]
    fn behind_camera_node_is_frustum_culled() {
        let (graph, _) = graph_with_sphere_at(Vec3::new(0.0, 0.0, 50.0), 0);
        let mut context = RenderContext::new(test_camera(), CullConfig::default());
        context.cull(&graph);

        assert_eq!(context.stats().frustum_culled, 1);
        assert_eq!(context.stats().binned, 0);
    }

    #[test]
    fn far_node_is_distance_culled() {
        let (graph, _) = graph_with_sphere_at(Vec3::new(0.0, 0.0, -100.0), 0);
        let config = CullConfig::default().with_max_distance(50.0);
        let mut context = RenderContext::new(test_camera(), config);
        context.cull(&graph);

        assert_eq!(context.stats().distance_culled, 1);
        assert_eq!(context.stats().binned, 0);
    }

    #[test]
    fn tiny_node_is_screen_size_culled() {
        let (graph, _) = graph_with_sphere_at(Vec3::new(0.0, 0.0, -100.0), 0);
        let config = CullConfig::default().with_min_screen_size(0.5);
        let mut context = RenderContext::new(test_camera(), config);
        context.cull(&graph);

        assert_eq!(context.stats().screen_size_culled, 1);
        assert_eq!(context.stats().binned, 0);
    }

    #[test]
    fn negative_group_and_missing_bounds_are_never_tested() {
        let mut graph = SceneGraph::new();
        let unbinned = graph.create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
        let boundless = graph.create_geometry(None);
        graph.set_render_group(boundless, 0);
        let root = graph.root();
        graph.add_child(root, unbinned);
        graph.add_child(root, boundless);
        graph.commit_all(&mut NullGpu);
        graph.update_transforms();
        graph.update_world_bounds();

        let mut context = RenderContext::new(test_camera(), CullConfig::default());
        context.cull(&graph);
        assert_eq!(context.stats().tested, 0);
    }

    #[test]
    fn invisible_node_is_skipped_but_children_are_not() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
        let child = graph.create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
        graph.set_render_group(parent, 0);
        graph.set_render_group(child, 0);
        graph.set_visible(parent, false);
        let root = graph.root();
        graph.add_child(root, parent);
        graph.add_child(parent, child);
        graph.commit_all(&mut NullGpu);
        graph.update_transforms();
        graph.update_world_bounds();

        let mut context = RenderContext::new(test_camera(), CullConfig::default());
        context.cull(&graph);
        assert_eq!(context.bin(0).unwrap().nodes(), &[child]);
    }

    #[test]
    #[should_panic(expected = "already in render bin")]
    fn duplicate_bin_insert_panics() {
        let (_graph, node) = graph_with_sphere_at(Vec3::zeros(), 0);
        let mut context = RenderContext::new(test_camera(), CullConfig::default());
        context.add_to_bin(1, node);
        context.add_to_bin(1, node);
    }

    #[test]
    fn reset_clears_bins_and_counters() {
        let (graph, _) = graph_with_sphere_at(Vec3::zeros(), 0);
        let mut context = RenderContext::new(test_camera(), CullConfig::default());
        context.cull(&graph);
        assert_eq!(context.stats().binned, 1);

        context.reset();
        assert_eq!(context.stats(), CullStats::default());
        assert!(context.bin(0).unwrap().is_empty());
    }

    #[test]
    fn bins_iterate_in_ascending_group_order() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        for group in [5, 1, 3] {
            let node = graph.create_geometry(Some(BoundingVolume::sphere(Vec3::zeros(), 1.0)));
            graph.set_render_group(node, group);
            graph.add_child(root, node);
        }
        graph.commit_all(&mut NullGpu);
        graph.update_transforms();
        graph.update_world_bounds();

        let mut context = RenderContext::new(test_camera(), CullConfig::default());
        context.cull(&graph);
        let ids: Vec<i32> = context.bins().map(RenderBin::id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }
}
