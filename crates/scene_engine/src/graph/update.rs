//! Per-frame passes over the graph: behavior controllers, transform
//! recomputation, and world-bounds derivation.
//!
//! Each pass walks top-down and terminates early on subtrees whose dirty
//! bits say there is nothing to do. Disabled subtrees are frozen: no pass
//! descends into them, and their dirty state waits until re-enable.

use super::{DirtyFlags, NodeKey, SceneGraph};
use crate::foundation::math::Mat4;

impl SceneGraph {
    /// Run every controller in the enabled tree, pre-order, with the given
    /// time delta.
    pub fn run_controllers(&mut self, dt: f32) {
        self.run_controllers_at(self.root, dt);
    }

    fn run_controllers_at(&mut self, key: NodeKey, dt: f32) {
        if !self.nodes.get(key).is_some_and(|n| n.enabled) {
            return;
        }

        // Controllers receive &mut SceneGraph, so the list is taken out of
        // the node for the duration of the calls. A controller disabling or
        // destroying its own node ends the run early.
        let mut controllers = std::mem::take(&mut self.nodes[key].controllers);
        for controller in &mut controllers {
            controller.update(self, key, dt);
            if !self.nodes.get(key).is_some_and(|n| n.enabled) {
                break;
            }
        }
        if let Some(node) = self.nodes.get_mut(key) {
            // Controllers attached during the run land after the originals.
            let mut added = std::mem::replace(&mut node.controllers, controllers);
            node.controllers.append(&mut added);
        } else {
            return;
        }

        // A controller disabling its own node freezes the subtree for the
        // rest of the tick, same as the commit and transform passes.
        if !self.nodes[key].enabled {
            return;
        }

        let children = self.nodes[key].children.clone();
        for child in children {
            if self.nodes.contains_key(child) {
                self.run_controllers_at(child, dt);
            }
        }
    }

    /// Recompute local and world transform matrices for every enabled node
    /// whose dirty bits require it.
    pub fn update_transforms(&mut self) {
        self.update_transforms_at(self.root, Mat4::identity(), false);
    }

    /// `cascade` forces the world transform to recompute even when the
    /// node's own flags are clear, because an ancestor's world matrix
    /// changed this pass.
    fn update_transforms_at(&mut self, key: NodeKey, parent_world: Mat4, cascade: bool) {
        let node = &mut self.nodes[key];
        if !node.enabled {
            return;
        }

        let dirty = node.dirty;
        let mut world_changed = cascade;

        if let Some(spatial) = node.spatial.as_mut() {
            if dirty.contains(DirtyFlags::TRANSFORM) {
                spatial.local = spatial.srt.to_matrix();
                node.dirty.remove(DirtyFlags::TRANSFORM);
                world_changed = true;
            }
            if world_changed || dirty.contains(DirtyFlags::WORLD_TRANSFORM) {
                spatial.world = parent_world * spatial.local;
                node.dirty.remove(DirtyFlags::WORLD_TRANSFORM);
                world_changed = true;
            }
        } else if dirty.contains(DirtyFlags::WORLD_TRANSFORM) {
            node.dirty.remove(DirtyFlags::WORLD_TRANSFORM);
            world_changed = true;
        }

        if world_changed
            && node
                .geometry
                .as_ref()
                .is_some_and(|g| g.local_bounds.is_some())
        {
            node.dirty |= DirtyFlags::WORLD_BOUNDS;
        }

        let descend = world_changed
            || dirty.intersects(DirtyFlags::CHILD_TRANSFORM | DirtyFlags::CHILD_WORLD_TRANSFORM);
        if !descend {
            return;
        }

        node.dirty
            .remove(DirtyFlags::CHILD_TRANSFORM | DirtyFlags::CHILD_WORLD_TRANSFORM);
        let world = node.spatial.as_ref().map_or(parent_world, |s| s.world);
        let children = node.children.clone();
        for child in children {
            self.update_transforms_at(child, world, world_changed);
        }
    }

    /// Re-derive world bounding volumes for every enabled node flagged
    /// `WORLD_BOUNDS`.
    pub fn update_world_bounds(&mut self) {
        self.update_world_bounds_at(self.root);
    }

    fn update_world_bounds_at(&mut self, key: NodeKey) {
        let node = &mut self.nodes[key];
        if !node.enabled {
            return;
        }

        if node.dirty.contains(DirtyFlags::WORLD_BOUNDS) {
            let world = node.spatial.as_ref().map_or_else(Mat4::identity, |s| s.world);
            if let Some(geometry) = node.geometry.as_mut() {
                geometry.world_bounds = geometry
                    .local_bounds
                    .as_ref()
                    .map(|local| local.transformed(&world));
            }
            node.dirty.remove(DirtyFlags::WORLD_BOUNDS);
        }

        let children = node.children.clone();
        for child in children {
            self.update_world_bounds_at(child);
        }
    }
}
