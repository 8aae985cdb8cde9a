//! Scene-graph core: node arena, dirty-flag propagation, deferred commit
//!
//! All nodes live in a slotmap arena owned by [`SceneGraph`]; parent and
//! child references are arena handles, never pointers, so reparenting and
//! removal cannot dangle. The graph owns its own monotonic [`NodeId`]
//! allocator, which keeps multiple independent graphs per process possible.
//!
//! Structural mutation is deferred: [`SceneGraph::add_child`] and friends
//! only enqueue events; [`SceneGraph::commit`] applies them in a dedicated
//! phase. This is the system's substitute for locking — the update pass is
//! itself a traversal over the same structure, and mutating a child list
//! mid-iteration would corrupt it.

mod node;
mod update;
mod visit;

pub use node::{Controller, DirtyFlags, Node, NodeId};
pub use visit::Visitor;

use log::trace;
use slotmap::{new_key_type, SlotMap};

use crate::bounds::BoundingVolume;
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::render::{Drawable, GpuContext};

use node::{ChildEvent, Geometry, Spatial};

new_key_type! {
    /// Arena handle for a node. Stable for the node's lifetime; stale after
    /// the node is destroyed.
    pub struct NodeKey;
}

/// The node hierarchy: an arena of nodes plus the root group.
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, Node>,
    root: NodeKey,
    next_id: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only a root group node
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new_group(NodeId(0)));
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Handle of the root group node
    #[must_use]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of live nodes (attached or not), including the root
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the handle refers to a live node
    #[must_use]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Look up a node, if it is still alive
    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Look up a node.
    ///
    /// # Panics
    /// Panics if the handle is stale.
    #[must_use]
    pub fn node(&self, key: NodeKey) -> &Node {
        &self.nodes[key]
    }

    /// Iterate over every live node
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create a detached group node (children only, no transform)
    pub fn create_group(&mut self) -> NodeKey {
        let id = self.alloc_id();
        self.nodes.insert(Node::new_group(id))
    }

    /// Create a detached transform node (scale/rotation/translation)
    pub fn create_transform(&mut self) -> NodeKey {
        let id = self.alloc_id();
        self.nodes.insert(Node::new_transform(id))
    }

    /// Create a detached geometry node with an optional local bounding
    /// volume. A node without a local volume never appears in a render or
    /// collision bin.
    pub fn create_geometry(&mut self, local_bounds: Option<BoundingVolume>) -> NodeKey {
        let id = self.alloc_id();
        self.nodes.insert(Node::new_geometry(id, local_bounds))
    }

    /// Deep-clone a node and its committed children into a new detached
    /// subtree with fresh ids. Controllers, drawables, and the parent
    /// backlink are not cloned; every cloned node starts fully dirty so the
    /// next passes rebuild its matrices and volumes.
    pub fn clone_subtree(&mut self, source: NodeKey) -> NodeKey {
        let src = &self.nodes[source];
        let name = src.name.clone();
        let enabled = src.enabled;
        let visible = src.visible;
        let spatial = src.spatial.as_ref().map(|s| Spatial {
            srt: s.srt.clone(),
            local: s.local,
            world: s.world,
        });
        let geometry = src.geometry.as_ref().map(|g| {
            let mut clone = Geometry::new(g.local_bounds.clone());
            clone.render_group = g.render_group;
            clone.collision_group = g.collision_group;
            clone
        });
        let children = src.children.clone();

        let mut dirty = DirtyFlags::empty();
        if spatial.is_some() {
            dirty |= DirtyFlags::TRANSFORM | DirtyFlags::WORLD_TRANSFORM;
        }
        if geometry.as_ref().is_some_and(|g| g.local_bounds.is_some()) {
            dirty |= DirtyFlags::WORLD_BOUNDS;
        }

        let id = self.alloc_id();
        let key = self.nodes.insert(Node {
            id,
            name,
            enabled,
            visible,
            parent: None,
            dirty,
            children: Vec::new(),
            pending: Vec::new(),
            controllers: Vec::new(),
            spatial,
            geometry,
        });

        for child in children {
            let cloned = self.clone_subtree(child);
            self.nodes[cloned].parent = Some(key);
            self.nodes[key].children.push(cloned);
        }

        key
    }

    // ------------------------------------------------------------------
    // Dirty-flag engine
    // ------------------------------------------------------------------

    /// Set dirty flags on a node and propagate the child-variant flags up
    /// through its ancestors. Propagation short-circuits at the first
    /// ancestor that already carries the flag, and stops at (but still
    /// marks) the first disabled ancestor. Disabled nodes never propagate
    /// their own dirtiness upward.
    pub fn set_dirty(&mut self, key: NodeKey, flags: DirtyFlags) {
        self.nodes[key].dirty |= flags;
        if !self.nodes[key].enabled {
            return;
        }
        let parent = self.nodes[key].parent;
        for bit in flags.child_variant().iter() {
            self.set_parent_dirty(parent, bit);
        }
    }

    /// Clear dirty flags on a node. Consumers of a flag clear it after
    /// acting on it; setters never do.
    pub fn clear_dirty(&mut self, key: NodeKey, flags: DirtyFlags) {
        self.nodes[key].dirty.remove(flags);
    }

    fn set_parent_dirty(&mut self, mut current: Option<NodeKey>, flag: DirtyFlags) {
        while let Some(key) = current {
            let node = &mut self.nodes[key];
            if node.dirty.contains(flag) {
                // The tree above is already known dirty.
                break;
            }
            node.dirty |= flag;
            if !node.enabled {
                break;
            }
            current = node.parent;
        }
    }

    fn mark_here_and_up(&mut self, key: NodeKey, flag: DirtyFlags) {
        self.nodes[key].dirty |= flag;
        if self.nodes[key].enabled {
            let parent = self.nodes[key].parent;
            self.set_parent_dirty(parent, flag);
        }
    }

    fn mark_subtree_world_dirty(&mut self, key: NodeKey) {
        let node = &mut self.nodes[key];
        if node.spatial.is_some() {
            node.dirty |= DirtyFlags::WORLD_TRANSFORM | DirtyFlags::CHILD_WORLD_TRANSFORM;
        } else {
            node.dirty |= DirtyFlags::CHILD_WORLD_TRANSFORM;
        }
        if node.geometry.as_ref().is_some_and(|g| g.local_bounds.is_some()) {
            node.dirty |= DirtyFlags::WORLD_BOUNDS;
        }
        let children = node.children.clone();
        for child in children {
            self.mark_subtree_world_dirty(child);
        }
    }

    // ------------------------------------------------------------------
    // Node mutators
    // ------------------------------------------------------------------

    /// Rename a node
    pub fn set_name(&mut self, key: NodeKey, name: impl Into<String>) {
        self.nodes[key].name = name.into();
    }

    /// Enable or disable a node. Disabling freezes the subtree: its dirty
    /// state is kept but no longer propagated. Re-enabling re-propagates the
    /// still-set flags upward so the next passes pick the subtree up again.
    pub fn set_enabled(&mut self, key: NodeKey, enabled: bool) {
        if self.nodes[key].enabled == enabled {
            return;
        }
        self.nodes[key].enabled = enabled;
        if enabled {
            let dirty = self.nodes[key].dirty;
            let parent = self.nodes[key].parent;
            let thaw = dirty.child_variant()
                | dirty.intersection(
                    DirtyFlags::CHILD_TRANSFORM
                        | DirtyFlags::CHILD_WORLD_TRANSFORM
                        | DirtyFlags::CHILD_STRUCTURE,
                );
            for bit in thaw.iter() {
                self.set_parent_dirty(parent, bit);
            }
        }
    }

    /// Show or hide a node. Visibility gates culling and drawing, never
    /// traversal.
    pub fn set_visible(&mut self, key: NodeKey, visible: bool) {
        self.nodes[key].visible = visible;
    }

    fn spatial_mut(&mut self, key: NodeKey) -> &mut Spatial {
        self.nodes[key]
            .spatial
            .as_mut()
            .expect("node has no transform capability")
    }

    fn geometry_mut(&mut self, key: NodeKey) -> &mut Geometry {
        self.nodes[key]
            .geometry
            .as_mut()
            .expect("node has no geometry capability")
    }

    /// Set the translation component. No-op when unchanged.
    ///
    /// # Panics
    /// Panics if the node has no transform capability.
    pub fn set_translation(&mut self, key: NodeKey, translation: Vec3) {
        let spatial = self.spatial_mut(key);
        if spatial.srt.translation == translation {
            return;
        }
        spatial.srt.translation = translation;
        self.set_dirty(key, DirtyFlags::TRANSFORM);
    }

    /// Set the rotation component. No-op when unchanged.
    ///
    /// # Panics
    /// Panics if the node has no transform capability.
    pub fn set_rotation(&mut self, key: NodeKey, rotation: Quat) {
        let spatial = self.spatial_mut(key);
        if spatial.srt.rotation == rotation {
            return;
        }
        spatial.srt.rotation = rotation;
        self.set_dirty(key, DirtyFlags::TRANSFORM);
    }

    /// Set the scale component. No-op when unchanged.
    ///
    /// # Panics
    /// Panics if the node has no transform capability.
    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) {
        let spatial = self.spatial_mut(key);
        if spatial.srt.scale == scale {
            return;
        }
        spatial.srt.scale = scale;
        self.set_dirty(key, DirtyFlags::TRANSFORM);
    }

    /// Replace the local bounding volume.
    ///
    /// # Panics
    /// Panics if the node has no geometry capability.
    pub fn set_local_bounds(&mut self, key: NodeKey, bounds: Option<BoundingVolume>) {
        let geometry = self.geometry_mut(key);
        geometry.local_bounds = bounds;
        geometry.world_bounds = None;
        if geometry.local_bounds.is_some() {
            self.set_dirty(key, DirtyFlags::WORLD_BOUNDS);
        }
    }

    /// Assign the render-group id (negative excludes the node from render
    /// classification).
    ///
    /// # Panics
    /// Panics if the node has no geometry capability.
    pub fn set_render_group(&mut self, key: NodeKey, group: i32) {
        self.geometry_mut(key).render_group = group;
    }

    /// Assign the collision-group id (negative excludes the node from
    /// collision classification).
    ///
    /// # Panics
    /// Panics if the node has no geometry capability.
    pub fn set_collision_group(&mut self, key: NodeKey, group: i32) {
        self.geometry_mut(key).collision_group = group;
    }

    /// Attach a drawable collaborator to a geometry node. Its `initialize`
    /// hook runs when the node is committed into the tree.
    ///
    /// # Panics
    /// Panics if the node has no geometry capability.
    pub fn set_drawable(&mut self, key: NodeKey, drawable: Box<dyn Drawable>) {
        self.geometry_mut(key).drawable = Some(drawable);
    }

    /// Attach a behavior controller, invoked once per update visit in
    /// insertion order.
    pub fn attach_controller(&mut self, key: NodeKey, controller: Box<dyn Controller>) {
        self.nodes[key].controllers.push(controller);
    }

    // ------------------------------------------------------------------
    // Deferred structural mutation
    // ------------------------------------------------------------------

    /// Enqueue appending `child` to `parent`'s child list. The live child
    /// collection is untouched until [`SceneGraph::commit`].
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) {
        assert!(self.nodes.contains_key(child), "add of a destroyed node");
        self.nodes[parent].pending.push(ChildEvent::Added(child));
        self.set_dirty(parent, DirtyFlags::STRUCTURE);
    }

    /// Enqueue prepending `child` to `parent`'s child list
    pub fn add_child_first(&mut self, parent: NodeKey, child: NodeKey) {
        assert!(self.nodes.contains_key(child), "add of a destroyed node");
        self.nodes[parent]
            .pending
            .push(ChildEvent::AddedFirst(child));
        self.set_dirty(parent, DirtyFlags::STRUCTURE);
    }

    /// Enqueue detaching `child` from `parent`. Applying the event destroys
    /// the child and its subtree — group membership owns node lifetime.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) {
        self.nodes[parent].pending.push(ChildEvent::Removed(child));
        self.set_dirty(parent, DirtyFlags::STRUCTURE);
    }

    /// Apply this node's queued structural events in enqueue order.
    ///
    /// A no-op unless the node's `STRUCTURE` flag is set. Attached children
    /// get their drawable `initialize` hook; detached subtrees are disposed
    /// and destroyed. A child that still carries a dirty transform marks
    /// this node `CHILD_TRANSFORM` so the missed propagation is caught up,
    /// and every attached subtree is force-marked for world-transform and
    /// world-bounds recomputation.
    ///
    /// # Panics
    /// Panics on logic errors: attaching a node that is already attached
    /// elsewhere, or removing a node that is not a current child.
    pub fn commit(&mut self, key: NodeKey, gpu: &mut dyn GpuContext) {
        if !self.nodes[key].dirty.contains(DirtyFlags::STRUCTURE) {
            return;
        }

        let events = std::mem::take(&mut self.nodes[key].pending);
        trace!(
            "commit: node {} applying {} structural events",
            self.nodes[key].id,
            events.len()
        );

        let mut added_any = false;
        for event in events {
            match event {
                ChildEvent::Added(child) | ChildEvent::AddedFirst(child) => {
                    assert!(
                        self.nodes.contains_key(child),
                        "commit references a destroyed node"
                    );
                    assert!(
                        self.nodes[child].parent.is_none(),
                        "node '{}' is already attached to a group",
                        self.nodes[child].name
                    );

                    if matches!(event, ChildEvent::AddedFirst(_)) {
                        self.nodes[key].children.insert(0, child);
                    } else {
                        self.nodes[key].children.push(child);
                    }
                    self.nodes[child].parent = Some(key);

                    if let Some(drawable) = self.nodes[child]
                        .geometry
                        .as_mut()
                        .and_then(|g| g.drawable.as_mut())
                    {
                        drawable.initialize(gpu);
                    }

                    // The new subtree missed earlier upward propagation.
                    if self.nodes[child]
                        .dirty
                        .intersects(DirtyFlags::TRANSFORM | DirtyFlags::CHILD_TRANSFORM)
                    {
                        self.mark_here_and_up(key, DirtyFlags::CHILD_TRANSFORM);
                    }
                    self.mark_subtree_world_dirty(child);
                    self.mark_here_and_up(key, DirtyFlags::CHILD_WORLD_TRANSFORM);

                    added_any = true;
                }
                ChildEvent::Removed(child) => {
                    let position = self.nodes[key]
                        .children
                        .iter()
                        .position(|&k| k == child)
                        .unwrap_or_else(|| {
                            panic!(
                                "remove of a node that is not a child of '{}'",
                                self.nodes[key].name
                            )
                        });
                    self.nodes[key].children.remove(position);
                    self.nodes[child].parent = None;
                    self.dispose_subtree(child);
                }
            }
        }

        self.nodes[key].dirty.remove(DirtyFlags::STRUCTURE);
        if added_any {
            self.nodes[key].dirty |= DirtyFlags::CHILD_STRUCTURE;
        }
    }

    /// Pre-order commit visit over the enabled tree, terminating early on
    /// subtrees whose structure bits are clean.
    pub fn commit_all(&mut self, gpu: &mut dyn GpuContext) {
        self.commit_pass(self.root, gpu);
    }

    fn commit_pass(&mut self, key: NodeKey, gpu: &mut dyn GpuContext) {
        if !self.nodes[key].enabled {
            return;
        }
        if !self.nodes[key]
            .dirty
            .intersects(DirtyFlags::STRUCTURE | DirtyFlags::CHILD_STRUCTURE)
        {
            return;
        }
        // Drop the routed copy of CHILD_STRUCTURE before committing: commit
        // re-sets the bit only when this node's own child set changes, so
        // the bit left after the pass is the "changed during the last
        // commit" signal consumers watch, not traversal routing.
        self.nodes[key].dirty.remove(DirtyFlags::CHILD_STRUCTURE);
        self.commit(key, gpu);
        let children = self.nodes[key].children.clone();
        for child in children {
            // A commit above can only add or destroy whole subtrees, so any
            // snapshot entry that is gone was disposed with its parent.
            if self.nodes.contains_key(child) {
                self.commit_pass(child, gpu);
            }
        }
    }

    /// Dispose a subtree post-order (drawables first in the deepest nodes)
    /// and remove every node from the arena.
    pub(crate) fn dispose_subtree(&mut self, key: NodeKey) {
        let children = self.nodes[key].children.clone();
        for child in children {
            self.dispose_subtree(child);
        }
        if let Some(drawable) = self.nodes[key]
            .geometry
            .as_mut()
            .and_then(|g| g.drawable.as_mut())
        {
            drawable.dispose();
        }
        self.nodes.remove(key);
    }

    /// Submit the node's drawable, if any, with its current world transform.
    /// Returns the vertices submitted.
    pub(crate) fn draw_node(&mut self, key: NodeKey, gpu: &mut dyn GpuContext) -> usize {
        let node = &mut self.nodes[key];
        let world = node.spatial.as_ref().map_or_else(Mat4::identity, |s| s.world);
        if let Some(drawable) = node.geometry.as_mut().and_then(|g| g.drawable.as_mut()) {
            drawable.pre_draw(gpu);
            drawable.draw(gpu, &world);
            drawable.post_draw(gpu);
            drawable.vertex_count()
        } else {
            0
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First node with the given name in pre-order from the root, if any
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.find_by_name_in(self.root, name)
    }

    fn find_by_name_in(&self, key: NodeKey, name: &str) -> Option<NodeKey> {
        if self.nodes[key].name == name {
            return Some(key);
        }
        self.nodes[key]
            .children
            .iter()
            .find_map(|&child| self.find_by_name_in(child, name))
    }
}
