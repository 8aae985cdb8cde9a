//! Node record, capability data, and dirty-flag bitset

use bitflags::bitflags;

use crate::bounds::BoundingVolume;
use crate::foundation::math::{Mat4, Transform};
use crate::render::Drawable;

use super::{NodeKey, SceneGraph};

bitflags! {
    /// Per-node dirty bitset.
    ///
    /// A flag records that a derived value is stale. Flags are set
    /// monotonically by mutators and cleared only by the pass that consumes
    /// them. The `CHILD_*` variants mean "somewhere below me" and let the
    /// update passes terminate traversal early on clean subtrees.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyFlags: u32 {
        /// Local transform must be recomputed from scale/rotation/translation
        const TRANSFORM = 1 << 0;
        /// Some descendant has a dirty local transform
        const CHILD_TRANSFORM = 1 << 1;
        /// World transform must be recomputed from the parent's
        const WORLD_TRANSFORM = 1 << 2;
        /// Children must recompute their world transforms
        const CHILD_WORLD_TRANSFORM = 1 << 3;
        /// Pending child add/remove events await commit
        const STRUCTURE = 1 << 4;
        /// The child set changed during the last commit
        const CHILD_STRUCTURE = 1 << 5;
        /// World bounding volume must be re-derived from the world transform
        const WORLD_BOUNDS = 1 << 6;
    }
}

impl DirtyFlags {
    /// The `CHILD_*` flags corresponding to the contained base flags,
    /// propagated to ancestors when the base flag is set.
    #[must_use]
    pub fn child_variant(self) -> Self {
        let mut out = Self::empty();
        if self.contains(Self::TRANSFORM) {
            out |= Self::CHILD_TRANSFORM;
        }
        if self.contains(Self::WORLD_TRANSFORM) {
            out |= Self::CHILD_WORLD_TRANSFORM;
        }
        if self.contains(Self::STRUCTURE) {
            out |= Self::CHILD_STRUCTURE;
        }
        out
    }
}

/// Process-unique node identity within one [`SceneGraph`].
///
/// Monotonically increasing, assigned at creation, never reused. Distinct
/// from [`NodeKey`], which is the arena slot handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// The raw id value
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Behavior attached to a node, invoked once per update visit in insertion
/// order with the simulation time delta.
pub trait Controller {
    /// Run one simulation step for the node this controller is attached to.
    fn update(&mut self, graph: &mut SceneGraph, node: NodeKey, dt: f32);
}

/// Deferred structural mutation against a group's child collection
#[derive(Debug, Clone, Copy)]
pub(crate) enum ChildEvent {
    /// Append the node to the child list
    Added(NodeKey),
    /// Prepend the node to the child list
    AddedFirst(NodeKey),
    /// Detach and destroy the node
    Removed(NodeKey),
}

/// Spatial capability: scale/rotation/translation plus the cached local and
/// world matrices derived from them.
pub(crate) struct Spatial {
    pub srt: Transform,
    pub local: Mat4,
    pub world: Mat4,
}

impl Default for Spatial {
    fn default() -> Self {
        Self {
            srt: Transform::identity(),
            local: Mat4::identity(),
            world: Mat4::identity(),
        }
    }
}

/// Geometry capability: bounding volumes, classification groups, and an
/// optional drawable collaborator.
pub(crate) struct Geometry {
    pub local_bounds: Option<BoundingVolume>,
    pub world_bounds: Option<BoundingVolume>,
    pub render_group: i32,
    pub collision_group: i32,
    pub drawable: Option<Box<dyn Drawable>>,
}

impl Geometry {
    pub(crate) fn new(local_bounds: Option<BoundingVolume>) -> Self {
        Self {
            local_bounds,
            world_bounds: None,
            render_group: -1,
            collision_group: -1,
            drawable: None,
        }
    }
}

/// A scene-graph node.
///
/// Every node carries the group capability (an ordered child list plus a
/// pending-event queue); the spatial and geometry capabilities are optional
/// composition, so traversal code dispatches on declared capability instead
/// of runtime type inspection.
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) visible: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) dirty: DirtyFlags,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) pending: Vec<ChildEvent>,
    pub(crate) controllers: Vec<Box<dyn Controller>>,
    pub(crate) spatial: Option<Spatial>,
    pub(crate) geometry: Option<Geometry>,
}

impl Node {
    pub(crate) fn new_group(id: NodeId) -> Self {
        Self {
            name: format!("NODE_{}", id.0),
            id,
            enabled: true,
            visible: true,
            parent: None,
            dirty: DirtyFlags::empty(),
            children: Vec::new(),
            pending: Vec::new(),
            controllers: Vec::new(),
            spatial: None,
            geometry: None,
        }
    }

    pub(crate) fn new_transform(id: NodeId) -> Self {
        let mut node = Self::new_group(id);
        node.spatial = Some(Spatial::default());
        node.dirty = DirtyFlags::TRANSFORM | DirtyFlags::WORLD_TRANSFORM;
        node
    }

    pub(crate) fn new_geometry(id: NodeId, local_bounds: Option<BoundingVolume>) -> Self {
        let mut node = Self::new_transform(id);
        if local_bounds.is_some() {
            node.dirty |= DirtyFlags::WORLD_BOUNDS;
        }
        node.geometry = Some(Geometry::new(local_bounds));
        node
    }

    /// Stable node identity (never reused within a graph)
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node name ("NODE_<id>" unless renamed)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the node participates in traversal and dirty propagation
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the node may be binned and drawn (does not gate traversal)
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handle of the owning parent, if attached
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Current dirty bitset
    #[must_use]
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Committed children, in order
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Number of structural events awaiting commit
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Whether the node carries the spatial capability
    #[must_use]
    pub fn has_transform(&self) -> bool {
        self.spatial.is_some()
    }

    /// Whether the node carries the geometry capability
    #[must_use]
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Scale/rotation/translation, if the node has the spatial capability
    #[must_use]
    pub fn srt(&self) -> Option<&Transform> {
        self.spatial.as_ref().map(|s| &s.srt)
    }

    /// Cached local transform matrix (identity for non-spatial nodes)
    #[must_use]
    pub fn local_transform(&self) -> Mat4 {
        self.spatial.as_ref().map_or_else(Mat4::identity, |s| s.local)
    }

    /// Cached world transform matrix (identity for non-spatial nodes)
    #[must_use]
    pub fn world_transform(&self) -> Mat4 {
        self.spatial.as_ref().map_or_else(Mat4::identity, |s| s.world)
    }

    /// Local-space bounding volume, if any
    #[must_use]
    pub fn local_bounds(&self) -> Option<&BoundingVolume> {
        self.geometry.as_ref().and_then(|g| g.local_bounds.as_ref())
    }

    /// Derived world-space bounding volume, if computed
    #[must_use]
    pub fn world_bounds(&self) -> Option<&BoundingVolume> {
        self.geometry.as_ref().and_then(|g| g.world_bounds.as_ref())
    }

    /// Render-group id (negative = excluded from render classification)
    #[must_use]
    pub fn render_group(&self) -> i32 {
        self.geometry.as_ref().map_or(-1, |g| g.render_group)
    }

    /// Collision-group id (negative = excluded from collision classification)
    #[must_use]
    pub fn collision_group(&self) -> i32 {
        self.geometry.as_ref().map_or(-1, |g| g.collision_group)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .field("dirty", &self.dirty)
            .field("children", &self.children.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_variant_mapping() {
        assert_eq!(
            DirtyFlags::TRANSFORM.child_variant(),
            DirtyFlags::CHILD_TRANSFORM
        );
        assert_eq!(
            DirtyFlags::WORLD_TRANSFORM.child_variant(),
            DirtyFlags::CHILD_WORLD_TRANSFORM
        );
        assert_eq!(
            DirtyFlags::STRUCTURE.child_variant(),
            DirtyFlags::CHILD_STRUCTURE
        );
        assert_eq!(
            (DirtyFlags::TRANSFORM | DirtyFlags::STRUCTURE).child_variant(),
            DirtyFlags::CHILD_TRANSFORM | DirtyFlags::CHILD_STRUCTURE
        );
        assert!(DirtyFlags::CHILD_TRANSFORM.child_variant().is_empty());
    }

    #[test]
    fn generated_names_use_id() {
        let node = Node::new_group(NodeId(7));
        assert_eq!(node.name(), "NODE_7");
    }

    #[test]
    fn new_transform_starts_dirty() {
        let node = Node::new_transform(NodeId(1));
        assert!(node.dirty().contains(DirtyFlags::TRANSFORM));
        assert!(node.dirty().contains(DirtyFlags::WORLD_TRANSFORM));
    }
}
