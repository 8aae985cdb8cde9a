//! Group-based pairwise collision detection
//!
//! Every frame the world classifies enabled geometry nodes into integer
//! collision groups, runs pairwise bounding-volume tests within or between
//! groups, and records the hits into an id-keyed cache. The cache is keyed
//! by [`NodeId`] rather than arena handle so queries stay meaningful even if
//! a collider is destroyed later the same frame, and every hit is recorded
//! under both participants' ids so lookup from either side is O(1).

use std::collections::HashMap;

use log::trace;

use crate::graph::{NodeId, NodeKey, SceneGraph};

/// An unordered pair of colliding nodes. Construction normalizes the order
/// so `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// The lower node id of the pair
    pub a: NodeId,
    /// The higher node id of the pair
    pub b: NodeId,
}

impl CollisionPair {
    /// Create a normalized pair
    #[must_use]
    pub fn new(first: NodeId, second: NodeId) -> Self {
        if first <= second {
            Self {
                a: first,
                b: second,
            }
        } else {
            Self {
                a: second,
                b: first,
            }
        }
    }

    /// Whether the pair involves the given node
    #[must_use]
    pub fn involves(&self, id: NodeId) -> bool {
        self.a == id || self.b == id
    }

    /// The other participant, given one of the pair's ids
    ///
    /// # Panics
    /// Panics if `id` is not part of the pair.
    #[must_use]
    pub fn other(&self, id: NodeId) -> NodeId {
        if self.a == id {
            self.b
        } else {
            assert!(self.b == id, "node {id} is not part of this pair");
            self.a
        }
    }
}

/// Per-frame collision state: group membership and the colliding-pair cache.
///
/// There are no enter/exit events; the cache answers only "currently
/// colliding" and is rebuilt from scratch every frame.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    groups: HashMap<i32, Vec<NodeKey>>,
    cache: HashMap<NodeId, Vec<CollisionPair>>,
    pair_count: usize,
}

impl CollisionWorld {
    /// Create an empty world
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop last frame's classification and pair cache
    pub fn clear_frame(&mut self) {
        for members in self.groups.values_mut() {
            members.clear();
        }
        for pairs in self.cache.values_mut() {
            pairs.clear();
        }
        self.pair_count = 0;
    }

    /// Classify every enabled geometry node with a non-negative collision
    /// group and a bounding volume into its group bucket.
    ///
    /// Classification walks committed membership, so a node inside a
    /// disabled subtree is skipped even if the node itself is enabled.
    pub fn classify(&mut self, graph: &SceneGraph) {
        self.classify_node(graph, graph.root());
    }

    fn classify_node(&mut self, graph: &SceneGraph, key: NodeKey) {
        let node = graph.node(key);
        if !node.is_enabled() {
            return;
        }
        if node.collision_group() >= 0 && node.world_bounds().is_some() {
            self.groups
                .entry(node.collision_group())
                .or_default()
                .push(key);
        }
        for &child in node.children() {
            self.classify_node(graph, child);
        }
    }

    /// Nodes classified into a group this frame
    #[must_use]
    pub fn group(&self, id: i32) -> &[NodeKey] {
        self.groups.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Group ids with at least one member this frame
    pub fn active_groups(&self) -> impl Iterator<Item = i32> + '_ {
        self.groups
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(&id, _)| id)
    }

    /// Test every unordered pair within one group and record the hits
    pub fn check_group(&mut self, graph: &SceneGraph, id: i32) {
        let members = self.groups.get(&id).cloned().unwrap_or_default();
        self.check_collisions(graph, &members);
    }

    /// Test every unordered pair in `nodes` and record the hits
    pub fn check_collisions(&mut self, graph: &SceneGraph, nodes: &[NodeKey]) {
        for (index, &first) in nodes.iter().enumerate() {
            for &second in &nodes[index + 1..] {
                self.test_pair(graph, first, second);
            }
        }
    }

    /// Test every cross pair between two lists and record the hits. Callers
    /// pass disjoint lists; overlapping lists degenerate to self-tests.
    pub fn check_collisions_between(
        &mut self,
        graph: &SceneGraph,
        first: &[NodeKey],
        second: &[NodeKey],
    ) {
        for &a in first {
            for &b in second {
                if a != b {
                    self.test_pair(graph, a, b);
                }
            }
        }
    }

    fn test_pair(&mut self, graph: &SceneGraph, first: NodeKey, second: NodeKey) {
        let a = graph.node(first);
        let b = graph.node(second);
        let (Some(bounds_a), Some(bounds_b)) = (a.world_bounds(), b.world_bounds()) else {
            return;
        };
        if bounds_a.intersects(bounds_b) {
            trace!("collision: node {} with node {}", a.id(), b.id());
            self.record(CollisionPair::new(a.id(), b.id()));
        }
    }

    /// Record a hit under both participants' ids, once per frame per pair.
    fn record(&mut self, pair: CollisionPair) {
        let under_a = self.cache.entry(pair.a).or_default();
        if under_a.contains(&pair) {
            return;
        }
        under_a.push(pair);
        self.cache.entry(pair.b).or_default().push(pair);
        self.pair_count += 1;
    }

    /// Whether two nodes collided this frame, in either order
    #[must_use]
    pub fn is_colliding(&self, first: NodeId, second: NodeId) -> bool {
        let pair = CollisionPair::new(first, second);
        self.cache
            .get(&pair.a)
            .is_some_and(|pairs| pairs.contains(&pair))
    }

    /// Whether the node collided with anything this frame
    #[must_use]
    pub fn has_collisions(&self, id: NodeId) -> bool {
        self.cache.get(&id).is_some_and(|pairs| !pairs.is_empty())
    }

    /// The pairs involving a node this frame
    #[must_use]
    pub fn collisions_for(&self, id: NodeId) -> &[CollisionPair] {
        self.cache.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct pairs recorded this frame
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pair_count
    }
}
