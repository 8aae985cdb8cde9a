//! Integer-keyed draw buckets

use crate::graph::NodeKey;

/// One draw bucket. Nodes land here during culling in traversal order and
/// the bucket is emptied at the start of the next frame.
#[derive(Debug, Clone)]
pub struct RenderBin {
    id: i32,
    nodes: Vec<NodeKey>,
}

impl RenderBin {
    /// Create an empty bin with the given group id
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self {
            id,
            nodes: Vec::new(),
        }
    }

    /// Group id this bin collects
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Nodes binned this frame, in traversal order
    #[must_use]
    pub fn nodes(&self) -> &[NodeKey] {
        &self.nodes
    }

    /// Number of nodes binned this frame
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing was binned this frame
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push(&mut self, node: NodeKey) {
        self.nodes.push(node);
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }
}
