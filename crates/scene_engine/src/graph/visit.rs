//! Read-only depth-first traversal

use super::{NodeKey, SceneGraph};

/// Depth-first visitor over the committed tree.
///
/// `pre` runs before a node's children and is the only hook that gates
/// descent; `each` runs between consecutive children; `post` runs after the
/// last child. All hooks default to no-ops (`pre` to descend-everything) so
/// implementors override only what they need.
pub trait Visitor {
    /// Called before descending into `node`'s children. Return `false` to
    /// skip the subtree below it.
    fn pre(&mut self, graph: &SceneGraph, node: NodeKey) -> bool {
        let _ = (graph, node);
        true
    }

    /// Called between consecutive children of `node`
    fn each(&mut self, graph: &SceneGraph, node: NodeKey) {
        let _ = (graph, node);
    }

    /// Called after the last child of `node`
    fn post(&mut self, graph: &SceneGraph, node: NodeKey) {
        let _ = (graph, node);
    }
}

impl SceneGraph {
    /// Depth-first visit starting at `start`
    pub fn visit<V: Visitor>(&self, start: NodeKey, visitor: &mut V) {
        if !visitor.pre(self, start) {
            return;
        }
        let children = self.node(start).children();
        for (index, &child) in children.iter().enumerate() {
            if index > 0 {
                visitor.each(self, start);
            }
            self.visit(child, visitor);
        }
        visitor.post(self, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NameCollector {
        names: Vec<String>,
        skip: Option<String>,
    }

    impl Visitor for NameCollector {
        fn pre(&mut self, graph: &SceneGraph, node: NodeKey) -> bool {
            let name = graph.node(node).name().to_string();
            if self.skip.as_deref() == Some(name.as_str()) {
                return false;
            }
            self.names.push(name);
            true
        }
    }

    fn three_level_graph() -> (SceneGraph, NodeKey) {
        let mut graph = SceneGraph::new();
        let a = graph.create_group();
        let b = graph.create_group();
        let c = graph.create_group();
        graph.set_name(a, "a");
        graph.set_name(b, "b");
        graph.set_name(c, "c");
        let root = graph.root();
        graph.add_child(root, a);
        graph.add_child(a, b);
        graph.add_child(a, c);
        graph.commit_all(&mut crate::render::NullGpu);
        (graph, a)
    }

    #[test]
    fn visits_pre_order() {
        let (graph, a) = three_level_graph();
        let mut collector = NameCollector {
            names: Vec::new(),
            skip: None,
        };
        graph.visit(a, &mut collector);
        assert_eq!(collector.names, vec!["a", "b", "c"]);
    }

    #[test]
    fn pre_returning_false_skips_subtree() {
        let (graph, _) = three_level_graph();
        let mut collector = NameCollector {
            names: Vec::new(),
            skip: Some("a".to_string()),
        };
        graph.visit(graph.root(), &mut collector);
        assert_eq!(collector.names.len(), 1);
        assert!(collector.names[0].starts_with("NODE_"));
    }
}
