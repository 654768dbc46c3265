use crate::types::{CodeGraph, Node, NodeId, NodeKind};

/// Name lookup over a graph.
///
/// A linear scan in node-creation order where the first match wins. Names
/// are not scoped by module or class, so with duplicate names the earliest
/// created node shadows the rest.
pub struct NameResolver<'g> {
    graph: &'g CodeGraph,
}

impl<'g> NameResolver<'g> {
    pub fn new(graph: &'g CodeGraph) -> Self {
        Self { graph }
    }

    /// First node named `name`, optionally restricted to `kind`
    pub fn resolve(&self, name: &str, kind: Option<NodeKind>) -> Option<NodeId> {
        self.matching(name, kind).next().map(Node::id)
    }

    /// Every node `resolve` could have picked, in creation order
    pub fn candidates(&self, name: &str, kind: Option<NodeKind>) -> Vec<NodeId> {
        self.matching(name, kind).map(Node::id).collect()
    }

    fn matching<'a>(
        &'a self,
        name: &'a str,
        kind: Option<NodeKind>,
    ) -> impl Iterator<Item = &'g Node> + 'a {
        self.graph
            .nodes()
            .filter(move |node| node.name() == name)
            .filter(move |node| kind.map_or(true, |k| node.kind() == k))
    }
}

impl CodeGraph {
    /// Shorthand for [`NameResolver::resolve`]
    pub fn find_node_by_name(&self, name: &str, kind: Option<NodeKind>) -> Option<NodeId> {
        NameResolver::new(self).resolve(name, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::types::ParentKind;

    #[test]
    fn test_first_match_in_creation_order() {
        let mut builder = GraphBuilder::new();
        let m1 = builder.add_module("a.py", "a");
        let m2 = builder.add_module("b.py", "b");
        let first = builder.add_function(m1, "run", ParentKind::Module, None);
        let second = builder.add_function(m2, "run", ParentKind::Module, None);

        let graph = builder.graph();
        let resolver = NameResolver::new(graph);
        assert_eq!(resolver.resolve("run", Some(NodeKind::Function)), Some(first));
        assert_eq!(resolver.candidates("run", None), vec![first, second]);
    }

    #[test]
    fn test_type_filter() {
        let mut builder = GraphBuilder::new();
        let m = builder.add_module("shapes.py", "Shape");
        let class = builder.add_class(m, "Shape", &[], None);

        let graph = builder.graph();
        assert_eq!(graph.find_node_by_name("Shape", None), Some(m));
        assert_eq!(graph.find_node_by_name("Shape", Some(NodeKind::Class)), Some(class));
        assert_eq!(graph.find_node_by_name("Shape", Some(NodeKind::Function)), None);
        assert_eq!(graph.find_node_by_name("Missing", None), None);
    }
}
