use crate::types::{CodeGraph, EdgeKind, Node, NodeId, NodeKind};

/// Read-only queries over a built graph
impl CodeGraph {
    /// All nodes of one type, in creation order
    pub fn find_nodes_by_type(&self, kind: NodeKind) -> Vec<&Node> {
        self.nodes().filter(|node| node.kind() == kind).collect()
    }

    /// A node's edges, optionally filtered by kind. Unknown ids yield nothing.
    pub fn query_relationships(
        &self,
        id: NodeId,
        kind: Option<EdgeKind>,
    ) -> Vec<(NodeId, EdgeKind)> {
        self.edges_of(id)
            .into_iter()
            .filter(|(_, edge_kind)| kind.map_or(true, |k| *edge_kind == k))
            .collect()
    }

    /// Names of nodes holding a `calls` edge to the function named `name`.
    ///
    /// `name` resolves to the first function created with that name. Every
    /// node's edge list is scanned, so cost grows with the total edge count.
    pub fn get_callers(&self, name: &str) -> Vec<String> {
        let Some(target) = self.find_node_by_name(name, Some(NodeKind::Function)) else {
            return Vec::new();
        };

        self.nodes()
            .filter(|node| {
                self.edges_of(node.id())
                    .iter()
                    .any(|&(to, kind)| to == target && kind == EdgeKind::Calls)
            })
            .map(|node| node.name().to_string())
            .collect()
    }

    /// Names reached through the outgoing `calls` edges of the function
    /// named `name`, in edge insertion order
    pub fn get_callees(&self, name: &str) -> Vec<String> {
        let Some(source) = self.find_node_by_name(name, Some(NodeKind::Function)) else {
            return Vec::new();
        };
        self.targets_named(source, EdgeKind::Calls)
    }

    /// Classes the class named `name` inherits from
    pub fn get_base_classes(&self, name: &str) -> Vec<String> {
        let Some(class) = self.find_node_by_name(name, Some(NodeKind::Class)) else {
            return Vec::new();
        };
        self.targets_named(class, EdgeKind::InheritsFrom)
    }

    /// Classes that inherit from the class named `name`
    pub fn get_subclasses(&self, name: &str) -> Vec<String> {
        let Some(class) = self.find_node_by_name(name, Some(NodeKind::Class)) else {
            return Vec::new();
        };
        self.targets_named(class, EdgeKind::InheritedBy)
    }

    fn targets_named(&self, id: NodeId, kind: EdgeKind) -> Vec<String> {
        self.query_relationships(id, Some(kind))
            .into_iter()
            .filter_map(|(target, _)| self.get_node(target))
            .map(|node| node.name().to_string())
            .collect()
    }
}
