//! Plain nested-mapping export of a graph, and import back into a frozen
//! [`CodeGraph`].
//!
//! ```json
//! {
//!   "nodes": {
//!     "module_1": {"id": "module_1", "type": "module", "name": "a",
//!                  "properties": {"file_path": "a.py"},
//!                  "edges": [["class_2", "contains"]]}
//!   },
//!   "node_count": 1
//! }
//! ```

use crate::error::{GraphError, Result};
use crate::types::{parse_key, CodeGraph, EdgeKind, NodeId, NodeKind, NodeProperties};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One node as exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub edges: Vec<(String, EdgeKind)>,
}

/// Exported graph; `nodes` is kept in creation order and serialised as a
/// map keyed by node id
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub node_count: usize,
}

impl GraphSnapshot {
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphError::InvalidSnapshot(format!("serialize: {e}")))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::InvalidSnapshot(e.to_string()))
    }
}

impl Serialize for GraphSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct NodesInOrder<'a>(&'a [NodeSnapshot]);

        impl Serialize for NodesInOrder<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for node in self.0 {
                    map.serialize_entry(&node.id, node)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("nodes", &NodesInOrder(&self.nodes))?;
        map.serialize_entry("node_count", &self.node_count)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for GraphSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawSnapshot {
            nodes: BTreeMap<String, NodeSnapshot>,
            node_count: usize,
        }

        let raw = RawSnapshot::deserialize(deserializer)?;
        let mut keyed = Vec::with_capacity(raw.nodes.len());
        for (key, node) in raw.nodes {
            let (_, index) = parse_key(&key).map_err(serde::de::Error::custom)?;
            if key != node.id {
                return Err(serde::de::Error::custom(format!(
                    "node keyed `{key}` carries id `{}`",
                    node.id
                )));
            }
            keyed.push((index, node));
        }
        keyed.sort_by_key(|(index, _)| *index);

        Ok(GraphSnapshot {
            nodes: keyed.into_iter().map(|(_, node)| node).collect(),
            node_count: raw.node_count,
        })
    }
}

impl CodeGraph {
    /// Export every node with its properties and ordered edge list
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let nodes: Vec<NodeSnapshot> = self
            .nodes()
            .filter_map(|node| self.node_snapshot(node.id()))
            .collect();

        GraphSnapshot {
            node_count: nodes.len(),
            nodes,
        }
    }

    /// Export a single node, as it appears inside [`to_snapshot`](Self::to_snapshot)
    pub fn node_snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.get_node(id)?;
        let mut properties = node.properties().to_map();
        for (key, value) in node.extra() {
            properties.insert(key.clone(), value.clone());
        }
        let edges = self
            .edges_of(id)
            .into_iter()
            .filter_map(|(target, kind)| self.get_node(target).map(|t| (t.key(), kind)))
            .collect();

        Some(NodeSnapshot {
            id: node.key(),
            kind: node.kind(),
            name: node.name().to_string(),
            properties,
            edges,
        })
    }

    /// Rebuild a frozen graph from a snapshot.
    ///
    /// Ids must be exactly `<type>_1..=<type>_N` in creation order, every
    /// edge target must name an existing node and every edge must be
    /// paired with its inverse on the target.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self> {
        if snapshot.node_count != snapshot.nodes.len() {
            return Err(GraphError::InvalidSnapshot(format!(
                "node_count is {} but {} nodes are present",
                snapshot.node_count,
                snapshot.nodes.len()
            )));
        }

        let mut graph = CodeGraph::new();
        for (position, node) in snapshot.nodes.iter().enumerate() {
            let (kind, index) = parse_key(&node.id)?;
            if index != position || kind != node.kind {
                return Err(GraphError::InvalidSnapshot(format!(
                    "expected a {} id numbered {}, found `{}`",
                    node.kind,
                    position + 1,
                    node.id
                )));
            }

            let mut remaining = node.properties.clone();
            let properties = NodeProperties::from_map(kind, &mut remaining)?;
            let id = graph.add_node(&node.name, properties);
            let stored = graph
                .node_mut(id)
                .ok_or_else(|| GraphError::NodeNotFound(node.id.clone()))?;
            for (key, value) in remaining {
                stored.insert_extra(&key, value)?;
            }
        }

        for node in &snapshot.nodes {
            let from = graph
                .resolve_key(&node.id)
                .ok_or_else(|| GraphError::NodeNotFound(node.id.clone()))?;
            for (target, kind) in &node.edges {
                let to: NodeId = graph.resolve_key(target).ok_or_else(|| {
                    GraphError::InvalidSnapshot(format!(
                        "edge from `{}` points at unknown node `{target}`",
                        node.id
                    ))
                })?;
                graph.add_directed(from, to, *kind);
            }
        }

        // Every edge must come with its inverse
        for node in &snapshot.nodes {
            let from = graph
                .resolve_key(&node.id)
                .ok_or_else(|| GraphError::NodeNotFound(node.id.clone()))?;
            for (target, kind) in &node.edges {
                let to = graph
                    .resolve_key(target)
                    .ok_or_else(|| GraphError::NodeNotFound(target.clone()))?;
                if !graph.has_edge(to, from, kind.inverse()) {
                    return Err(GraphError::InvalidSnapshot(format!(
                        "edge `{}` -{kind}-> `{target}` has no `{}` edge back",
                        node.id,
                        kind.inverse()
                    )));
                }
            }
        }

        log::debug!(
            "Loaded snapshot: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }
}
