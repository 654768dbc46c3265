use crate::error::{GraphError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Upper bound on source-specific metadata keys per node
pub const MAX_EXTRA_PROPERTIES: usize = 16;

/// Property names owned by the typed variants; extension keys may not use them
pub const RESERVED_PROPERTY_KEYS: &[&str] =
    &["file_path", "bases", "line_start", "line_end", "parent_kind"];

/// Stable handle to a node, valid for the lifetime of the graph that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(NodeIndex);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(NodeIndex::new(index))
    }

    /// 0-based creation index
    pub fn index(self) -> usize {
        self.0.index()
    }

    pub(crate) fn raw(self) -> NodeIndex {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    Class,
    Function,
    File,
}

impl NodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Function => "function",
            NodeKind::File => "file",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "module" => Ok(NodeKind::Module),
            "class" => Ok(NodeKind::Class),
            "function" => Ok(NodeKind::Function),
            "file" => Ok(NodeKind::File),
            other => Err(GraphError::InvalidNodeId(format!("unknown node type `{other}`"))),
        }
    }
}

/// Semantic label on a directed edge.
///
/// Forward kinds (`Contains`, `InheritsFrom`, `Calls`, `Imports`) are always
/// stored together with their inverse on the opposite endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Parent holds child (module -> class, class -> method)
    Contains,
    BelongsTo,
    /// Derived class -> base class
    InheritsFrom,
    InheritedBy,
    Calls,
    CalledBy,
    Imports,
    ImportedBy,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 8] = [
        EdgeKind::Contains,
        EdgeKind::BelongsTo,
        EdgeKind::InheritsFrom,
        EdgeKind::InheritedBy,
        EdgeKind::Calls,
        EdgeKind::CalledBy,
        EdgeKind::Imports,
        EdgeKind::ImportedBy,
    ];

    pub const fn inverse(self) -> Self {
        match self {
            EdgeKind::Contains => EdgeKind::BelongsTo,
            EdgeKind::BelongsTo => EdgeKind::Contains,
            EdgeKind::InheritsFrom => EdgeKind::InheritedBy,
            EdgeKind::InheritedBy => EdgeKind::InheritsFrom,
            EdgeKind::Calls => EdgeKind::CalledBy,
            EdgeKind::CalledBy => EdgeKind::Calls,
            EdgeKind::Imports => EdgeKind::ImportedBy,
            EdgeKind::ImportedBy => EdgeKind::Imports,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Contains => "contains",
            EdgeKind::BelongsTo => "belongs_to",
            EdgeKind::InheritsFrom => "inherits_from",
            EdgeKind::InheritedBy => "inherited_by",
            EdgeKind::Calls => "calls",
            EdgeKind::CalledBy => "called_by",
            EdgeKind::Imports => "imports",
            EdgeKind::ImportedBy => "imported_by",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GraphError::InvalidSnapshot(format!("unknown edge kind `{s}`")))
    }
}

/// Inclusive 1-based line range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub line_start: usize,
    pub line_end: usize,
}

impl LineSpan {
    pub const fn new(line_start: usize, line_end: usize) -> Self {
        Self {
            line_start,
            line_end,
        }
    }
}

/// What a function node hangs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Module,
    Class,
}

impl ParentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ParentKind::Module => "module",
            ParentKind::Class => "class",
        }
    }
}

/// Typed per-node properties; the variant determines the node type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeProperties {
    Module {
        file_path: String,
    },
    Class {
        /// Declared base names, unresolved
        bases: Vec<String>,
        span: Option<LineSpan>,
    },
    Function {
        parent_kind: ParentKind,
        span: Option<LineSpan>,
    },
    File {
        file_path: String,
    },
}

impl NodeProperties {
    pub const fn kind(&self) -> NodeKind {
        match self {
            NodeProperties::Module { .. } => NodeKind::Module,
            NodeProperties::Class { .. } => NodeKind::Class,
            NodeProperties::Function { .. } => NodeKind::Function,
            NodeProperties::File { .. } => NodeKind::File,
        }
    }

    pub fn span(&self) -> Option<LineSpan> {
        match self {
            NodeProperties::Class { span, .. } | NodeProperties::Function { span, .. } => *span,
            _ => None,
        }
    }

    /// Flat key-value rendering used by snapshots
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            NodeProperties::Module { file_path } | NodeProperties::File { file_path } => {
                map.insert("file_path".into(), Value::from(file_path.as_str()));
            }
            NodeProperties::Class { bases, .. } => {
                map.insert("bases".into(), Value::from(bases.clone()));
            }
            NodeProperties::Function { parent_kind, .. } => {
                map.insert("parent_kind".into(), Value::from(parent_kind.as_str()));
            }
        }
        if let Some(span) = self.span() {
            map.insert("line_start".into(), Value::from(span.line_start));
            map.insert("line_end".into(), Value::from(span.line_end));
        }
        map
    }

    /// Inverse of [`to_map`](Self::to_map): typed fields are taken out of
    /// `map`, whatever remains is extension metadata.
    pub fn from_map(kind: NodeKind, map: &mut Map<String, Value>) -> Result<Self> {
        let line_start = take_usize(map, "line_start")?;
        let line_end = take_usize(map, "line_end")?;
        let span = match (line_start, line_end) {
            (Some(start), Some(end)) => Some(LineSpan::new(start, end)),
            _ => None,
        };

        let props = match kind {
            NodeKind::Module | NodeKind::File => {
                let file_path = match map.remove("file_path") {
                    Some(Value::String(path)) => path,
                    _ => {
                        return Err(GraphError::InvalidSnapshot(format!(
                            "{kind} node is missing a string `file_path`"
                        )))
                    }
                };
                if kind == NodeKind::Module {
                    NodeProperties::Module { file_path }
                } else {
                    NodeProperties::File { file_path }
                }
            }
            NodeKind::Class => {
                let bases = match map.remove("bases") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(value) => serde_json::from_value(value).map_err(|e| {
                        GraphError::InvalidSnapshot(format!("class `bases`: {e}"))
                    })?,
                };
                NodeProperties::Class { bases, span }
            }
            NodeKind::Function => {
                let parent_kind = match map.remove("parent_kind") {
                    None | Some(Value::Null) => ParentKind::Module,
                    Some(value) => serde_json::from_value(value).map_err(|e| {
                        GraphError::InvalidSnapshot(format!("function `parent_kind`: {e}"))
                    })?,
                };
                NodeProperties::Function { parent_kind, span }
            }
        };

        Ok(props)
    }
}

fn take_usize(map: &mut Map<String, Value>, key: &str) -> Result<Option<usize>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                GraphError::InvalidSnapshot(format!("`{key}` must be a non-negative integer"))
            }),
    }
}

/// Node in the code context graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    name: String,
    properties: NodeProperties,
    /// Source-specific metadata, at most [`MAX_EXTRA_PROPERTIES`] keys
    extra: BTreeMap<String, Value>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.properties.kind()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Rendered id: `<type>_<n>` with `n` the 1-based creation index
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind().as_str(), self.id.index() + 1)
    }

    pub(crate) fn insert_extra(&mut self, key: &str, value: Value) -> Result<()> {
        if RESERVED_PROPERTY_KEYS.contains(&key) {
            return Err(GraphError::PropertyError(format!(
                "`{key}` is a reserved property name"
            )));
        }
        if !self.extra.contains_key(key) && self.extra.len() >= MAX_EXTRA_PROPERTIES {
            return Err(GraphError::PropertyError(format!(
                "node {} already has {MAX_EXTRA_PROPERTIES} extension properties",
                self.key()
            )));
        }
        self.extra.insert(key.to_string(), value);
        Ok(())
    }
}

/// Edge payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GraphEdge {
    pub kind: EdgeKind,
}

/// Append-only node/edge store.
///
/// Nodes and edges are only ever added, so petgraph indices double as
/// stable ids and edge indices record insertion order.
#[derive(Debug, Clone, Default)]
pub struct CodeGraph {
    graph: DiGraph<Node, GraphEdge>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node to graph
    pub(crate) fn add_node(&mut self, name: &str, properties: NodeProperties) -> NodeId {
        let id = NodeId::new(self.graph.node_count());
        let node = Node {
            id,
            name: name.to_string(),
            properties,
            extra: BTreeMap::new(),
        };
        let idx = self.graph.add_node(node);
        debug_assert_eq!(idx, id.raw());
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.graph.node_weight_mut(id.raw())
    }

    /// Add `kind` from `from` to `to` and its inverse from `to` to `from`.
    ///
    /// No-op unless both endpoints exist. Returns true if anything was added.
    pub(crate) fn link(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let forward = self.add_directed(from, to, kind);
        let inverse = self.add_directed(to, from, kind.inverse());
        forward || inverse
    }

    /// Single directed edge, skipped when the same (target, kind) exists
    pub(crate) fn add_directed(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        if self.has_edge(from, to, kind) {
            return false;
        }
        self.graph.add_edge(from.raw(), to.raw(), GraphEdge { kind });
        true
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        self.graph
            .edges_connecting(from.raw(), to.raw())
            .any(|e| e.weight().kind == kind)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.node_weight(id.raw()).is_some()
    }

    /// Get node data
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node_weight(id.raw())
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx))
    }

    /// A node's outgoing edges in insertion order
    pub fn edges_of(&self, id: NodeId) -> Vec<(NodeId, EdgeKind)> {
        if !self.contains(id) {
            return Vec::new();
        }
        // petgraph walks adjacency newest-first
        let mut edges: Vec<_> = self
            .graph
            .edges(id.raw())
            .map(|e| (e.id(), NodeId(e.target()), e.weight().kind))
            .collect();
        edges.sort_by_key(|(edge_id, _, _)| *edge_id);
        edges
            .into_iter()
            .map(|(_, target, kind)| (target, kind))
            .collect()
    }

    /// Look up a rendered id such as `class_3`
    pub fn resolve_key(&self, key: &str) -> Option<NodeId> {
        let (kind, index) = parse_key(key).ok()?;
        let id = NodeId::new(index);
        self.get_node(id)
            .filter(|node| node.kind() == kind)
            .map(Node::id)
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count (each direction counted separately)
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Split `class_3` into (Class, 2)
pub(crate) fn parse_key(key: &str) -> Result<(NodeKind, usize)> {
    let invalid = || GraphError::InvalidNodeId(key.to_string());
    let (prefix, number) = key.rsplit_once('_').ok_or_else(invalid)?;
    let kind = prefix.parse::<NodeKind>().map_err(|_| invalid())?;
    let number: usize = number.parse().map_err(|_| invalid())?;
    if number == 0 {
        return Err(invalid());
    }
    Ok((kind, number - 1))
}
